//! Agent runtime for the lavka catalog assistant.
//!
//! A query goes through a small fixed flow:
//! 1. **Route** (`planner`) - rule-based parsing of Russian free text into a
//!    typed [`planner::Plan`]
//! 2. **Execute** (`runtime`) - one call into `ProductsPort` / `OrdersPort`,
//!    rendered as a Russian answer
//! 3. **Help** - usage text for anything the planner did not understand
//!
//! The planner never decides prices or stock; those come from the ports and
//! the pricing policy in `lavka-core`.

pub mod planner;
pub mod runtime;

pub use planner::{Intent, Plan, Planner, RulePlanner};
pub use runtime::{AgentReply, AgentRuntime, AgentState, FlowStep};
