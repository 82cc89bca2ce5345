//! Domain model, ports, and shared policy for the lavka catalog assistant.
//!
//! Everything here is transport-agnostic: the agent plans against [`ports`],
//! the db crate implements them over SQLite, and the mcp crate implements them
//! over stdio tool servers.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod ports;
pub mod pricing;

pub use domain::order::{Order, OrderId, OrderStatistics, ORDER_STATUS_CREATED};
pub use domain::product::{NewProduct, Product, ProductId, ProductStatistics};
pub use errors::{Entity, ExecutionError, ParseFailure, PortError, ValidationError};
pub use ports::{OrdersPort, ProductsPort};
