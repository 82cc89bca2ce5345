use lavka_agent::{Planner, RulePlanner};

use crate::commands::CommandResult;

/// Prints the plan JSON the agent would route `query` to. No config, no I/O.
pub fn run(query: &str) -> CommandResult {
    let plan = RulePlanner::new().plan(query);
    match serde_json::to_string(&plan) {
        Ok(json) => CommandResult::success("plan", json),
        Err(error) => CommandResult::failure("plan", "serialization", error.to_string(), 1),
    }
}
