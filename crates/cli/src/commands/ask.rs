use std::path::Path;
use std::sync::Arc;

use lavka_agent::AgentRuntime;
use lavka_db::{seed_demo_catalog, SqlOrderRepository, SqlProductRepository};

use crate::commands::{
    block_on, finish, load_config, open_database, CommandResult, EXIT_AGENT, EXIT_INVALID_INPUT,
    EXIT_SEED,
};

/// Answers `query` with the SQLite-backed ports regardless of `tools.backend`.
///
/// An agent reply carrying an error still prints the rendered answer, but as
/// an `agent_error` failure so scripts can branch on the exit code.
pub fn run(config_path: Option<&Path>, query: &str) -> CommandResult {
    if query.is_empty() {
        return CommandResult::failure(
            "ask",
            "invalid_input",
            "query must not be empty",
            EXIT_INVALID_INPUT,
        );
    }

    let result = load_config(config_path).and_then(|config| {
        block_on(async move {
            let pool = open_database(&config).await?;
            if config.tools.seed_demo_catalog {
                seed_demo_catalog(&pool)
                    .await
                    .map_err(|error| ("seed_execution", error.to_string(), EXIT_SEED))?;
            }

            let runtime = AgentRuntime::new(
                Arc::new(SqlProductRepository::new(pool.clone())),
                Arc::new(SqlOrderRepository::new(pool.clone())),
            );
            let reply = runtime.handle(query).await;
            pool.close().await;

            match reply.error {
                None => Ok(reply.answer),
                Some(_) => Err(("agent_error", reply.answer, EXIT_AGENT)),
            }
        })
    });
    finish("ask", result)
}
