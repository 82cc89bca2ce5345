use std::path::Path;

use crate::commands::{block_on, finish, load_config, open_database, CommandResult};

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let result = load_config(config_path).and_then(|config| {
        block_on(async move {
            let pool = open_database(&config).await?;
            pool.close().await;
            Ok("applied pending migrations".to_string())
        })
    });
    finish("migrate", result)
}
