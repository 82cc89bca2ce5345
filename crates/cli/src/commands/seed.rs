use std::path::Path;

use lavka_db::{seed_demo_catalog, SeedResult};

use crate::commands::{
    block_on, finish, load_config, open_database, CommandResult, EXIT_SEED,
};

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let result = load_config(config_path).and_then(|config| {
        block_on(async move {
            let pool = open_database(&config).await?;
            let seeded = seed_demo_catalog(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), EXIT_SEED));
            pool.close().await;
            Ok(seed_message(&seeded?))
        })
    });
    finish("seed", result)
}

fn seed_message(result: &SeedResult) -> String {
    if result.skipped {
        "product table already populated; demo catalog left untouched".to_string()
    } else {
        format!("demo catalog loaded: {} products", result.inserted)
    }
}

#[cfg(test)]
mod tests {
    use lavka_db::SeedResult;

    use super::seed_message;

    #[test]
    fn seed_message_reports_inserted_count() {
        let message = seed_message(&SeedResult { inserted: 6, skipped: false });

        assert_eq!(message, "demo catalog loaded: 6 products");
    }

    #[test]
    fn seed_message_reports_skip_on_populated_table() {
        let message = seed_message(&SeedResult { inserted: 0, skipped: true });

        assert!(message.contains("already populated"));
    }
}
