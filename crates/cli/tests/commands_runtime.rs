use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use lavka_cli::commands::{ask, config, migrate, plan, seed};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn migrate_returns_success_with_in_memory_database() {
    with_env(&[("LAVKA_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run(None);
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["error_class"], Value::Null);
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("LAVKA_DATABASE_URL", "postgres://localhost/lavka")], || {
        let result = migrate::run(None);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_loads_demo_catalog_into_fresh_database() {
    with_env(&[("LAVKA_DATABASE_URL", "sqlite::memory:")], || {
        let result = seed::run(None);
        assert_eq!(result.exit_code, 0, "expected seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "demo catalog loaded: 6 products");
    });
}

#[test]
fn seed_is_idempotent_across_runs_on_file_database() {
    let dir = TempDir::new().expect("temp dir");
    let url = file_database_url(dir.path());

    with_env(&[("LAVKA_DATABASE_URL", url.as_str())], || {
        let first = seed::run(None);
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["message"], "demo catalog loaded: 6 products");

        let second = seed::run(None);
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(second_payload["status"], "ok");
        let message = second_payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("already populated"), "unexpected message: {message}");
    });
}

#[test]
fn ask_lists_seeded_products() {
    with_env(
        &[("LAVKA_DATABASE_URL", "sqlite::memory:"), ("LAVKA_TOOLS_SEED_DEMO_CATALOG", "true")],
        || {
            let result = ask::run(None, "Покажи все продукты");
            assert_eq!(result.exit_code, 0, "expected ask success: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "ask");
            let answer = payload["message"].as_str().unwrap_or_default();
            assert!(answer.contains("Ноутбук"));
            assert!(answer.contains("Книга"));
        },
    );
}

#[test]
fn ask_creates_order_then_reads_it_back_on_file_database() {
    let dir = TempDir::new().expect("temp dir");
    let url = file_database_url(dir.path());

    with_env(
        &[("LAVKA_DATABASE_URL", url.as_str()), ("LAVKA_TOOLS_SEED_DEMO_CATALOG", "true")],
        || {
            let created = ask::run(None, "Создай заказ: продукт 2, количество 3");
            assert_eq!(created.exit_code, 0, "expected order creation: {}", created.output);
            let answer = message_of(&created.output);
            assert!(answer.starts_with("Заказ создан"), "unexpected answer: {answer}");

            let stats = ask::run(None, "Статистика заказов");
            assert_eq!(stats.exit_code, 0);
            let answer = message_of(&stats.output);
            assert!(answer.contains("\"total_quantity\":3"), "unexpected answer: {answer}");
        },
    );
}

#[test]
fn ask_reports_agent_error_for_missing_order() {
    with_env(&[("LAVKA_DATABASE_URL", "sqlite::memory:")], || {
        let result = ask::run(None, "Найди заказ 42");
        assert_eq!(result.exit_code, 7, "expected agent error exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "agent_error");
        let answer = payload["message"].as_str().unwrap_or_default();
        assert!(answer.starts_with("Ошибка: "), "unexpected answer: {answer}");
    });
}

#[test]
fn ask_rejects_empty_query_without_touching_config() {
    with_env(&[("LAVKA_DATABASE_URL", "postgres://ignored")], || {
        let result = ask::run(None, "");
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn ask_answers_whitespace_query_with_help() {
    with_env(&[("LAVKA_DATABASE_URL", "sqlite::memory:")], || {
        let result = ask::run(None, "   ");
        assert_eq!(result.exit_code, 0, "expected help answer: {}", result.output);

        assert!(message_of(&result.output).starts_with("Я умею"));
    });
}

#[test]
fn plan_prints_discount_plan_without_database() {
    with_env(&[("LAVKA_DATABASE_URL", "postgres://ignored")], || {
        let result = plan::run("Скидка 15% на товар ID 2");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let plan: Value = serde_json::from_str(payload["message"].as_str().unwrap_or_default())
            .expect("plan json");
        assert_eq!(plan["intent"], "DISCOUNT");
        assert_eq!(plan["args"]["percent"], 15.0);
        assert_eq!(plan["args"]["product_id"], 2);
    });
}

#[test]
fn config_attributes_sources_to_env_file_and_default() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("lavka.toml");
    fs::write(&path, "[tools]\nbackend = \"direct\"\nkeep_alive = false\n").expect("write config");

    with_env(&[("LAVKA_DATABASE_URL", "sqlite::memory:")], || {
        let result = config::run(Some(&path));
        assert_eq!(result.exit_code, 0, "expected config success: {}", result.output);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message
            .contains("- database.url = sqlite::memory: (source: env (LAVKA_DATABASE_URL))"));
        assert!(message.contains(&format!(
            "- tools.keep_alive = false (source: file ({}))",
            path.display()
        )));
        assert!(message.contains("- server.port = 8000 (source: default)"));
    });
}

#[test]
fn config_fails_when_explicit_file_is_missing() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.toml");

    with_env(&[], || {
        let result = config::run(Some(&path));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn file_database_url(dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", dir.join("lavka.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn message_of(output: &str) -> String {
    parse_payload(output)["message"].as_str().unwrap_or_default().to_string()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "LAVKA_DATABASE_URL",
        "LAVKA_DATABASE_MAX_CONNECTIONS",
        "LAVKA_DATABASE_TIMEOUT_SECS",
        "LAVKA_SERVER_BIND_ADDRESS",
        "LAVKA_SERVER_PORT",
        "LAVKA_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "LAVKA_TOOLS_BACKEND",
        "LAVKA_TOOLS_MCP_COMMAND",
        "LAVKA_TOOLS_KEEP_ALIVE",
        "LAVKA_TOOLS_SEED_DEMO_CATALOG",
        "LAVKA_LOGGING_LEVEL",
        "LAVKA_LOGGING_FORMAT",
        "LAVKA_LOG_LEVEL",
        "LAVKA_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
