use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use lavka_core::config::{resolve_config_path, AppConfig};
use toml::Value;

use crate::commands::{load_config, CommandResult};

/// One rendered setting: dotted key, effective value, env keys that feed it.
struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("config", error_class, message, exit_code);
        }
    };

    let file_path = resolve_config_path(config_path);
    let file_doc = load_config_file_doc(file_path.as_deref());

    let mut lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
    ];
    lines.extend(fields(&config).into_iter().map(|field| {
        let source = field_source(&field, file_doc.as_ref(), file_path.as_ref());
        render_line(field.key, &field.value, source)
    }));

    CommandResult::success("config", lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["LAVKA_DATABASE_URL"],
        },
        Field {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["LAVKA_DATABASE_MAX_CONNECTIONS"],
        },
        Field {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            env_keys: &["LAVKA_DATABASE_TIMEOUT_SECS"],
        },
        Field {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["LAVKA_SERVER_BIND_ADDRESS"],
        },
        Field {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["LAVKA_SERVER_PORT"],
        },
        Field {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["LAVKA_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Field {
            key: "tools.backend",
            value: config.tools.backend.as_str().to_string(),
            env_keys: &["LAVKA_TOOLS_BACKEND"],
        },
        Field {
            key: "tools.mcp_command",
            value: config.tools.mcp_command.clone(),
            env_keys: &["LAVKA_TOOLS_MCP_COMMAND"],
        },
        Field {
            key: "tools.keep_alive",
            value: config.tools.keep_alive.to_string(),
            env_keys: &["LAVKA_TOOLS_KEEP_ALIVE"],
        },
        Field {
            key: "tools.seed_demo_catalog",
            value: config.tools.seed_demo_catalog.to_string(),
            env_keys: &["LAVKA_TOOLS_SEED_DEMO_CATALOG"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["LAVKA_LOGGING_LEVEL", "LAVKA_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            env_keys: &["LAVKA_LOGGING_FORMAT", "LAVKA_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field, file_doc: Option<&Value>, file_path: Option<&PathBuf>) -> String {
    if let Some(env_key) = field.env_keys.iter().copied().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if file_doc.is_some_and(|doc| contains_path(doc, field.key)) {
        let file_path = file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
