//! Lavka MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Catalog tools over the configured database
//! lavka-mcp products
//!
//! # Order tools against a specific database
//! LAVKA_DATABASE_URL=sqlite://lavka.db?mode=rwc lavka-mcp orders
//! ```
//!
//! stdout carries the protocol, so logs go to stderr.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use lavka_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use lavka_db::{
    connect_with_config, migrations, seed_demo_catalog, SqlOrderRepository, SqlProductRepository,
};
use lavka_mcp::{CatalogToolServer, OrderToolServer, ServerKind};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "lavka-mcp", about = "Lavka MCP tool server over stdio")]
struct Cli {
    /// Which tool set to serve
    #[arg(value_enum)]
    server: ServerKind,
    /// Overrides `database.url`
    #[arg(long)]
    database_url: Option<String>,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(LoadOptions {
        overrides: ConfigOverrides { database_url: cli.database_url, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    })?;
    init_logging(&config);

    info!(
        event_name = "mcp.bootstrap.start",
        server = cli.server.as_arg(),
        database_url = %config.database.url,
        "starting lavka MCP server"
    );

    let db_pool = connect_with_config(&config.database).await?;
    migrations::run_pending(&db_pool).await?;
    if config.tools.seed_demo_catalog {
        seed_demo_catalog(&db_pool).await?;
    }

    match cli.server {
        ServerKind::Products => {
            CatalogToolServer::new(Arc::new(SqlProductRepository::new(db_pool))).run_stdio().await
        }
        ServerKind::Orders => {
            OrderToolServer::new(Arc::new(SqlOrderRepository::new(db_pool))).run_stdio().await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use lavka_mcp::ServerKind;

    use super::Cli;

    #[test]
    fn parses_server_kind_and_database_override() {
        let cli = Cli::try_parse_from(["lavka-mcp", "orders", "--database-url", "sqlite::memory:"])
            .expect("parse");

        assert_eq!(cli.server, ServerKind::Orders);
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn rejects_unknown_server_kind() {
        assert!(Cli::try_parse_from(["lavka-mcp", "payments"]).is_err());
    }
}
