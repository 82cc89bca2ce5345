use std::sync::Arc;

use lavka_agent::AgentRuntime;
use lavka_core::config::{AppConfig, ConfigError, ToolBackend};
use lavka_core::ports::{OrdersPort, ProductsPort};
use lavka_db::{
    connect_with_config, migrations, seed_demo_catalog, DbPool, RepositoryError,
    SqlOrderRepository, SqlProductRepository,
};
use lavka_mcp::{
    ChildProcessConnector, McpOrdersPort, McpProductsPort, McpStdioClient, OrderTools,
    ProductTools, ToolCategory,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub agent_runtime: Arc<AgentRuntime>,
    /// Live tool-server clients when running with the `mcp` backend.
    pub tool_clients: Vec<Arc<McpStdioClient>>,
}

impl Application {
    pub async fn shutdown(&self) {
        for client in &self.tool_clients {
            client.shutdown().await;
        }
        self.db_pool.close().await;
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("demo catalog seeding failed: {0}")]
    Seed(#[source] RepositoryError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        backend = config.tools.backend.as_str(),
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    if config.tools.seed_demo_catalog {
        let seeded = seed_demo_catalog(&db_pool).await.map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.catalog_seeded",
            correlation_id = "bootstrap",
            inserted = seeded.inserted,
            skipped = seeded.skipped,
            "demo catalog checked"
        );
    }

    let (products, orders, tool_clients) = match config.tools.backend {
        ToolBackend::Direct => {
            let products: Arc<dyn ProductsPort> =
                Arc::new(SqlProductRepository::new(db_pool.clone()));
            let orders: Arc<dyn OrdersPort> = Arc::new(SqlOrderRepository::new(db_pool.clone()));
            (products, orders, Vec::new())
        }
        ToolBackend::Mcp => {
            let products_client = Arc::new(tool_client::<ProductTools>(&config));
            let orders_client = Arc::new(tool_client::<OrderTools>(&config));
            let products: Arc<dyn ProductsPort> =
                Arc::new(McpProductsPort::new(products_client.clone()));
            let orders: Arc<dyn OrdersPort> = Arc::new(McpOrdersPort::new(orders_client.clone()));
            (products, orders, vec![products_client, orders_client])
        }
    };

    info!(
        event_name = "system.bootstrap.ports_ready",
        correlation_id = "bootstrap",
        backend = config.tools.backend.as_str(),
        "agent ports configured"
    );

    Ok(Application {
        config,
        db_pool,
        agent_runtime: Arc::new(AgentRuntime::new(products, orders)),
        tool_clients,
    })
}

/// The tool server shares this process's database and log level.
fn tool_client<C: ToolCategory>(config: &AppConfig) -> McpStdioClient {
    let connector = ChildProcessConnector::new(config.tools.mcp_command.clone())
        .arg(C::category_name())
        .env("LAVKA_DATABASE_URL", config.database.url.clone())
        .env("LAVKA_LOGGING_LEVEL", config.logging.level.clone());
    McpStdioClient::new(connector, config.tools.keep_alive)
}
