pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_config, connect_with_settings, DbPool};
pub use fixtures::{seed_demo_catalog, SeedResult, DEMO_CATALOG};
pub use repositories::{
    InMemoryOrderRepository, InMemoryProductRepository, RepositoryError, SqlOrderRepository,
    SqlProductRepository,
};
