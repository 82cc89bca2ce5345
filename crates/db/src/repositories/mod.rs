use thiserror::Error;

use lavka_core::errors::PortError;

pub mod memory;
pub mod order;
pub mod product;

pub use memory::{InMemoryOrderRepository, InMemoryProductRepository};
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for PortError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(source) => PortError::Storage(source.to_string()),
            RepositoryError::Decode(message) => PortError::Decode(message),
        }
    }
}

fn decode_err(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}
