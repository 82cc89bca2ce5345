use std::fmt;

use thiserror::Error;

/// A pattern matched but one of its numeric captures did not convert.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("could not parse {field} from `{raw}`")]
pub struct ParseFailure {
    pub field: &'static str,
    pub raw: String,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("percent must be between 0 and 100")]
    DiscountOutOfRange { percent: f64 },
    #[error("quantity must be > 0")]
    NonPositiveQuantity { quantity: i64 },
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("price must be a non-negative number")]
    InvalidPrice { price: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Product,
    Order,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => f.write_str("Product"),
            Self::Order => f.write_str("Order"),
        }
    }
}

/// Failures reported by a catalog or order store, local or remote.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PortError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} with id={id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("{0}")]
    Rejected(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("decode failure: {0}")]
    Decode(String),
}

impl PortError {
    pub fn product_not_found(id: i64) -> Self {
        Self::NotFound { entity: Entity::Product, id }
    }

    pub fn order_not_found(id: i64) -> Self {
        Self::NotFound { entity: Entity::Order, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Stable label for logs and wire payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Rejected(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "storage",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}

/// Everything the execute step can fail with; rendered into the answer.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExecutionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Port(#[from] PortError),
}

impl ExecutionError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Port(error) => error.kind(),
        }
    }
}
