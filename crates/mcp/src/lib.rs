//! Lavka MCP (Model Context Protocol) tool servers and client ports
//!
//! Two stdio tool servers expose the catalog and the order book to any MCP
//! client, and the client side implements `ProductsPort` / `OrdersPort` on
//! top of them so the agent can run against either backend unchanged.
//!
//! ## Architecture
//!
//! - `CatalogToolServer` / `OrderToolServer`: MCP servers over the ports
//! - `McpStdioClient`: spawns a tool server and owns its session
//! - `McpProductsPort` / `McpOrdersPort`: port implementations over the client
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lavka_db::InMemoryProductRepository;
//! use lavka_mcp::CatalogToolServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = CatalogToolServer::new(Arc::new(InMemoryProductRepository::new()));
//!     server.run_stdio().await
//! }
//! ```

mod client;
mod ports;
mod server;
mod tools;

pub use client::{ChildProcessConnector, ClientError, McpStdioClient, SessionConnector, ToolSession};
pub use ports::{McpOrdersPort, McpProductsPort};
pub use server::{
    AddProductRequest, CatalogToolServer, CreateOrderRequest, GetOrderRequest, GetProductRequest,
    OrderToolServer,
};
pub use tools::*;

use lavka_core::errors::{Entity, PortError};
use rmcp::model::ErrorCode;
use rmcp::ErrorData;
use serde_json::json;
use thiserror::Error;

/// Errors raised while serving a tool call
#[derive(Error, Debug)]
pub enum McpError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::Port(PortError::NotFound { .. })
            | McpError::Port(PortError::Validation(_))
            | McpError::Port(PortError::Rejected(_)) => -32602, // Invalid params
            McpError::Port(_) | McpError::Serialization(_) => -32603, // Internal error
        }
    }

    /// Machine-readable kind carried in the error data.
    pub fn kind(&self) -> &'static str {
        match self {
            McpError::Port(error) => error.kind(),
            McpError::Serialization(_) => "decode",
        }
    }

    fn data(&self) -> serde_json::Value {
        match self {
            McpError::Port(PortError::NotFound { entity, id }) => json!({
                "kind": self.kind(),
                "entity": entity_label(*entity),
                "id": id,
            }),
            _ => json!({ "kind": self.kind() }),
        }
    }
}

impl From<McpError> for ErrorData {
    fn from(error: McpError) -> Self {
        let data = error.data();
        ErrorData::new(ErrorCode(error.error_code()), error.to_string(), Some(data))
    }
}

/// Inverse of the error data written by the servers.
pub fn port_error_from_data(message: &str, data: Option<&serde_json::Value>) -> PortError {
    let kind = data.and_then(|data| data.get("kind")).and_then(|kind| kind.as_str());
    match kind {
        Some("not_found") => {
            let entity = data
                .and_then(|data| data.get("entity"))
                .and_then(|entity| entity.as_str())
                .and_then(parse_entity);
            let id = data.and_then(|data| data.get("id")).and_then(|id| id.as_i64());
            match (entity, id) {
                (Some(entity), Some(id)) => PortError::NotFound { entity, id },
                _ => PortError::Rejected(message.to_string()),
            }
        }
        Some("validation") => PortError::Rejected(message.to_string()),
        Some("storage") => PortError::Storage(message.to_string()),
        Some("decode") => PortError::Decode(message.to_string()),
        _ => PortError::Transport(message.to_string()),
    }
}

fn entity_label(entity: Entity) -> &'static str {
    match entity {
        Entity::Product => "product",
        Entity::Order => "order",
    }
}

fn parse_entity(label: &str) -> Option<Entity> {
    match label {
        "product" => Some(Entity::Product),
        "order" => Some(Entity::Order),
        _ => None,
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use lavka_core::errors::{PortError, ValidationError};
    use rmcp::ErrorData;

    use super::{port_error_from_data, McpError};

    #[test]
    fn not_found_round_trips_through_error_data() {
        let data: ErrorData = McpError::from(PortError::product_not_found(999)).into();

        assert_eq!(data.code.0, -32602);
        assert_eq!(data.message, "Product with id=999 not found");

        let restored = port_error_from_data(&data.message, data.data.as_ref());
        assert_eq!(restored, PortError::product_not_found(999));
        assert_eq!(restored.to_string(), "Product with id=999 not found");
    }

    #[test]
    fn validation_keeps_message_text() {
        let error = McpError::from(PortError::from(ValidationError::NonPositiveQuantity {
            quantity: 0,
        }));
        assert_eq!(error.kind(), "validation");

        let data: ErrorData = error.into();
        let restored = port_error_from_data(&data.message, data.data.as_ref());
        assert_eq!(restored, PortError::Rejected("quantity must be > 0".to_string()));
    }

    #[test]
    fn storage_failures_are_internal_errors() {
        let error = McpError::from(PortError::Storage("disk I/O error".to_string()));
        assert_eq!(error.error_code(), -32603);

        let data: ErrorData = error.into();
        let restored = port_error_from_data(&data.message, data.data.as_ref());
        assert!(matches!(restored, PortError::Storage(_)));
    }

    #[test]
    fn missing_kind_is_treated_as_transport() {
        let restored = port_error_from_data("method not found", None);
        assert_eq!(restored, PortError::Transport("method not found".to_string()));
    }
}
