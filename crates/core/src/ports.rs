//! Seams between the agent core and whatever stores products and orders.
//!
//! Implementations live in `lavka-db` (SQLite, in-memory) and `lavka-mcp`
//! (tool calls over stdio). The agent only ever sees these traits.

use async_trait::async_trait;

use crate::domain::order::{Order, OrderId, OrderStatistics};
use crate::domain::product::{NewProduct, Product, ProductId, ProductStatistics};
use crate::errors::PortError;

#[async_trait]
pub trait ProductsPort: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, PortError>;

    /// Fails with `PortError::NotFound` for an unknown id.
    async fn get_product(&self, id: ProductId) -> Result<Product, PortError>;

    async fn add_product(&self, product: NewProduct) -> Result<Product, PortError>;

    async fn product_statistics(&self) -> Result<ProductStatistics, PortError>;
}

#[async_trait]
pub trait OrdersPort: Send + Sync {
    /// Fails on a non-positive quantity or an unknown product id.
    async fn create_order(&self, product_id: ProductId, quantity: i64)
        -> Result<Order, PortError>;

    async fn list_orders(&self) -> Result<Vec<Order>, PortError>;

    async fn get_order(&self, id: OrderId) -> Result<Order, PortError>;

    async fn order_statistics(&self) -> Result<OrderStatistics, PortError>;
}
