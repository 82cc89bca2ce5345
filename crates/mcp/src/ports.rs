use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use lavka_core::domain::order::{Order, OrderId, OrderStatistics};
use lavka_core::domain::product::{NewProduct, Product, ProductId, ProductStatistics};
use lavka_core::errors::PortError;
use lavka_core::ports::{OrdersPort, ProductsPort};

use crate::client::McpStdioClient;
use crate::tools::{
    ADD_PRODUCT, CREATE_ORDER, GET_ORDER, GET_ORDERS_STATISTICS, GET_PRODUCT, GET_STATISTICS,
    LIST_ORDERS, LIST_PRODUCTS,
};

/// `ProductsPort` backed by the products tool server.
#[derive(Clone)]
pub struct McpProductsPort {
    client: Arc<McpStdioClient>,
}

impl McpProductsPort {
    pub fn new(client: Arc<McpStdioClient>) -> Self {
        Self { client }
    }
}

/// `OrdersPort` backed by the orders tool server.
#[derive(Clone)]
pub struct McpOrdersPort {
    client: Arc<McpStdioClient>,
}

impl McpOrdersPort {
    pub fn new(client: Arc<McpStdioClient>) -> Self {
        Self { client }
    }
}

async fn call<T: DeserializeOwned>(
    client: &McpStdioClient,
    tool: &'static str,
    arguments: Value,
) -> Result<T, PortError> {
    let payload = client.call(tool, arguments).await?;
    serde_json::from_value(payload)
        .map_err(|error| PortError::Decode(format!("tool `{tool}`: {error}")))
}

#[async_trait]
impl ProductsPort for McpProductsPort {
    async fn list_products(&self) -> Result<Vec<Product>, PortError> {
        call(&self.client, LIST_PRODUCTS, json!({})).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, PortError> {
        call(&self.client, GET_PRODUCT, json!({ "product_id": id.0 })).await
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product, PortError> {
        let product = product.normalized()?;
        call(
            &self.client,
            ADD_PRODUCT,
            json!({
                "name": product.name,
                "price": product.price,
                "category": product.category,
                "in_stock": product.in_stock,
            }),
        )
        .await
    }

    async fn product_statistics(&self) -> Result<ProductStatistics, PortError> {
        call(&self.client, GET_STATISTICS, json!({})).await
    }
}

#[async_trait]
impl OrdersPort for McpOrdersPort {
    async fn create_order(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, PortError> {
        call(
            &self.client,
            CREATE_ORDER,
            json!({ "product_id": product_id.0, "quantity": quantity }),
        )
        .await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, PortError> {
        call(&self.client, LIST_ORDERS, json!({})).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, PortError> {
        call(&self.client, GET_ORDER, json!({ "order_id": id.0 })).await
    }

    async fn order_statistics(&self) -> Result<OrderStatistics, PortError> {
        call(&self.client, GET_ORDERS_STATISTICS, json!({})).await
    }
}
