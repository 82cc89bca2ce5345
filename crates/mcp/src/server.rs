//! MCP tool servers for the catalog and the order book.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    schemars::{self, JsonSchema},
    tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lavka_core::domain::order::OrderId;
use lavka_core::domain::product::{NewProduct, ProductId};
use lavka_core::ports::{OrdersPort, ProductsPort};

use crate::McpError;

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetProductRequest {
    #[schemars(description = "Product id")]
    pub product_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddProductRequest {
    #[schemars(description = "Product name")]
    pub name: String,

    #[schemars(description = "Price in rubles, non-negative")]
    pub price: f64,

    #[schemars(description = "Catalog category")]
    pub category: String,

    #[schemars(description = "Whether the product is in stock")]
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

/// Catalog tools over a `ProductsPort`
#[derive(Clone)]
pub struct CatalogToolServer {
    products: Arc<dyn ProductsPort>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CatalogToolServer {
    pub fn new(products: Arc<dyn ProductsPort>) -> Self {
        Self { products, tool_router: Self::tool_router() }
    }

    /// Run the server with stdio transport
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        info!(event_name = "mcp.server.starting", server = "products", "serving on stdio");
        let service = self.serve(rmcp::transport::stdio()).await?;
        let quit = service.waiting().await?;
        info!(event_name = "mcp.server.stopped", server = "products", reason = ?quit, "shutdown complete");
        Ok(())
    }

    #[tool(description = "List all products ordered by id")]
    async fn list_products(&self) -> Result<CallToolResult, ErrorData> {
        debug!(event_name = "mcp.tool.called", tool = "list_products");
        let products = self.products.list_products().await.map_err(McpError::from)?;
        json_result(&products)
    }

    #[tool(description = "Get one product by id")]
    async fn get_product(
        &self,
        Parameters(input): Parameters<GetProductRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(event_name = "mcp.tool.called", tool = "get_product", product_id = input.product_id);
        let product =
            self.products.get_product(ProductId(input.product_id)).await.map_err(McpError::from)?;
        json_result(&product)
    }

    #[tool(description = "Add a product to the catalog and return it with its new id")]
    async fn add_product(
        &self,
        Parameters(input): Parameters<AddProductRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(event_name = "mcp.tool.called", tool = "add_product", category = %input.category);
        let product = NewProduct::new(input.name, input.price, input.category)
            .with_in_stock(input.in_stock);
        let stored = self.products.add_product(product).await.map_err(McpError::from)?;
        json_result(&stored)
    }

    #[tool(description = "Product count and average price")]
    async fn get_statistics(&self) -> Result<CallToolResult, ErrorData> {
        debug!(event_name = "mcp.tool.called", tool = "get_statistics");
        let stats = self.products.product_statistics().await.map_err(McpError::from)?;
        json_result(&stats)
    }
}

#[tool_handler]
impl ServerHandler for CatalogToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Lavka products server - list, look up, and add catalog products.".to_string(),
            ),
            ..Default::default()
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateOrderRequest {
    #[schemars(description = "Id of an existing product")]
    pub product_id: i64,

    #[schemars(description = "Quantity, must be greater than zero")]
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetOrderRequest {
    #[schemars(description = "Order id")]
    pub order_id: i64,
}

/// Order tools over an `OrdersPort`
#[derive(Clone)]
pub struct OrderToolServer {
    orders: Arc<dyn OrdersPort>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OrderToolServer {
    pub fn new(orders: Arc<dyn OrdersPort>) -> Self {
        Self { orders, tool_router: Self::tool_router() }
    }

    /// Run the server with stdio transport
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        info!(event_name = "mcp.server.starting", server = "orders", "serving on stdio");
        let service = self.serve(rmcp::transport::stdio()).await?;
        let quit = service.waiting().await?;
        info!(event_name = "mcp.server.stopped", server = "orders", reason = ?quit, "shutdown complete");
        Ok(())
    }

    #[tool(description = "Create an order for an existing product")]
    async fn create_order(
        &self,
        Parameters(input): Parameters<CreateOrderRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(
            event_name = "mcp.tool.called",
            tool = "create_order",
            product_id = input.product_id,
            quantity = input.quantity
        );
        let order = self
            .orders
            .create_order(ProductId(input.product_id), input.quantity)
            .await
            .map_err(McpError::from)?;
        json_result(&order)
    }

    #[tool(description = "List all orders ordered by id")]
    async fn list_orders(&self) -> Result<CallToolResult, ErrorData> {
        debug!(event_name = "mcp.tool.called", tool = "list_orders");
        let orders = self.orders.list_orders().await.map_err(McpError::from)?;
        json_result(&orders)
    }

    #[tool(description = "Get one order by id")]
    async fn get_order(
        &self,
        Parameters(input): Parameters<GetOrderRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(event_name = "mcp.tool.called", tool = "get_order", order_id = input.order_id);
        let order = self.orders.get_order(OrderId(input.order_id)).await.map_err(McpError::from)?;
        json_result(&order)
    }

    #[tool(description = "Order count and total ordered quantity")]
    async fn get_orders_statistics(&self) -> Result<CallToolResult, ErrorData> {
        debug!(event_name = "mcp.tool.called", tool = "get_orders_statistics");
        let stats = self.orders.order_statistics().await.map_err(McpError::from)?;
        json_result(&stats)
    }
}

#[tool_handler]
impl ServerHandler for OrderToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Lavka orders server - create orders and read order statistics.".to_string(),
            ),
            ..Default::default()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let value = serde_json::to_value(value).map_err(McpError::from)?;
    Ok(CallToolResult::success(vec![Content::json(value)?]))
}

fn default_true() -> bool {
    true
}
