use std::sync::Arc;

use tokio::sync::RwLock;

use lavka_core::domain::order::{
    validate_quantity, Order, OrderId, OrderStatistics, ORDER_STATUS_CREATED,
};
use lavka_core::domain::product::{NewProduct, Product, ProductId, ProductStatistics};
use lavka_core::errors::PortError;
use lavka_core::ports::{OrdersPort, ProductsPort};
use lavka_core::pricing::round_money;

/// Products kept in id order; ids are assigned sequentially from 1.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given products already stored, ids 1..=n.
    pub fn with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
        let products = products
            .into_iter()
            .zip(1_i64..)
            .map(|(product, id)| product.into_product(ProductId(id)))
            .collect();
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductsPort for InMemoryProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, PortError> {
        Ok(self.products.read().await.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, PortError> {
        let products = self.products.read().await;
        products
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or_else(|| PortError::product_not_found(id.0))
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product, PortError> {
        let product = product.normalized()?;
        let mut products = self.products.write().await;
        let next_id = products.last().map_or(1, |last| last.id.0 + 1);
        let stored = product.into_product(ProductId(next_id));
        products.push(stored.clone());
        Ok(stored)
    }

    async fn product_statistics(&self) -> Result<ProductStatistics, PortError> {
        let products = self.products.read().await;
        if products.is_empty() {
            return Ok(ProductStatistics::empty());
        }

        let total: f64 = products.iter().map(|product| product.price).sum();
        Ok(ProductStatistics {
            count: products.len() as u64,
            average_price: round_money(total / products.len() as f64),
        })
    }
}

/// Orders checked against whichever products port it was built with.
pub struct InMemoryOrderRepository {
    products: Arc<dyn ProductsPort>,
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new(products: Arc<dyn ProductsPort>) -> Self {
        Self { products, orders: RwLock::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl OrdersPort for InMemoryOrderRepository {
    async fn create_order(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, PortError> {
        let quantity = validate_quantity(quantity)?;
        self.products.get_product(product_id).await?;

        let mut orders = self.orders.write().await;
        let next_id = orders.last().map_or(1, |last| last.id.0 + 1);
        let order = Order {
            id: OrderId(next_id),
            product_id,
            quantity,
            status: ORDER_STATUS_CREATED.to_string(),
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, PortError> {
        Ok(self.orders.read().await.clone())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, PortError> {
        let orders = self.orders.read().await;
        orders
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or_else(|| PortError::order_not_found(id.0))
    }

    async fn order_statistics(&self) -> Result<OrderStatistics, PortError> {
        let orders = self.orders.read().await;
        Ok(OrderStatistics {
            count: orders.len() as u64,
            total_quantity: orders.iter().map(|order| order.quantity).sum(),
        })
    }
}
