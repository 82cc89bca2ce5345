use sqlx::Row;

use lavka_core::domain::order::{
    validate_quantity, Order, OrderId, OrderStatistics, ORDER_STATUS_CREATED,
};
use lavka_core::domain::product::ProductId;
use lavka_core::errors::PortError;
use lavka_core::ports::OrdersPort;

use super::{decode_err, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn product_exists(&self, product_id: ProductId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM product WHERE id = ?")
            .bind(product_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn insert(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO customer_order (product_id, quantity, status) VALUES (?, ?, ?)",
        )
        .bind(product_id.0)
        .bind(quantity)
        .bind(ORDER_STATUS_CREATED)
        .execute(&self.pool)
        .await?;

        Ok(Order {
            id: OrderId(result.last_insert_rowid()),
            product_id,
            quantity,
            status: ORDER_STATUS_CREATED.to_string(),
        })
    }

    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, product_id, quantity, status FROM customer_order ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_order).collect()
    }

    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, product_id, quantity, status FROM customer_order WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_order(r)?)),
            None => Ok(None),
        }
    }

    pub async fn statistics(&self) -> Result<OrderStatistics, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count, COALESCE(SUM(quantity), 0) AS total_quantity
             FROM customer_order",
        )
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count").map_err(decode_err)?;
        let total_quantity: i64 = row.try_get("total_quantity").map_err(decode_err)?;

        Ok(OrderStatistics { count: u64::try_from(count).unwrap_or_default(), total_quantity })
    }
}

fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<Order, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode_err)?;
    let product_id: i64 = row.try_get("product_id").map_err(decode_err)?;
    let quantity: i64 = row.try_get("quantity").map_err(decode_err)?;
    let status: String = row.try_get("status").map_err(decode_err)?;

    Ok(Order { id: OrderId(id), product_id: ProductId(product_id), quantity, status })
}

#[async_trait::async_trait]
impl OrdersPort for SqlOrderRepository {
    async fn create_order(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, PortError> {
        let quantity = validate_quantity(quantity)?;
        if !self.product_exists(product_id).await? {
            return Err(PortError::product_not_found(product_id.0));
        }

        let order = self.insert(product_id, quantity).await?;
        tracing::debug!(
            event_name = "db.order.inserted",
            order_id = order.id.0,
            product_id = product_id.0,
            quantity,
            "order stored"
        );
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, PortError> {
        Ok(self.list().await?)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, PortError> {
        self.find_by_id(id).await?.ok_or_else(|| PortError::order_not_found(id.0))
    }

    async fn order_statistics(&self) -> Result<OrderStatistics, PortError> {
        Ok(self.statistics().await?)
    }
}
