use sqlx::Row;

use lavka_core::domain::product::{NewProduct, Product, ProductId, ProductStatistics};
use lavka_core::errors::PortError;
use lavka_core::ports::ProductsPort;
use lavka_core::pricing::round_money;

use super::{decode_err, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, price, category, in_stock FROM product ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect()
    }

    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, price, category, in_stock FROM product WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    /// Inserts an already-normalized product and returns it with its new id.
    pub async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO product (name, price, category, in_stock) VALUES (?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.category)
        .bind(i64::from(product.in_stock))
        .execute(&self.pool)
        .await?;

        Ok(product.into_product(ProductId(result.last_insert_rowid())))
    }

    pub async fn statistics(&self) -> Result<ProductStatistics, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count, AVG(price) AS average_price FROM product")
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count").map_err(decode_err)?;
        let average_price: Option<f64> = row.try_get("average_price").map_err(decode_err)?;

        Ok(ProductStatistics {
            count: u64::try_from(count).unwrap_or_default(),
            average_price: round_money(average_price.unwrap_or(0.0)),
        })
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode_err)?;
    let name: String = row.try_get("name").map_err(decode_err)?;
    let price: f64 = row.try_get("price").map_err(decode_err)?;
    let category: String = row.try_get("category").map_err(decode_err)?;
    let in_stock: i64 = row.try_get("in_stock").map_err(decode_err)?;

    Ok(Product { id: ProductId(id), name, price, category, in_stock: in_stock != 0 })
}

#[async_trait::async_trait]
impl ProductsPort for SqlProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, PortError> {
        Ok(self.list().await?)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, PortError> {
        self.find_by_id(id).await?.ok_or_else(|| PortError::product_not_found(id.0))
    }

    async fn add_product(&self, product: NewProduct) -> Result<Product, PortError> {
        let product = product.normalized()?;
        let stored = self.insert(product).await?;
        tracing::debug!(
            event_name = "db.product.inserted",
            product_id = stored.id.0,
            category = %stored.category,
            "product stored"
        );
        Ok(stored)
    }

    async fn product_statistics(&self) -> Result<ProductStatistics, PortError> {
        Ok(self.statistics().await?)
    }
}
