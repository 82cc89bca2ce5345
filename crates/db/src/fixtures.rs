use sqlx::Row;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Demo catalog loaded by `lavka seed` and by servers started with
/// `tools.seed_demo_catalog = true`: (name, price, category, in_stock).
pub const DEMO_CATALOG: &[(&str, f64, &str, bool)] = &[
    ("Ноутбук", 50000.0, "Электроника", true),
    ("Мышка", 1500.0, "Электроника", true),
    ("Наушники", 4200.0, "Электроника", false),
    ("Чайник", 3500.0, "Бытовая техника", true),
    ("Кофемолка", 2700.0, "Бытовая техника", true),
    ("Книга", 800.0, "Книги", true),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    /// The product table already had rows, so nothing was written.
    pub skipped: bool,
}

/// Inserts [`DEMO_CATALOG`] when the product table is empty.
pub async fn seed_demo_catalog(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query("SELECT COUNT(*) AS count FROM product")
        .fetch_one(&mut *tx)
        .await?
        .try_get("count")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

    if existing > 0 {
        tx.rollback().await?;
        tracing::debug!(
            event_name = "db.seed.skipped",
            existing_products = existing,
            "catalog already populated"
        );
        return Ok(SeedResult { inserted: 0, skipped: true });
    }

    for (name, price, category, in_stock) in DEMO_CATALOG {
        sqlx::query("INSERT INTO product (name, price, category, in_stock) VALUES (?, ?, ?, ?)")
            .bind(*name)
            .bind(*price)
            .bind(*category)
            .bind(i64::from(*in_stock))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(
        event_name = "db.seed.completed",
        inserted = DEMO_CATALOG.len(),
        "demo catalog seeded"
    );
    Ok(SeedResult { inserted: DEMO_CATALOG.len(), skipped: false })
}
