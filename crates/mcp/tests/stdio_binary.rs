//! End-to-end tests against the real `lavka-mcp` binary.
//!
//! Each client spawns `lavka-mcp products|orders` as a child process over
//! stdio, both pointed at one temporary SQLite file, the way the server
//! bootstrap wires the `mcp` backend.

use std::path::Path;
use std::sync::Arc;

use lavka_core::domain::order::OrderId;
use lavka_core::domain::product::{NewProduct, ProductId};
use lavka_core::errors::PortError;
use lavka_core::ports::{OrdersPort, ProductsPort};
use lavka_mcp::{ChildProcessConnector, McpOrdersPort, McpProductsPort, McpStdioClient, ServerKind};
use tempfile::TempDir;

fn spawn_client(kind: ServerKind, database: &Path) -> Arc<McpStdioClient> {
    let connector = ChildProcessConnector::new(env!("CARGO_BIN_EXE_lavka-mcp"))
        .arg(kind.as_arg())
        .env("LAVKA_DATABASE_URL", format!("sqlite://{}?mode=rwc", database.display()))
        .env("LAVKA_LOGGING_LEVEL", "warn")
        .env("LAVKA_TOOLS_SEED_DEMO_CATALOG", "false");
    Arc::new(McpStdioClient::new(connector, true))
}

#[tokio::test]
async fn products_server_binary_adds_and_reads_back() {
    let dir = TempDir::new().expect("temp dir");
    let client = spawn_client(ServerKind::Products, &dir.path().join("lavka.db"));
    let products = McpProductsPort::new(client.clone());

    let added = products
        .add_product(NewProduct::new("  Мышка ", 1500.0, "Электроника"))
        .await
        .expect("add");
    assert_eq!(added.id, ProductId(1));
    assert_eq!(added.name, "Мышка");
    assert!(added.in_stock);

    assert_eq!(products.get_product(added.id).await.expect("get"), added);
    assert_eq!(products.list_products().await.expect("list"), vec![added]);

    let missing = products.get_product(ProductId(999)).await.expect_err("missing");
    assert_eq!(missing, PortError::product_not_found(999));

    let stats = products.product_statistics().await.expect("stats");
    assert_eq!(stats.count, 1);
    assert_eq!(stats.average_price, 1500.0);

    client.shutdown().await;
}

#[tokio::test]
async fn orders_server_binary_validates_and_counts() {
    let dir = TempDir::new().expect("temp dir");
    let database = dir.path().join("lavka.db");
    let products_client = spawn_client(ServerKind::Products, &database);
    let orders_client = spawn_client(ServerKind::Orders, &database);
    let products = McpProductsPort::new(products_client.clone());
    let orders = McpOrdersPort::new(orders_client.clone());

    let book = products.add_product(NewProduct::new("Книга", 800.0, "Книги")).await.expect("add");

    let zero = orders.create_order(book.id, 0).await.expect_err("zero quantity");
    assert!(zero.to_string().contains("quantity must be > 0"), "unexpected error: {zero}");

    let unknown = orders.create_order(ProductId(42), 1).await.expect_err("unknown product");
    assert!(unknown.is_not_found(), "unexpected error: {unknown:?}");

    let order = orders.create_order(book.id, 2).await.expect("create");
    assert_eq!(order.product_id, book.id);
    assert_eq!(order.status, "created");
    assert_eq!(orders.get_order(order.id).await.expect("get"), order);

    let missing = orders.get_order(OrderId(77)).await.expect_err("missing order");
    assert_eq!(missing, PortError::order_not_found(77));

    let stats = orders.order_statistics().await.expect("stats");
    assert_eq!(stats.count, 1);
    assert_eq!(stats.total_quantity, 2);

    products_client.shutdown().await;
    orders_client.shutdown().await;
}
