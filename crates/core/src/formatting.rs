//! Answer rendering for the agent. All user-facing text is Russian.

use std::fmt::Debug;

use serde::Serialize;

use crate::domain::order::Order;
use crate::domain::product::{Product, ProductStatistics};

pub const NOTHING_FOUND: &str = "Ничего не найдено.";
pub const NO_ORDERS_YET: &str = "Заказов пока нет.";

pub fn format_products(products: &[Product]) -> String {
    if products.is_empty() {
        return NOTHING_FOUND.to_string();
    }

    let mut lines = vec![
        "ID | Название | Цена | Категория | В наличии".to_string(),
        "---|---|---:|---|---".to_string(),
    ];
    lines.extend(products.iter().map(|product| {
        format!(
            "{} | {} | {:.2} | {} | {}",
            product.id,
            product.name,
            product.price,
            product.category,
            stock_label(product.in_stock)
        )
    }));
    lines.join("\n")
}

pub fn format_product(product: &Product) -> String {
    format!(
        "Товар #{}: {} — {:.2} ₽, категория: {}, в наличии: {}",
        product.id,
        product.name,
        product.price,
        product.category,
        stock_label(product.in_stock)
    )
}

pub fn format_statistics(stats: &ProductStatistics) -> String {
    format!("Количество товаров: {}\nСредняя цена: {:.2} ₽", stats.count, stats.average_price)
}

pub fn format_discount(product: &Product, percent: f64, discounted_price: f64) -> String {
    format!(
        "{}\nСкидка: {percent:.2}%\nЦена со скидкой: {discounted_price:.2} ₽",
        format_product(product)
    )
}

pub fn format_order(order: &Order) -> String {
    format!(
        "Заказ #{}: продукт {}, количество {}, статус: {}",
        order.id, order.product_id, order.quantity, order.status
    )
}

pub fn format_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return NO_ORDERS_YET.to_string();
    }

    let mut lines = vec![
        "ID | Продукт | Количество | Статус".to_string(),
        "---|---|---:|---".to_string(),
    ];
    lines.extend(orders.iter().map(|order| {
        format!("{} | {} | {} | {}", order.id, order.product_id, order.quantity, order.status)
    }));
    lines.join("\n")
}

/// `label` followed by the compact JSON form of `value`.
pub fn format_raw<T>(label: &str, value: &T) -> String
where
    T: Serialize + Debug,
{
    let body = serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"));
    format!("{label}: {body}")
}

fn stock_label(in_stock: bool) -> &'static str {
    if in_stock {
        "да"
    } else {
        "нет"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderId, OrderStatistics, ORDER_STATUS_CREATED};
    use crate::domain::product::ProductId;

    fn mouse() -> Product {
        Product {
            id: ProductId(1),
            name: "Мышка".to_string(),
            price: 1500.0,
            category: "Электроника".to_string(),
            in_stock: true,
        }
    }

    #[test]
    fn empty_product_list_reads_nothing_found() {
        assert_eq!(format_products(&[]), "Ничего не найдено.");
    }

    #[test]
    fn product_table_has_header_and_one_row_per_product() {
        let table = format_products(&[mouse()]);
        let lines = table.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "1 | Мышка | 1500.00 | Электроника | да");
    }

    #[test]
    fn discount_answer_shows_percent_and_new_price() {
        let answer = format_discount(&mouse(), 15.0, 1275.0);
        assert!(answer.starts_with("Товар #1: Мышка — 1500.00 ₽"));
        assert!(answer.contains("Скидка: 15.00%"));
        assert!(answer.ends_with("Цена со скидкой: 1275.00 ₽"));
    }

    #[test]
    fn orders_render_as_table_or_empty_message() {
        assert_eq!(format_orders(&[]), "Заказов пока нет.");

        let order = Order {
            id: OrderId(4),
            product_id: ProductId(1),
            quantity: 2,
            status: ORDER_STATUS_CREATED.to_string(),
        };
        let table = format_orders(&[order]);
        assert!(table.starts_with("ID | Продукт | Количество | Статус"));
        assert!(table.ends_with("4 | 1 | 2 | created"));
    }

    #[test]
    fn raw_format_is_compact_json() {
        assert_eq!(
            format_raw("Статистика заказов", &OrderStatistics::default()),
            r#"Статистика заказов: {"count":0,"total_quantity":0}"#
        );
    }
}
