//! Rule-based planner: turns a free-text Russian command into a [`Plan`].
//!
//! Rules are checked top to bottom and the first match wins, so a query that
//! fits several patterns resolves by rule order rather than by where the
//! pattern occurs in the text. Keyword checks run on the lowercased query;
//! the regexes are case-insensitive and run on the original text.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use lavka_core::domain::order::OrderId;
use lavka_core::domain::product::{NewProduct, ProductId};
use lavka_core::errors::ParseFailure;

/// Attached to the fallback plan when no rule matched.
pub const UNRECOGNIZED_HINT: &str =
    "Я понимаю: продукты (список/статистика/добавить/скидка) и заказы (создать/показать/статистика).";

static ADD_PRODUCT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)добав(ь|ить)\s+нов(ый|ую)\s+продукт:\s*(?P<name>[^,]+),\s*цена\s*(?P<price>\d+(?:\.\d+)?),\s*категори[яи]\s*(?P<category>.+)",
    )
});

static DISCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)скидк[ау]\s*(?P<percent>\d+(?:\.\d+)?)\s*%.*?\b(id|ID)\s*(?P<id>\d+)")
});

static CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)категори[яи]\s+(?P<category>.+)"));

static ORDER_CREATE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)(созда(й|ть)\s+заказ|оформ(и|ить)\s+заказ)\s*[:\-]?\s*(продукт|товар)\s*(?P<pid>\d+)\s*,?\s*(количеств(о|а))\s*(?P<qty>\d+)",
    )
});

static ORDER_GET: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(заказ)\s*(id|ID)?\s*(?P<oid>\d+)"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("planner pattern must compile")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    List,
    ListByCategory,
    Stats,
    Add,
    Discount,
    OrderCreate,
    OrderList,
    OrderGet,
    OrderStats,
    Help,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "LIST",
            Self::ListByCategory => "LIST_BY_CATEGORY",
            Self::Stats => "STATS",
            Self::Add => "ADD",
            Self::Discount => "DISCOUNT",
            Self::OrderCreate => "ORDER_CREATE",
            Self::OrderList => "ORDER_LIST",
            Self::OrderGet => "ORDER_GET",
            Self::OrderStats => "ORDER_STATS",
            Self::Help => "HELP",
        }
    }

    /// Everything except HELP is handled by the execute step.
    pub fn is_executable(&self) -> bool {
        !matches!(self, Self::Help)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intent together with its typed arguments.
///
/// Serializes as `{"intent": "...", "args": {...}}`; argument-less intents
/// omit `args`, and HELP without a hint serializes with empty args.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "args", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    List,
    ListByCategory {
        category: String,
    },
    Stats,
    Add(NewProduct),
    Discount {
        percent: f64,
        product_id: ProductId,
    },
    OrderCreate {
        product_id: ProductId,
        quantity: i64,
    },
    OrderList,
    OrderGet {
        order_id: OrderId,
    },
    OrderStats,
    Help {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
}

impl Plan {
    pub fn help() -> Self {
        Self::Help { hint: None }
    }

    pub fn intent(&self) -> Intent {
        match self {
            Self::List => Intent::List,
            Self::ListByCategory { .. } => Intent::ListByCategory,
            Self::Stats => Intent::Stats,
            Self::Add(_) => Intent::Add,
            Self::Discount { .. } => Intent::Discount,
            Self::OrderCreate { .. } => Intent::OrderCreate,
            Self::OrderList => Intent::OrderList,
            Self::OrderGet { .. } => Intent::OrderGet,
            Self::OrderStats => Intent::OrderStats,
            Self::Help { .. } => Intent::Help,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Help { hint } => hint.as_deref(),
            _ => None,
        }
    }
}

pub trait Planner: Send + Sync {
    /// Never fails: anything it cannot understand becomes HELP.
    fn plan(&self, query: &str) -> Plan;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RulePlanner;

impl RulePlanner {
    pub fn new() -> Self {
        Self
    }

    /// Like [`Planner::plan`] but reports a matched rule whose numeric capture
    /// did not convert (non-ASCII digits, integer overflow).
    pub fn try_plan(&self, query: &str) -> Result<Plan, ParseFailure> {
        let q = query.trim();
        if q.is_empty() {
            return Ok(Plan::help());
        }

        let ql = q.to_lowercase();

        if ql.contains("статист") && ql.contains("заказ") {
            return Ok(Plan::OrderStats);
        }

        if ql.contains("покажи") && ql.contains("заказ") {
            return Ok(Plan::OrderList);
        }

        if let Some(caps) = ORDER_CREATE.captures(q) {
            return Ok(Plan::OrderCreate {
                product_id: ProductId(number(&caps, "pid", "product_id")?),
                quantity: number(&caps, "qty", "quantity")?,
            });
        }

        let asks_for_order = ["покажи", "найди", "получ"].iter().any(|verb| ql.contains(verb));
        if ql.contains("заказ") && asks_for_order {
            if let Some(caps) = ORDER_GET.captures(q) {
                return Ok(Plan::OrderGet { order_id: OrderId(number(&caps, "oid", "order_id")?) });
            }
        }

        if ql.contains("средняя цена") || ql.contains("статистик") {
            return Ok(Plan::Stats);
        }

        if let Some(caps) = ADD_PRODUCT.captures(q) {
            return Ok(Plan::Add(NewProduct::new(
                text(&caps, "name"),
                number(&caps, "price", "price")?,
                text(&caps, "category"),
            )));
        }

        if let Some(caps) = DISCOUNT.captures(q) {
            return Ok(Plan::Discount {
                percent: number(&caps, "percent", "percent")?,
                product_id: ProductId(number(&caps, "id", "product_id")?),
            });
        }

        if ql.contains("покажи") || ql.contains("список") {
            if let Some(caps) = CATEGORY.captures(q) {
                return Ok(Plan::ListByCategory { category: text(&caps, "category") });
            }
            return Ok(Plan::List);
        }

        Ok(Plan::Help { hint: Some(UNRECOGNIZED_HINT.to_string()) })
    }
}

impl Planner for RulePlanner {
    fn plan(&self, query: &str) -> Plan {
        self.try_plan(query).unwrap_or_else(|failure| {
            tracing::warn!(
                event_name = "agent.plan.parse_failure",
                field = failure.field,
                raw = %failure.raw,
                "matched rule carried a malformed number"
            );
            Plan::Help {
                hint: Some(format!(
                    "Не удалось распознать число в поле {}: «{}».",
                    failure.field, failure.raw
                )),
            }
        })
    }
}

fn text(caps: &Captures<'_>, group: &str) -> String {
    caps.name(group).map(|m| m.as_str().trim().to_string()).unwrap_or_default()
}

fn number<T: FromStr>(
    caps: &Captures<'_>,
    group: &str,
    field: &'static str,
) -> Result<T, ParseFailure> {
    let raw = caps.name(group).map(|m| m.as_str()).unwrap_or_default();
    raw.parse::<T>().map_err(|_| ParseFailure { field, raw: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use lavka_core::domain::order::OrderId;
    use lavka_core::domain::product::{NewProduct, ProductId};
    use lavka_core::errors::ParseFailure;

    use super::{Intent, Plan, Planner, RulePlanner, UNRECOGNIZED_HINT};

    fn plan(query: &str) -> Plan {
        RulePlanner::new().plan(query)
    }

    #[test]
    fn blank_input_is_help_without_hint() {
        for query in ["", "   ", "\t\n "] {
            assert_eq!(plan(query), Plan::Help { hint: None }, "query {query:?}");
        }
    }

    #[test]
    fn add_extracts_typed_product() {
        assert_eq!(
            plan("добавь новый продукт: Мышка, цена 1500, категория Электроника"),
            Plan::Add(NewProduct::new("Мышка", 1500.0, "Электроника"))
        );
    }

    #[test]
    fn add_tolerates_case_and_verb_forms() {
        let planned = plan("Добавить новую продукт:  Чайник , цена 3500.50, категории Кухня и быт!");
        assert_eq!(planned, Plan::Add(NewProduct::new("Чайник", 3500.5, "Кухня и быт!")));
    }

    #[test]
    fn discount_extracts_percent_and_id() {
        assert_eq!(
            plan("скидка 15% на товар с ID 1"),
            Plan::Discount { percent: 15.0, product_id: ProductId(1) }
        );
        assert_eq!(
            plan("Посчитай скидку 12.5 % для id 7"),
            Plan::Discount { percent: 12.5, product_id: ProductId(7) }
        );
    }

    #[test]
    fn order_create_extracts_product_and_quantity() {
        assert_eq!(
            plan("создай заказ: продукт 1, количество 2"),
            Plan::OrderCreate { product_id: ProductId(1), quantity: 2 }
        );
        assert_eq!(
            plan("Оформить заказ - товар 3 количества 10"),
            Plan::OrderCreate { product_id: ProductId(3), quantity: 10 }
        );
    }

    #[test]
    fn order_keywords_take_priority() {
        assert_eq!(plan("статистика заказов"), Plan::OrderStats);
        assert_eq!(plan("Покажи заказы"), Plan::OrderList);
        // "покажи" + "заказ" is claimed by the list rule before lookup by id.
        assert_eq!(plan("покажи заказ 5"), Plan::OrderList);
        assert_eq!(plan("найди заказ 5"), Plan::OrderGet { order_id: OrderId(5) });
        assert_eq!(plan("получить заказ ID 12"), Plan::OrderGet { order_id: OrderId(12) });
    }

    #[test]
    fn order_lookup_without_number_falls_through() {
        assert_eq!(plan("найди заказ"), Plan::Help { hint: Some(UNRECOGNIZED_HINT.to_string()) });
    }

    #[test]
    fn statistics_phrases_map_to_stats() {
        assert_eq!(plan("Какая средняя цена продуктов?"), Plan::Stats);
        assert_eq!(plan("статистика по товарам"), Plan::Stats);
    }

    #[test]
    fn listing_with_and_without_category() {
        assert_eq!(plan("Покажи продукты"), Plan::List);
        assert_eq!(plan("список товаров"), Plan::List);
        assert_eq!(
            plan("Покажи продукты в категории Электроника  "),
            Plan::ListByCategory { category: "Электроника".to_string() }
        );
    }

    #[test]
    fn unknown_query_is_help_with_hint() {
        let planned = plan("что ты умеешь?");
        assert_eq!(planned.intent(), Intent::Help);
        assert_eq!(planned.hint(), Some(UNRECOGNIZED_HINT));
    }

    #[test]
    fn overflowing_number_is_a_parse_failure() {
        let query = "найди заказ 99999999999999999999";

        let failure = RulePlanner::new().try_plan(query).expect_err("overflow");
        assert_eq!(
            failure,
            ParseFailure { field: "order_id", raw: "99999999999999999999".to_string() }
        );

        let degraded = plan(query);
        assert_eq!(degraded.intent(), Intent::Help);
        assert!(degraded.hint().is_some_and(|hint| hint.contains("order_id")));
    }

    #[test]
    fn non_ascii_digits_are_a_parse_failure() {
        let failure = RulePlanner::new()
            .try_plan("создай заказ: продукт ١, количество 2")
            .expect_err("arabic-indic digit");
        assert_eq!(failure.field, "product_id");
    }

    #[test]
    fn plan_serializes_as_intent_and_args() {
        let json = serde_json::to_value(plan("скидка 15% на товар с ID 1")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"intent": "DISCOUNT", "args": {"percent": 15.0, "product_id": 1}})
        );

        let help = serde_json::to_value(plan("")).expect("serialize");
        assert_eq!(help, serde_json::json!({"intent": "HELP", "args": {}}));
    }

    #[test]
    fn only_help_skips_execution() {
        assert!(!Intent::Help.is_executable());
        assert!(Intent::OrderStats.is_executable());
        assert_eq!(Intent::ListByCategory.to_string(), "LIST_BY_CATEGORY");
    }
}
