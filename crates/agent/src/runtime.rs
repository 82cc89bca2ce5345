use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lavka_core::errors::ExecutionError;
use lavka_core::formatting::{
    format_discount, format_order, format_orders, format_product, format_products,
    format_raw, format_statistics,
};
use lavka_core::ports::{OrdersPort, ProductsPort};
use lavka_core::pricing::apply_discount;

use crate::planner::{Plan, Planner, RulePlanner};

pub const HELP_TEXT: &str = "Я умею:\n\
1) Показать продукты: «Покажи продукты» или «Покажи продукты в категории Электроника»\n\
2) Статистика: «Какая средняя цена продуктов?»\n\
3) Добавить: «Добавь новый продукт: Мышка, цена 1500, категория Электроника»\n\
4) Скидка: «Посчитай скидку 15% на товар с ID 1»\n\
5) Создать заказ: «Создай заказ: продукт 1, количество 2»\n\
6) Заказы: «Покажи заказы», «Найди заказ 1» или «Статистика заказов»";

const ERROR_PREFIX: &str = "Ошибка: ";

/// What the caller gets back for one query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub answer: String,
    pub error: Option<String>,
}

/// Per-request state carried through the flow steps.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    pub query: String,
    pub plan: Option<Plan>,
    pub answer: Option<String>,
    pub error: Option<String>,
}

impl AgentState {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), plan: None, answer: None, error: None }
    }

    fn into_reply(self) -> AgentReply {
        AgentReply { answer: self.answer.unwrap_or_else(|| help_text(None)), error: self.error }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowStep {
    Route,
    Execute,
    Help,
    Done,
}

/// Routes a query to a plan, executes it against the ports, and renders the
/// answer. Failures never escape `handle`; they become an error reply.
pub struct AgentRuntime {
    planner: Arc<dyn Planner>,
    products: Arc<dyn ProductsPort>,
    orders: Arc<dyn OrdersPort>,
}

impl AgentRuntime {
    pub fn new(products: Arc<dyn ProductsPort>, orders: Arc<dyn OrdersPort>) -> Self {
        Self::with_planner(Arc::new(RulePlanner::new()), products, orders)
    }

    pub fn with_planner(
        planner: Arc<dyn Planner>,
        products: Arc<dyn ProductsPort>,
        orders: Arc<dyn OrdersPort>,
    ) -> Self {
        Self { planner, products, orders }
    }

    pub async fn handle(&self, query: &str) -> AgentReply {
        let correlation_id = Uuid::new_v4().to_string();
        self.handle_with_correlation_id(query, &correlation_id).await
    }

    pub async fn handle_with_correlation_id(
        &self,
        query: &str,
        correlation_id: &str,
    ) -> AgentReply {
        let mut state = AgentState::new(query);
        let mut step = FlowStep::Route;

        while step != FlowStep::Done {
            step = match step {
                FlowStep::Route => self.route(&mut state, correlation_id),
                FlowStep::Execute => self.execute(&mut state, correlation_id).await,
                FlowStep::Help => help(&mut state),
                FlowStep::Done => FlowStep::Done,
            };
        }

        tracing::info!(
            event_name = "agent.query.completed",
            correlation_id = %correlation_id,
            intent = state.plan.as_ref().map(|plan| plan.intent().as_str()).unwrap_or("HELP"),
            failed = state.error.is_some(),
            "query handled"
        );
        state.into_reply()
    }

    fn route(&self, state: &mut AgentState, correlation_id: &str) -> FlowStep {
        let plan = self.planner.plan(&state.query);
        let intent = plan.intent();
        tracing::debug!(
            event_name = "agent.query.routed",
            correlation_id = %correlation_id,
            intent = intent.as_str(),
            "plan selected"
        );

        state.plan = Some(plan);
        if intent.is_executable() {
            FlowStep::Execute
        } else {
            FlowStep::Help
        }
    }

    async fn execute(&self, state: &mut AgentState, correlation_id: &str) -> FlowStep {
        let Some(plan) = state.plan.as_ref() else {
            return FlowStep::Help;
        };

        match self.run(plan).await {
            Ok(Some(answer)) => {
                state.answer = Some(answer);
                FlowStep::Done
            }
            Ok(None) => FlowStep::Help,
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.execute.failed",
                    correlation_id = %correlation_id,
                    intent = plan.intent().as_str(),
                    error_kind = error.kind(),
                    error = %error,
                    "execution failed"
                );
                let message = error.to_string();
                state.answer = Some(format!("{ERROR_PREFIX}{message}"));
                state.error = Some(message);
                FlowStep::Done
            }
        }
    }

    /// `Ok(None)` hands the request to the help step.
    async fn run(&self, plan: &Plan) -> Result<Option<String>, ExecutionError> {
        let answer = match plan {
            Plan::List => format_products(&self.products.list_products().await?),
            Plan::ListByCategory { category } => {
                let wanted = category.trim().to_lowercase();
                let products: Vec<_> = self
                    .products
                    .list_products()
                    .await?
                    .into_iter()
                    .filter(|product| product.category.to_lowercase() == wanted)
                    .collect();
                format_products(&products)
            }
            Plan::Stats => format_statistics(&self.products.product_statistics().await?),
            Plan::Add(product) => {
                let stored = self.products.add_product(product.clone()).await?;
                format!("Добавлено ✅\n{}", format_product(&stored))
            }
            Plan::Discount { percent, product_id } => {
                let product = self.products.get_product(*product_id).await?;
                let discounted = apply_discount(product.price, *percent)?;
                format_discount(&product, *percent, discounted)
            }
            Plan::OrderCreate { product_id, quantity } => {
                let order = self.orders.create_order(*product_id, *quantity).await?;
                format!("Заказ создан ✅\n{}", format_order(&order))
            }
            Plan::OrderList => format_orders(&self.orders.list_orders().await?),
            Plan::OrderGet { order_id } => {
                format_raw("Заказ", &self.orders.get_order(*order_id).await?)
            }
            Plan::OrderStats => {
                format_raw("Статистика заказов", &self.orders.order_statistics().await?)
            }
            Plan::Help { .. } => return Ok(None),
        };
        Ok(Some(answer))
    }
}

fn help(state: &mut AgentState) -> FlowStep {
    let hint = state.plan.as_ref().and_then(Plan::hint);
    state.answer = Some(help_text(hint));
    FlowStep::Done
}

/// The usage text, followed by the planner's hint when there is one.
pub fn help_text(hint: Option<&str>) -> String {
    match hint {
        Some(hint) if !hint.trim().is_empty() => format!("{HELP_TEXT}\n\n{hint}"),
        _ => HELP_TEXT.to_string(),
    }
}
