use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use lavka_agent::{AgentReply, AgentRuntime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<AgentRuntime>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new().route("/api/v1/agent/query", post(query)).with_state(ApiState { runtime })
}

pub async fn query(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<QueryRequest>,
) -> Response {
    if request.query.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError { error: "query must not be empty".to_string() }),
        )
            .into_response();
    }

    let correlation_id = headers
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(
        event_name = "api.query.received",
        correlation_id = %correlation_id,
        query_chars = request.query.chars().count(),
        "agent query received"
    );

    let reply: AgentReply =
        state.runtime.handle_with_correlation_id(&request.query, &correlation_id).await;
    (StatusCode::OK, Json(reply)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use lavka_agent::AgentRuntime;
    use lavka_core::domain::product::NewProduct;
    use lavka_core::ports::{OrdersPort, ProductsPort};
    use lavka_db::{InMemoryOrderRepository, InMemoryProductRepository};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::router;

    fn app() -> axum::Router {
        let products: Arc<dyn ProductsPort> = Arc::new(InMemoryProductRepository::with_products([
            NewProduct::new("Ноутбук", 50000.0, "Электроника"),
        ]));
        let orders: Arc<dyn OrdersPort> = Arc::new(InMemoryOrderRepository::new(products.clone()));
        router(Arc::new(AgentRuntime::new(products, orders)))
    }

    async fn post_json(body: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/agent/query")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn help_query_answers_with_usage() {
        let (status, body) = post_json(r#"{"query": "что ты умеешь?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().is_some_and(|answer| answer.contains("Я умею")));
        assert_eq!(body["error"], Value::Null);
    }

    #[tokio::test]
    async fn list_query_returns_catalog_table() {
        let (status, body) = post_json(r#"{"query": "Покажи продукты"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().is_some_and(|answer| answer.contains("Ноутбук")));
    }

    #[tokio::test]
    async fn failed_execution_still_returns_ok_with_error_field() {
        let (status, body) = post_json(r#"{"query": "скидка 10% на товар с ID 999"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Product with id=999 not found");
        assert_eq!(body["answer"], "Ошибка: Product with id=999 not found");
    }

    #[tokio::test]
    async fn whitespace_query_is_answered_with_help() {
        let (status, body) = post_json(r#"{"query": "   "}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().is_some_and(|answer| answer.starts_with("Я умею")));
        assert_eq!(body["error"], Value::Null);
    }

    #[tokio::test]
    async fn empty_query_is_unprocessable() {
        let (status, body) = post_json(r#"{"query": ""}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "query must not be empty");
    }

    #[tokio::test]
    async fn missing_query_field_is_rejected() {
        let (status, _) = post_json(r#"{"text": "покажи продукты"}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
