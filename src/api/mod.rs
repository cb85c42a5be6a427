use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    ChatbotError,
    error::FALLBACK_REPLY,
    pipeline::{ChatOutcome, ChatPipeline},
    stations::StationReading,
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub user_query: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStation {
    pub station_code: String,
    pub station_name: String,
    pub data_time: String,
    pub data_value: f64,
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub summary: String,
    pub language: String,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<ApiStation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub error: String,
}

impl From<&StationReading> for ApiStation {
    fn from(station: &StationReading) -> Self {
        Self {
            station_code: station.station_code.clone(),
            station_name: station.station_name.clone(),
            data_time: station.data_time.to_string(),
            data_value: station.data_value,
            unit: station.unit.clone(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/stations", get(get_stations))
        .route("/health", get(health))
        .with_state(state)
}

async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if request.user_query.trim().is_empty() {
        let err = ChatbotError::validation("userQuery must not be empty");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                summary: None,
                error: err.user_message(),
            }),
        ));
    }

    match state.pipeline.respond(&request.user_query).await {
        ChatOutcome::Answered(exchange) => Ok(Json(QueryResponse {
            station: exchange.matched_station.as_ref().map(ApiStation::from),
            matched: exchange.matched_station.is_some(),
            language: exchange.detected_language,
            summary: exchange.reply_text,
        })),
        ChatOutcome::Unavailable(failure) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                summary: Some(FALLBACK_REPLY.to_string()),
                error: failure.error.user_message(),
            }),
        )),
    }
}

async fn get_stations(State(state): State<AppState>) -> Json<Vec<ApiStation>> {
    let stations = state
        .pipeline
        .matcher()
        .registry()
        .all_stations()
        .iter()
        .map(ApiStation::from)
        .collect();
    Json(stations)
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{MatchMode, QueryMatcher};
    use crate::stations::StationRegistry;
    use crate::translation::{PassthroughTranslator, TranslationResult, Translator};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct DownTranslator;

    #[async_trait]
    impl Translator for DownTranslator {
        fn name(&self) -> &str {
            "down"
        }

        async fn translate(&self, _: &str, _: &str) -> crate::Result<TranslationResult> {
            Err(ChatbotError::translation_unavailable("connection refused"))
        }
    }

    fn app(translator: Arc<dyn Translator>) -> Router {
        let registry = Arc::new(StationRegistry::builtin().unwrap());
        let pipeline = ChatPipeline::new(
            translator,
            QueryMatcher::new(registry, MatchMode::Substring),
        );
        router(AppState {
            pipeline: Arc::new(pipeline),
        })
    }

    fn query_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_query_answers() {
        let response = app(Arc::new(PassthroughTranslator::new()))
            .oneshot(query_request(
                r#"{"userQuery": "What is the water level at Dhond?"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: QueryResponse = body_json(response).await;
        assert_eq!(
            body.summary,
            "Water level at Dhond is 5.2 m (measured on 2025-09-10)."
        );
        assert_eq!(body.language, "en");
        assert!(body.matched);
        assert_eq!(body.station.unwrap().station_code, "001");
    }

    #[tokio::test]
    async fn test_query_rejects_blank_input() {
        let response = app(Arc::new(PassthroughTranslator::new()))
            .oneshot(query_request(r#"{"userQuery": "   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = body_json(response).await;
        assert!(body.error.contains("userQuery"));
    }

    #[tokio::test]
    async fn test_query_gateway_down() {
        let response = app(Arc::new(DownTranslator))
            .oneshot(query_request(r#"{"userQuery": "Pune?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.summary.as_deref(), Some(FALLBACK_REPLY));
        assert!(!body.error.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_list_stations() {
        let response = app(Arc::new(PassthroughTranslator::new()))
            .oneshot(
                Request::builder()
                    .uri("/stations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stations: Vec<ApiStation> = body_json(response).await;
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[2].station_name, "Delhi");
        assert_eq!(stations[2].data_time, "2025-09-12");
    }
}
