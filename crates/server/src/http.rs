//! HTTP surface of the engine.
//!
//! Routes:
//! - `GET  /:user_id/creatives/top/:count`
//! - `GET  /:user_id/creatives/last/:count`
//! - `GET  /:user_id/creatives/:creative_id`
//! - `POST /:user_id/creatives` with a `creative_id,nbr_success` body, sent
//!   raw or as the first key of a form-encoded payload
//! - `GET  /health`

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use data_loader::{CreativeId, DataLoadError, UserId, parser::parse_user_success_body};
use pipeline::ScoredCreative;

use crate::config::ServerConfig;
use crate::engine::{CreativeRecommendationEngine, EngineSummary};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CreativeRecommendationEngine>,
}

impl AppState {
    pub fn new(engine: CreativeRecommendationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Errors a handler can return
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    BadRequest(#[from] DataLoadError),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("{0:#}")]
    Engine(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            error!("Request failed: {}", message);
        }

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "status": status.as_u16(),
            })),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Build the router with all routes and request tracing
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/:user_id/creatives/top/:count", get(top_creatives))
        .route("/:user_id/creatives/last/:count", get(last_creatives))
        .route("/:user_id/creatives/:creative_id", get(creative_prediction))
        .route("/:user_id/creatives", post(add_success_events))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until the process stops
pub async fn serve(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let router = create_router(state);
    let address = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to address {}", address))?;

    info!("HTTP server listening on {}", address);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn top_creatives(
    State(state): State<AppState>,
    Path((user_id, count)): Path<(UserId, usize)>,
) -> ApiResult<Vec<ScoredCreative>> {
    info!("User {} TOP {} creatives requested", user_id, count);
    let top = state.engine.get_top_nbr_success(user_id, count).await?;
    Ok(Json(top))
}

async fn last_creatives(
    State(state): State<AppState>,
    Path((user_id, count)): Path<(UserId, usize)>,
) -> ApiResult<Vec<ScoredCreative>> {
    info!("User {} LAST {} creatives requested", user_id, count);
    let last = state.engine.get_last_nbr_success(user_id, count).await?;
    Ok(Json(last))
}

async fn creative_prediction(
    State(state): State<AppState>,
    Path((user_id, creative_id)): Path<(UserId, CreativeId)>,
) -> ApiResult<Vec<ScoredCreative>> {
    info!("User {} nbr_success requested for creative {}", user_id, creative_id);
    let scored = state
        .engine
        .get_nbr_success_for_creative_ids(user_id, &[creative_id])
        .await?;
    Ok(Json(scored))
}

async fn add_success_events(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Vec<(UserId, CreativeId, f32)>> {
    let body = decode_success_body(&headers, &body)?;
    let events = parse_user_success_body(user_id, &body)?;
    info!("User {} posted {} success events", user_id, events.len());

    let added = state.engine.add_nbr_success(events).await?;
    Ok(Json(
        added
            .into_iter()
            .map(|e| (e.user_id, e.creative_id, e.nbr_success))
            .collect(),
    ))
}

/// Raw bodies are used as is. Form-encoded bodies carry the rows in the
/// first key.
fn decode_success_body(headers: &HeaderMap, body: &[u8]) -> Result<String, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with(FORM_URLENCODED) {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ApiError::MalformedBody(format!("Failed to parse form data: {}", e)))?;
        return Ok(pairs.into_iter().next().map(|(key, _)| key).unwrap_or_default());
    }

    String::from_utf8(body.to_vec())
        .map_err(|e| ApiError::MalformedBody(format!("Invalid UTF-8: {}", e)))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    summary: EngineSummary,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        summary: state.engine.summary().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use data_loader::{Creative, DataIndex, SuccessEvent};
    use serde_json::Value;
    use tower::ServiceExt;

    /// Creatives 1-3 perform well, 4-6 poorly. User 1 has only seen 1 and 4.
    fn build_test_router() -> (Router, AppState) {
        let mut index = DataIndex::new();
        for id in 1..=6 {
            index.insert_creative(Creative {
                id,
                name: format!("Banner {id}"),
            });
        }
        for user in 2..=10_u32 {
            for creative in 1..=6_u32 {
                let value = if creative <= 3 { 75.0 } else { 4.0 };
                index.insert_event(SuccessEvent::new(user, creative, value + (user % 3) as f32));
            }
        }
        index.insert_event(SuccessEvent::new(1, 1, 78.0));
        index.insert_event(SuccessEvent::new(1, 4, 3.0));

        let engine = CreativeRecommendationEngine::new(index, EngineConfig::default())
            .expect("Failed to create engine");
        let state = AppState::new(engine);
        (create_router(state.clone()), state)
    }

    fn row_ids(body: &Value) -> Vec<u64> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|row| row[1].as_u64().unwrap())
            .collect()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "text/plain")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_single_creative_route_returns_tuple() {
        let (router, _) = build_test_router();
        let (status, body) = send(router, get_request("/1/creatives/2")).await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);

        let row = rows[0].as_array().unwrap();
        assert_eq!(row.len(), 4);
        assert_eq!(row[0], "Banner 2");
        assert_eq!(row[1], 2);
        assert!(row[2].is_number());
        assert_eq!(row[3], 9);
    }

    #[tokio::test]
    async fn test_unknown_creative_returns_empty_list() {
        let (router, _) = build_test_router();
        let (status, body) = send(router, get_request("/1/creatives/999")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_top_route_respects_count_and_threshold() {
        let (router, _) = build_test_router();
        let (status, body) = send(router.clone(), get_request("/1/creatives/top/10")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_ids(&body), vec![2, 3]);
        for row in body.as_array().unwrap() {
            assert!(row[2].as_f64().unwrap() >= 50.0);
        }

        let (_, body) = send(router, get_request("/1/creatives/top/1")).await;
        assert_eq!(row_ids(&body), vec![2]);
    }

    #[tokio::test]
    async fn test_last_route_respects_threshold() {
        let (router, _) = build_test_router();
        let (status, body) = send(router, get_request("/1/creatives/last/10")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_ids(&body), vec![5, 6]);
        for row in body.as_array().unwrap() {
            assert!(row[2].as_f64().unwrap() < 20.0);
        }
    }

    #[tokio::test]
    async fn test_non_numeric_path_is_bad_request() {
        let (router, _) = build_test_router();
        let response = router
            .oneshot(get_request("/abc/creatives/top/3"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_ingests_and_echoes_events() {
        let (router, state) = build_test_router();
        let before = state.engine.summary().await.success_events;

        let (status, body) = send(router, post_request("/1/creatives", "2,80\n3,4.5\n")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([[1, 2, 80.0], [1, 3, 4.5]]));
        assert_eq!(state.engine.summary().await.success_events, before + 2);
    }

    #[tokio::test]
    async fn test_post_malformed_body_is_bad_request() {
        let (router, state) = build_test_router();
        let before = state.engine.summary().await.success_events;

        let (status, body) = send(router, post_request("/1/creatives", "2,lots\n")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("line 1"));
        assert_eq!(state.engine.summary().await.success_events, before);
    }

    #[tokio::test]
    async fn test_post_non_finite_value_is_bad_request() {
        for value in ["nan", "inf", "1e39"] {
            let (router, state) = build_test_router();
            let before = state.engine.current().await;

            let (status, body) =
                send(router, post_request("/1/creatives", &format!("2,{value}\n"))).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{value}");
            assert!(body["error"].as_str().unwrap().contains("must be finite"));
            assert!(Arc::ptr_eq(&before, &state.engine.current().await));
        }
    }

    #[tokio::test]
    async fn test_post_form_encoded_body() {
        let (router, state) = build_test_router();
        let before = state.engine.summary().await.success_events;

        let request = Request::builder()
            .method("POST")
            .uri("/1/creatives")
            .header("content-type", FORM_URLENCODED)
            .body(Body::from("2%2C80%0A3%2C+4.5"))
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([[1, 2, 80.0], [1, 3, 4.5]]));
        assert_eq!(state.engine.summary().await.success_events, before + 2);
    }

    #[tokio::test]
    async fn test_post_empty_body_is_bad_request() {
        let (router, _) = build_test_router();
        let (status, _) = send(router, post_request("/1/creatives", "")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_reports_counts() {
        let (router, _) = build_test_router();
        let (status, body) = send(router, get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["creatives"], 6);
        assert_eq!(body["success_events"], 9 * 6 + 2);
        assert_eq!(body["users"], 10);
        assert_eq!(body["model_rank"], 6);
    }
}
