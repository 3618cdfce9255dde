//! The v1 REST API — user memory operations.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use strata_core::{Error, SummarizerError};
use strata_engine::{LayerDescriptor, SessionReport};
use tracing::info;

use crate::SharedState;

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/users/{user_id}/layers", get(get_layers_handler))
        .route("/users/{user_id}/layers/{layer_num}", put(put_layer_handler))
        .route("/users/{user_id}/session-end", post(session_end_handler))
        .route("/users/{user_id}/promote", post(promote_handler))
        .route("/users/{user_id}/style", post(style_handler))
        .route("/users/{user_id}/context", get(get_context_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize)]
struct LayersResponse {
    user_id: String,
    updated_at: String,
    layers: Vec<LayerDescriptor>,
}

#[derive(Deserialize)]
struct SessionEndRequest {
    /// Summary of the completed session.
    session_summary: String,
    /// Fact strings detected by the caller's extraction step.
    #[serde(default)]
    detected_facts: Vec<String>,
}

#[derive(Deserialize)]
struct PromoteRequest {
    fact: String,
    /// Target layer: 3 (patterns), 4 (profile), or 5 (milestones).
    target_layer: u8,
}

#[derive(Serialize)]
struct PromoteResponse {
    promoted: bool,
    target_layer: u8,
}

#[derive(Deserialize)]
struct PutLayerRequest {
    content: String,
}

#[derive(Serialize)]
struct PutLayerResponse {
    layer_num: u8,
}

#[derive(Deserialize)]
struct StyleRequest {
    transcripts: Vec<String>,
}

#[derive(Serialize)]
struct StyleResponse {
    style: String,
}

#[derive(Serialize)]
struct ContextResponse {
    context: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error onto an HTTP status with a JSON body.
fn to_api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Summarizer(SummarizerError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
        Error::Summarizer(_) => StatusCode::BAD_GATEWAY,
        Error::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn get_layers_handler(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<LayersResponse>, ApiError> {
    let record = state.engine.record(&user_id).await.map_err(to_api_error)?;
    Ok(Json(LayersResponse {
        user_id,
        updated_at: record.updated_at.to_rfc3339(),
        layers: LayerDescriptor::all_from(&record),
    }))
}

async fn session_end_handler(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(payload): Json<SessionEndRequest>,
) -> Result<Json<SessionReport>, ApiError> {
    info!(user = %user_id, facts = payload.detected_facts.len(), "v1 session-end");
    let report = state
        .engine
        .session_end(&user_id, &payload.session_summary, &payload.detected_facts)
        .await
        .map_err(to_api_error)?;
    Ok(Json(report))
}

async fn promote_handler(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(payload): Json<PromoteRequest>,
) -> Result<Json<PromoteResponse>, ApiError> {
    state
        .engine
        .promote(&user_id, &payload.fact, payload.target_layer)
        .await
        .map_err(to_api_error)?;
    Ok(Json(PromoteResponse {
        promoted: true,
        target_layer: payload.target_layer,
    }))
}

async fn put_layer_handler(
    State(state): State<SharedState>,
    Path((user_id, layer_num)): Path<(String, u8)>,
    Json(payload): Json<PutLayerRequest>,
) -> Result<Json<PutLayerResponse>, ApiError> {
    state
        .engine
        .put_layer(&user_id, layer_num, payload.content)
        .await
        .map_err(to_api_error)?;
    Ok(Json(PutLayerResponse { layer_num }))
}

async fn style_handler(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(payload): Json<StyleRequest>,
) -> Result<Json<StyleResponse>, ApiError> {
    let style = state
        .engine
        .analyze_style(&user_id, &payload.transcripts)
        .await
        .map_err(to_api_error)?;
    Ok(Json(StyleResponse { style }))
}

async fn get_context_handler(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<ContextResponse>, ApiError> {
    let context = state
        .engine
        .build_context(&user_id)
        .await
        .map_err(to_api_error)?;
    Ok(Json(ContextResponse { context }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayState, build_router};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use strata_engine::MemoryEngine;
    use strata_store::InMemoryStore;
    use strata_summarizer::ScriptedSummarizer;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<ScriptedSummarizer>) {
        let stub = Arc::new(ScriptedSummarizer::echoing());
        let store = Arc::new(InMemoryStore::new());
        let state = Arc::new(GatewayState {
            engine: Arc::new(MemoryEngine::new(store, stub.clone())),
        });
        (build_router(state), stub)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn layers_listing_has_five_entries_with_budgets() {
        let (app, _stub) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/users/u1/layers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let layers = json["layers"].as_array().unwrap();
        assert_eq!(layers.len(), 5);
        assert_eq!(layers[0]["content"], "ephemeral, session-only");
        assert!(layers[0].get("word_budget").is_none());
        assert_eq!(layers[1]["word_budget"], 500);
        assert_eq!(layers[4]["word_budget"], 200);
    }

    #[tokio::test]
    async fn put_then_get_round_trips_exactly() {
        let (app, stub) = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/v1/users/u1/layers/4",
                serde_json::json!({"content": "custom text"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/users/u1/layers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["layers"][3]["content"], "custom text");
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn put_rejects_out_of_range_layer() {
        let (app, _stub) = test_app();

        let response = app
            .oneshot(json_request(
                "PUT",
                "/v1/users/u1/layers/1",
                serde_json::json!({"content": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("out of range"));
    }

    #[tokio::test]
    async fn session_end_returns_per_step_report() {
        let (app, stub) = test_app();
        stub.push_reply("merged recent context");

        let response = app
            .oneshot(json_request(
                "POST",
                "/v1/users/u1/session-end",
                serde_json::json!({
                    "session_summary": "mentioned dog named Rex",
                    "detected_facts": ["has dog named Rex"]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["context_merged"], true);
        assert_eq!(json["facts_recorded"], 1);
        assert_eq!(json["milestone_recorded"], false);
    }

    #[tokio::test]
    async fn session_end_rejects_blank_summary() {
        let (app, stub) = test_app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/v1/users/u1/session-end",
                serde_json::json!({"session_summary": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn promote_rejects_layer_two() {
        let (app, _stub) = test_app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/v1/users/u1/promote",
                serde_json::json!({"fact": "allergic to peanuts", "target_layer": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn context_endpoint_assembles_in_priority_order() {
        let (app, _stub) = test_app();

        for (layer, content) in [(2u8, "recent talk"), (5u8, "big milestone")] {
            app.clone()
                .oneshot(json_request(
                    "PUT",
                    &format!("/v1/users/u1/layers/{layer}"),
                    serde_json::json!({"content": content}),
                ))
                .await
                .unwrap();
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/users/u1/context")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(
            json["context"],
            "[Milestones]\nbig milestone\n\n[Recent]\nrecent talk"
        );
    }

    #[tokio::test]
    async fn style_endpoint_writes_profile_field() {
        let (app, stub) = test_app();
        stub.push_reply("Concise and direct.");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/v1/users/u1/style",
                serde_json::json!({"transcripts": ["short answers please"]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["style"], "Concise and direct.");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/users/u1/layers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        let profile = json["layers"][3]["content"].as_str().unwrap();
        assert!(profile.contains("[communication_style] Concise and direct."));
    }
}
