//! REST API Server for the research assistant
//!
//! Exposes per-session chat over HTTP. Each session id owns one
//! `SessionState`; the server creates it on request and drops it on delete.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::assistant::Assistant;
use crate::classifier::QueryClassifier;
use crate::state::{SessionState, SubmitRejection};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn not_found(id: Uuid) -> ApiResult {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!("Session {} not found", id))),
    )
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<Assistant>,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

/// =============================
/// Helpers — Session Ids
/// =============================

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// UUIDs pass through; any other label maps to a stable UUID.
pub fn session_uuid(value: &str) -> Uuid {
    let value = value.trim();
    Uuid::parse_str(value).unwrap_or_else(|_| stable_uuid_from_string(value))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Session Endpoints
/// =============================

async fn create_session(
    State(state): State<ApiState>,
    body: Option<Json<CreateSessionRequest>>,
) -> ApiResult {
    let request = body.map(|Json(req)| req).unwrap_or_default();
    let id = match request.session_id.as_deref() {
        Some(label) if !label.trim().is_empty() => session_uuid(label),
        _ => Uuid::new_v4(),
    };

    let mut sessions = state.sessions.write().await;
    let created = !sessions.contains_key(&id);
    sessions.entry(id).or_default();

    info!(session_id = %id, created, "Session opened");

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(ApiResponse::success(serde_json::json!({ "session_id": id }))),
    )
}

async fn get_history(State(state): State<ApiState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = session_uuid(&raw_id);
    let sessions = state.sessions.read().await;

    let Some(session) = sessions.get(&id) else {
        return not_found(id);
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "session_id": id,
            "busy": session.is_busy(),
            "entries": session.history,
        }))),
    )
}

async fn delete_session(State(state): State<ApiState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = session_uuid(&raw_id);

    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            info!(session_id = %id, "Session discarded");
            (
                StatusCode::OK,
                Json(ApiResponse::success(serde_json::json!({ "session_id": id }))),
            )
        }
        None => not_found(id),
    }
}

/// =============================
/// Query Endpoint
/// =============================

async fn submit_query(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
    Json(req): Json<QueryRequest>,
) -> ApiResult {
    let id = session_uuid(&raw_id);

    // Mark busy under the lock, then run without holding it.
    let snapshot = {
        let mut sessions = state.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return not_found(id);
        };

        match session.submit(&req.query) {
            Ok(()) => session.clone(),
            Err(SubmitRejection::EmptyQuery) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error("Query must not be empty".into())),
                )
            }
            Err(SubmitRejection::Busy) => {
                return (
                    StatusCode::CONFLICT,
                    Json(ApiResponse::error(
                        "A query is already being processed for this session".into(),
                    )),
                )
            }
        }
    };

    info!(session_id = %id, "Received query");
    let kind = QueryClassifier::classify(&req.query);

    // Detached so the write-back still runs if the client goes away.
    let worker = {
        let assistant = state.assistant.clone();
        let sessions = state.sessions.clone();
        tokio::spawn(async move {
            let finished = assistant.process(snapshot).await;
            let entry = finished.history.last().cloned();

            // A session deleted mid-flight stays deleted.
            if let Some(session) = sessions.write().await.get_mut(&id) {
                *session = finished;
            }
            entry
        })
    };

    let entry = match worker.await {
        Ok(entry) => entry,
        Err(e) => {
            error!(session_id = %id, "Query worker failed: {}", e);
            if let Some(session) = state.sessions.write().await.get_mut(&id) {
                session.reset_idle();
            }
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Query processing failed".into())),
            );
        }
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "session_id": id,
            "kind": kind,
            "entry": entry,
        }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(assistant: Arc<Assistant>) -> Router {
    let state = ApiState {
        assistant,
        sessions: Arc::new(RwLock::new(HashMap::new())),
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/:id",
            axum::routing::delete(delete_session),
        )
        .route("/api/sessions/:id/history", get(get_history))
        .route("/api/sessions/:id/query", post(submit_query))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    assistant: Arc<Assistant>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(assistant);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
