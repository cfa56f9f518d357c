// SPDX-License-Identifier: MIT

//! HTTP surface: `POST /chat`, `GET /health`, `GET /`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::advisor::workflow::{CourseWorkflow, SourceTool, WorkflowState};

/// Shared handler state. `workflow` is `None` when startup construction failed.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Option<Arc<CourseWorkflow>>,
}

impl AppState {
    pub fn new(workflow: Option<CourseWorkflow>) -> Self {
        Self {
            workflow: workflow.map(Arc::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub source_tool: SourceTool,
    pub retrieved_context: Vec<String>,
}

impl From<WorkflowState> for QueryResponse {
    fn from(state: WorkflowState) -> Self {
        Self {
            retrieved_context: state.retrieved_context(),
            answer: state.answer().to_string(),
            source_tool: state.source_tool(),
        }
    }
}

/// Boundary errors, rendered as `{"detail": ...}`
#[derive(Debug)]
pub enum ApiError {
    EmptyQuery,
    InvalidBody(JsonRejection),
    NotInitialized(&'static str),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::EmptyQuery => (StatusCode::BAD_REQUEST, "Query is empty".to_string()),
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::NotInitialized(detail) => {
                (StatusCode::SERVICE_UNAVAILABLE, detail.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_app(state);

    log::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "IntelliCourse - Course Advisor API is running",
        "api_endpoints": {
            "chat": "/chat (POST with {'query': 'your question'})",
            "health": "/health"
        }
    }))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if state.workflow.is_none() {
        return Err(ApiError::NotInitialized("Agent not initialized"));
    }
    Ok(Json(json!({ "status": "healthy", "agent_initialized": true })))
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(req) = body?;
    let query = req.query.trim();
    if query.is_empty() {
        return Err(ApiError::EmptyQuery);
    }

    let workflow = state.workflow.as_ref().ok_or(ApiError::NotInitialized(
        "Agent not initialized. Please check server logs.",
    ))?;

    log::info!("Received query: {}", query);
    let result = workflow.run(query).await;
    Ok(Json(result.into()))
}
