//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for one-shot queries, tool listing and isolated
//! chat sessions.

use crate::agent::ConversationMemory;
use crate::assistant::StudyAssistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::{ChatSession, ChatTurn};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

/// Shared application state.
struct AppState {
    assistant: StudyAssistant,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<ChatSession>>>>,
    history_length: usize,
}

impl AppState {
    fn new(assistant: StudyAssistant, history_length: usize) -> Self {
        Self {
            assistant,
            sessions: RwLock::new(HashMap::new()),
            history_length,
        }
    }

    async fn session(&self, id: Uuid) -> Option<Arc<Mutex<ChatSession>>> {
        self.sessions.read().await.get(&id).cloned()
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    preflight::check(Operation::Query, &settings)?;

    let assistant = StudyAssistant::from_settings(&settings)?;
    let state = Arc::new(AppState::new(assistant, settings.chat.history_length));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Studymate API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Tools", "GET    /tools");
    Output::kv("Ask", "POST   /ask");
    Output::kv("New session", "POST   /sessions");
    Output::kv("Get session", "GET    /sessions/:id");
    Output::kv("Send message", "POST   /sessions/:id/messages");
    Output::kv("End session", "DELETE /sessions/:id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/ask", post(ask))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/messages", post(post_message))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Serialize)]
struct ToolsResponse {
    tools: Vec<ToolInfo>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    description: String,
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: Uuid,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: Uuid,
    turns: Vec<ChatTurn>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn session_not_found(id: Uuid) -> axum::response::Response {
    error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
}

fn empty_query() -> axum::response::Response {
    error_response(StatusCode::BAD_REQUEST, "Query must not be empty".to_string())
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ToolsResponse {
        tools: state
            .assistant
            .tools()
            .iter()
            .map(|tool| ToolInfo {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect(),
    })
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    if req.query.trim().is_empty() {
        return empty_query();
    }

    let reply = state.assistant.ask(&req.query, &ConversationMemory::new()).await;
    Json(reply).into_response()
}

async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = ChatSession::new(state.history_length);
    let session_id = session.id();
    state
        .sessions
        .write()
        .await
        .insert(session_id, Arc::new(Mutex::new(session)));

    info!("Created session {}", session_id);
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = state.session(id).await else {
        return session_not_found(id);
    };

    let session = session.lock().await;
    Json(SessionResponse {
        session_id: id,
        turns: session.turns().to_vec(),
    })
    .into_response()
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    if req.query.trim().is_empty() {
        return empty_query();
    }

    let Some(session) = state.session(id).await else {
        return session_not_found(id);
    };

    let mut session = session.lock().await;
    let turn = session.submit(&state.assistant, &req.query).await;
    Json(turn).into_response()
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            info!("Discarded session {}", id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => session_not_found(id),
    }
}
