//! HTTP gateway.
//!
//! Thin layer over the conversation loop: content filtering and the response
//! cache live here, everything conversational stays in `agent`. Endpoints:
//! `POST /chat`, `POST /auth/login`, `POST /auth/logout`, `GET /health`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::agent::{ConversationLoop, ToolCallRecord, TurnOutcome, ROUTE_BLOCKED};
use crate::auth::UserDirectory;
use crate::config::GatewayConfig;
use crate::error::{OrbitError, Result};
use crate::guard::ContentFilter;
use crate::session::{ConversationStore, Role};

type CacheKey = (String, String);

pub struct AppState {
    conversation: ConversationLoop,
    store: Arc<dyn ConversationStore>,
    filter: ContentFilter,
    users: Arc<UserDirectory>,
    cache: Mutex<HashMap<CacheKey, TurnOutcome>>,
    cache_capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub intent: String,
    pub route: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: u32,
    pub session_id: String,
    pub from_cache: bool,
    pub guardrail_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub session_id: String,
}

impl AppState {
    pub fn new(
        conversation: ConversationLoop,
        store: Arc<dyn ConversationStore>,
        users: Arc<UserDirectory>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            conversation,
            store,
            filter: ContentFilter::new(),
            users,
            cache: Mutex::new(HashMap::new()),
            cache_capacity: config.cache_capacity,
        }
    }

    /// Full chat pipeline: content filter, cache, then the conversation loop.
    pub async fn process(&self, request: ChatRequest) -> Result<ChatResponse> {
        let session_id = match request.session_id {
            Some(id) => id,
            None => self.store.create_session(None).await?,
        };

        // Screen before anything touches the model or the history.
        let verdict = self.filter.check(&request.message);
        if !verdict.allowed {
            let answer = verdict
                .message
                .unwrap_or_else(|| "I cannot respond to this request.".to_string());
            // The rejection is recorded; the offending message is not.
            self.store.get_or_create_session(&session_id).await?;
            self.store
                .append_turn(
                    &session_id,
                    Role::Assistant,
                    &answer,
                    Some("guardrail"),
                    Some(ROUTE_BLOCKED),
                )
                .await?;
            return Ok(ChatResponse {
                answer,
                intent: "guardrail".to_string(),
                route: ROUTE_BLOCKED.to_string(),
                tool_calls: Vec::new(),
                iterations: 0,
                session_id,
                from_cache: false,
                guardrail_triggered: true,
                guardrail_reason: verdict.reason.map(|r| r.as_str().to_string()),
            });
        }

        let key = cache_key(&session_id, &request.message);
        {
            let cache = self.cache.lock().await;
            if let Some(outcome) = cache.get(&key) {
                debug!(session = %session_id, "cache hit");
                return Ok(response_from(outcome.clone(), session_id, true));
            }
        }

        let outcome = self
            .conversation
            .handle_turn(&session_id, &request.message)
            .await?;

        {
            let mut cache = self.cache.lock().await;
            if cache.len() >= self.cache_capacity {
                // Simple eviction: drop an arbitrary entry.
                if let Some(evict) = cache.keys().next().cloned() {
                    cache.remove(&evict);
                }
            }
            cache.insert(key, outcome.clone());
        }

        Ok(response_from(outcome, session_id, false))
    }
}

fn cache_key(session_id: &str, message: &str) -> CacheKey {
    let normalized = message.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");
    (session_id.to_string(), normalized)
}

fn response_from(outcome: TurnOutcome, session_id: String, from_cache: bool) -> ChatResponse {
    ChatResponse {
        answer: outcome.answer,
        intent: outcome.intent,
        route: outcome.route,
        tool_calls: outcome.tool_calls,
        iterations: outcome.iterations,
        session_id,
        from_cache,
        guardrail_triggered: false,
        guardrail_reason: None,
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, config: &GatewayConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, router(state))
        .await
        .map_err(OrbitError::Io)?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match state.process(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let user = match state.users.authenticate(&request.email, &request.password) {
        Ok(user) => user,
        Err(err) => {
            debug!(email = %request.email, error = %err, "login failed");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid email or password"})),
            )
                .into_response();
        }
    };

    let result = match request.session_id {
        Some(session_id) => match state.store.get_or_create_session(&session_id).await {
            Ok(_) => state
                .store
                .link_session_to_user(&session_id, &user.user_id)
                .await
                .map(|_| session_id),
            Err(err) => Err(err),
        },
        None => state.store.create_session(Some(&user.user_id)).await,
    };

    match result {
        Ok(session_id) => {
            info!(user = %user.user_id, session = %session_id, "login");
            Json(json!({"user": user, "session_id": session_id})).into_response()
        }
        Err(err) => internal_error(err),
    }
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> Response {
    match state.store.end_session(&request.session_id).await {
        Ok(()) => Json(json!({"status": "ok"})).into_response(),
        Err(OrbitError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "unknown session"})),
        )
            .into_response(),
        Err(err) => internal_error(err),
    }
}

fn internal_error(err: OrbitError) -> Response {
    error!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "internal error"})),
    )
        .into_response()
}
