//! HTTP-level tests against the gateway router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use orbitdesk::agent::ConversationLoop;
use orbitdesk::auth::{UserAccount, UserDirectory};
use orbitdesk::catalog::Catalog;
use orbitdesk::config::{AgentConfig, GatewayConfig};
use orbitdesk::error::Result;
use orbitdesk::gateway::{router, AppState};
use orbitdesk::providers::{ModelClient, ModelTurn, ToolDeclaration, TranscriptEntry};
use orbitdesk::rag::{KeywordIndex, RagService};
use orbitdesk::session::{ConversationStore, MemoryStore};
use orbitdesk::tools::default_registry;

struct EchoModel;

#[async_trait]
impl ModelClient for EchoModel {
    async fn converse(
        &self,
        _system_prompt: &str,
        _tools: &[ToolDeclaration],
        _transcript: &[TranscriptEntry],
    ) -> Result<ModelTurn> {
        Ok(ModelTurn::FinalAnswer("We stock laptops and more.".to_string()))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

fn test_state(store: Arc<MemoryStore>) -> Arc<AppState> {
    let model: Arc<dyn ModelClient> = Arc::new(EchoModel);
    let rag = Arc::new(RagService::new(
        Arc::new(KeywordIndex::with_builtin_docs()),
        model.clone(),
    ));
    let tools = Arc::new(default_registry(Arc::new(Catalog::demo()), rag.clone()));
    let conversation = ConversationLoop::new(
        &AgentConfig::default(),
        store.clone(),
        model,
        tools,
        rag,
    );

    let hash = bcrypt::hash("test123", 4).unwrap();
    let users = UserDirectory::from_accounts(vec![UserAccount {
        user_id: "U002".to_string(),
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        password_hash: hash,
    }]);

    Arc::new(AppState::new(
        conversation,
        store,
        Arc::new(users),
        &GatewayConfig::default(),
    ))
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_endpoint() {
    let app = router(test_state(Arc::new(MemoryStore::new())));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_endpoint_returns_answer_and_session() {
    let app = router(test_state(Arc::new(MemoryStore::new())));
    let (status, body) = post_json(
        app,
        "/chat",
        json!({"message": "what products do you sell?"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "We stock laptops and more.");
    assert_eq!(body["route"], "agentic");
    assert_eq!(body["from_cache"], false);
    assert!(!body["session_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_then_logout_flow() {
    let store = Arc::new(MemoryStore::new());
    let state = test_state(store.clone());

    let (status, body) = post_json(
        router(state.clone()),
        "/auth/login",
        json!({"email": "test@example.com", "password": "test123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_id"], "U002");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let user = store.get_session_user(&session_id).await.unwrap();
    assert_eq!(user.as_deref(), Some("U002"));

    let (status, body) = post_json(
        router(state),
        "/auth/logout",
        json!({"session_id": session_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(store.get_session_user(&session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn login_with_bad_password_is_unauthorized() {
    let app = router(test_state(Arc::new(MemoryStore::new())));
    let (status, body) = post_json(
        app,
        "/auth/login",
        json!({"email": "test@example.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid email or password");
}

#[tokio::test]
async fn login_can_attach_to_existing_session() {
    let store = Arc::new(MemoryStore::new());
    let state = test_state(store.clone());
    store.get_or_create_session("existing").await.unwrap();

    let (status, body) = post_json(
        router(state),
        "/auth/login",
        json!({
            "email": "test@example.com",
            "password": "test123",
            "session_id": "existing"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "existing");
    let user = store.get_session_user("existing").await.unwrap();
    assert_eq!(user.as_deref(), Some("U002"));
}
