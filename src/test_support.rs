//! Router harness over `MemoryStore` for handler tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, config::AppConfig, db::memory::MemoryStore, state::AppState};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test-secret".into()),
            _ => None,
        })
        .expect("test config");
        let store = Arc::new(MemoryStore::default());
        let state = AppState::from_parts(store.clone(), Arc::new(config));
        Self {
            router: build_app(state.clone()),
            store,
            state,
        }
    }

    /// Registers `email` and returns a login token for it.
    pub async fn user_token(&self, email: &str) -> String {
        register(self, email, "pw").await;
        let (status, body) = login(self, email, "pw").await;
        assert_eq!(status, StatusCode::OK, "login {email}: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    pub async fn admin_token(&self, email: &str) -> String {
        register(self, email, "pw").await;
        self.store.set_role(email, "admin");
        let (_, body) = login(self, email, "pw").await;
        body["token"].as_str().expect("token").to_string()
    }

    pub fn user_id(&self, token: &str) -> i64 {
        self.state.jwt.verify(token).expect("valid token").sub
    }
}

pub async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("request");

    let res = router.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn register(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({"email": email, "password": password});
    call(&app.router, Method::POST, "/auth/register", None, Some(body)).await
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({"email": email, "password": password});
    call(&app.router, Method::POST, "/auth/login", None, Some(body)).await
}
