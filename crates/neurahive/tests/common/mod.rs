//! Test utilities and common setup.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use neurahive::api::{self, AppState};
use neurahive::auth::{AuthConfig, Role, RoleSet};
use neurahive::db::Database;
use neurahive::user::{CreateUserRequest, User};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const CURATOR_EMAIL: &str = "curator@example.com";
pub const CLIENT_EMAIL: &str = "client@example.com";
pub const PASSWORD: &str = "password123";

/// Create a test AuthConfig with a signing secret and a cheap hash cost.
pub fn test_auth_config(no_auth: bool) -> AuthConfig {
    AuthConfig {
        no_auth,
        secret_key: Some(TEST_SECRET.to_string()),
        password_hash_cost: 4,
        ..AuthConfig::default()
    }
}

/// A router over a fresh in-memory database, plus the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub database: Database,
}

impl TestApp {
    pub async fn with_config(config: AuthConfig) -> Self {
        let database = Database::in_memory().await.unwrap();
        let state = AppState::from_config(&config, &database).unwrap();
        let router = api::create_router(state.clone());
        Self {
            router,
            state,
            database,
        }
    }

    /// Enforced auth with one admin, one curator and one client seeded.
    pub async fn seeded() -> Self {
        let app = Self::with_config(test_auth_config(false)).await;
        app.seed_user("Admin", ADMIN_EMAIL, [Role::Admin]).await;
        app.seed_user("Curator", CURATOR_EMAIL, [Role::Curator]).await;
        app.seed_user("Client", CLIENT_EMAIL, [Role::Client]).await;
        app
    }

    pub async fn seed_user(
        &self,
        name: &str,
        email: &str,
        roles: impl Into<RoleSet>,
    ) -> User {
        self.state
            .users
            .create_user(CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                role: roles.into(),
            })
            .await
            .unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder, body).await
    }

    /// Send a request with a verbatim Authorization header value.
    pub async fn request_with_header(
        &self,
        method: Method,
        uri: &str,
        authorization: &str,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, authorization);
        self.send(builder, None).await
    }

    async fn send(
        &self,
        builder: axum::http::request::Builder,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }
}
