#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use ledger_api::auth::{generate_jwt, Claims};
use ledger_api::config::AppConfig;
use ledger_api::database::models::User;
use ledger_api::database::{MemoryStore, RecordStore, SharedStore};
use ledger_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router wired to a fresh in-memory store, driven without a TCP listener
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.security.jwt_secret = TEST_SECRET.to_string();
        config.security.enable_cors = false;
        config.api.enable_request_logging = false;

        let store = Arc::new(MemoryStore::new());
        let shared: SharedStore = store.clone();
        let router = ledger_api::app(AppState::new(shared, config.clone()));

        Self { router, store, config }
    }

    /// Add a directory user and return it with a valid bearer token
    pub async fn user(&self, username: &str) -> Result<(User, String)> {
        let user = self.store.create_user(username).await?;
        let token = self.token_for(&user)?;
        Ok((user, token))
    }

    pub fn token_for(&self, user: &User) -> Result<String> {
        Ok(generate_jwt(&Claims::new(user.id, &user.username, 1)?, TEST_SECRET)?)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| {
                format!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })?
        };

        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// POST /clients/ and return the new id
    pub async fn create_client(&self, token: &str, name: &str) -> Result<i64> {
        let res = self
            .post("/clients/", token, serde_json::json!({ "client_name": name }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create client: {} {}", res.status, res.body);
        res.body["id"].as_i64().context("client id missing")
    }

    /// POST /clients/{id}/projects/ and return the new id
    pub async fn create_project(&self, token: &str, client_id: i64, name: &str, users: &[i64]) -> Result<i64> {
        let res = self
            .post(
                &format!("/clients/{}/projects/", client_id),
                token,
                serde_json::json!({ "project_name": name, "users": users }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create project: {} {}", res.status, res.body);
        res.body["id"].as_i64().context("project id missing")
    }
}
