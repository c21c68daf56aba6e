//! Thin HTTP client for the DontQ API

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;

pub const USER_ID_HEADER: &str = "x-user-id";

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    user: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, user: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.call(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.call(Method::PUT, path, Some(body)).await
    }

    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(user) = &self.user {
            request = request.header(USER_ID_HEADER, user);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .context("Failed to connect to daemon")?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            anyhow::bail!("{}", error_message(status, &body));
        }
        Ok(body)
    }
}

/// Human-readable error from an `{"error": ...}` reply
pub fn error_message(status: StatusCode, body: &Value) -> String {
    match body.get("error").and_then(Value::as_str) {
        Some(msg) => format!("{} ({})", msg, status.as_u16()),
        None => format!("Request failed with status {}", status),
    }
}
