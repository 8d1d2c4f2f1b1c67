use anyhow::Context;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::api::version::{API_VERSION_HEADER, SERVICE_TYPE};

/// Thin HTTP client for the tenant networks API
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
    microversion: Option<String>,
}

/// Non-success response from the API
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ApiClient {
    pub fn new(base: &str, token: Option<String>, microversion: Option<String>) -> anyhow::Result<Self> {
        let normalized = format!("{}/", base.trim_end_matches('/'));
        let base = Url::parse(&normalized).with_context(|| format!("invalid API URL '{}'", base))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token,
            microversion,
        })
    }

    /// Base URL extended with `segments`, each percent-encoded
    fn url_for(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API URL '{}' cannot be a base", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> anyhow::Result<T> {
        let url = self.url_for(segments)?;
        tracing::debug!("GET {}", url);

        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(version) = &self.microversion {
            request = request.header(API_VERSION_HEADER, format!("{} {}", SERVICE_TYPE, version));
        }

        let response = request.send().await.context("request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ApiFailure { status, message: fault_message(&body) }.into());
        }

        Ok(response.json().await.context("invalid response body")?)
    }
}

/// Pull the message out of a `{"<fault>": {"code": .., "message": ..}}` body
fn fault_message(body: &Value) -> String {
    body.as_object()
        .and_then(|faults| faults.values().next())
        .and_then(|fault| fault.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string()
}
