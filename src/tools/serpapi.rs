//! Minimal SerpApi search client shared by the travel tools.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{Result, TripError};

/// Configuration for SerpApi-backed tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_hl")]
    pub hl: String,
    #[serde(default = "default_gl")]
    pub gl: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_stops")]
    pub stops: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            currency: default_currency(),
            hl: default_hl(),
            gl: default_gl(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
            stops: default_stops(),
        }
    }
}

impl SearchConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

fn default_endpoint() -> String {
    "https://serpapi.com".into()
}

fn default_currency() -> String {
    "USD".into()
}

fn default_hl() -> String {
    "en".into()
}

fn default_gl() -> String {
    "us".into()
}

fn default_max_results() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_stops() -> String {
    "1".into()
}

#[derive(Debug, Error)]
pub enum SerpApiError {
    #[error("SerpApi returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("SerpApi error: {0}")]
    Provider(String),

    #[error("SerpApi response has no `{0}` results")]
    MissingResults(String),
}

#[derive(Clone)]
pub struct SerpApiClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl SerpApiClient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| TripError::Config(format!("http client error: {err}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run one search and return the first `max_results` entries of `results_key`.
    pub async fn top_results(
        &self,
        tool: &str,
        engine: &str,
        params: &[(&str, String)],
        results_key: &str,
    ) -> Result<Value> {
        let body = self.search(tool, engine, params).await?;
        let results = body
            .get(results_key)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                TripError::invocation(tool, SerpApiError::MissingResults(results_key.into()))
            })?;
        Ok(Value::Array(
            results
                .iter()
                .take(self.config.max_results)
                .cloned()
                .collect(),
        ))
    }

    pub async fn search(
        &self,
        tool: &str,
        engine: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TripError::Config("missing SerpApi API key".into()))?;

        let mut query: Vec<(&str, String)> = vec![
            ("engine", engine.to_string()),
            ("api_key", api_key.to_string()),
            ("hl", self.config.hl.clone()),
            ("gl", self.config.gl.clone()),
            ("currency", self.config.currency.clone()),
        ];
        query.extend(params.iter().cloned());

        tracing::debug!(tool, engine, "sending SerpApi search");
        let resp = self
            .http
            .get(format!("{}/search.json", self.config.endpoint.trim_end_matches('/')))
            .query(&query)
            .send()
            .await
            .map_err(|err| TripError::invocation(tool, err.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TripError::invocation(tool, SerpApiError::Status { status, body }));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|err| TripError::invocation(tool, err.without_url()))?;
        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(TripError::invocation(tool, SerpApiError::Provider(message.into())));
        }
        Ok(body)
    }
}
