use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validate;
use crate::config::Config;
use crate::error::{ToolError, ToolResult};

/// The envelope every Lookup API response shares.
///
/// Fields the upstream omits (or sends as `null`) deserialize to their
/// defaults, since the shape varies between tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEnvelope {
    /// Usually a boolean, but some failures send a message string instead.
    #[serde(default)]
    pub error: Value,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub raw_data: Option<String>,
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    #[serde(default)]
    pub whois_server: Option<String>,
}

impl LookupEnvelope {
    pub fn is_error(&self) -> bool {
        match &self.error {
            Value::Bool(flag) => *flag,
            Value::String(message) => !message.is_empty(),
            _ => false,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_str().filter(|m| !m.is_empty())
    }

    pub fn raw_data(&self) -> Option<&str> {
        self.raw_data.as_deref().filter(|raw| !raw.is_empty())
    }

    pub fn raw_data_contains(&self, needle: &str) -> bool {
        self.raw_data().is_some_and(|raw| raw.contains(needle))
    }

    /// Deserializes `data` into a tool payload, treating `null` as empty.
    pub fn data_as<T: DeserializeOwned + Default>(&self) -> Option<T> {
        match &self.data {
            Value::Null => Some(T::default()),
            data => serde_json::from_value(data.clone()).ok(),
        }
    }
}

/// A Lookup API response as seen by a tool's classifier.
#[derive(Debug, Clone)]
pub struct LookupResponse {
    pub status: StatusCode,
    pub envelope: LookupEnvelope,
}

impl LookupResponse {
    /// Transport-level success with `error` unset.
    pub fn is_ok(&self) -> bool {
        self.status.is_success() && !self.envelope.is_error()
    }

    /// The upstream's own diagnostic text, or `fallback`.
    pub fn upstream_error(&self, fallback: &str) -> ToolError {
        let message = self
            .envelope
            .raw_data()
            .or_else(|| self.envelope.error_message())
            .unwrap_or(fallback);
        ToolError::Upstream(message.to_string())
    }

    pub fn domain_or<'a>(&'a self, queried: &'a str) -> &'a str {
        self.envelope
            .domain
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(queried)
    }
}

/// One tool served by the shared Lookup API.
///
/// Implementors only describe what differs between tools: the `tool` query
/// value, the message for transport failures, and how a response is
/// classified into a payload or an error.
pub trait LookupTool {
    const TOOL: &'static str;
    const TRANSPORT_ERROR: &'static str;

    type Output;

    fn classify(domain: &str, response: LookupResponse) -> ToolResult<Self::Output>;
}

#[derive(Debug, Clone)]
pub struct LookupClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LookupClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Tools-Crowd-MCP/1.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> ToolResult<Self> {
        let (api_url, api_key) = config.lookup_endpoint()?;
        Ok(Self::new(api_url, api_key))
    }

    /// Validates `input` as a domain, then fetches and classifies.
    pub async fn lookup<T: LookupTool>(&self, input: &str) -> ToolResult<T::Output> {
        let domain = validate::domain(input)?;
        self.fetch::<T>(domain).await
    }

    /// Fetches and classifies an already validated domain.
    pub async fn fetch<T: LookupTool>(&self, domain: &str) -> ToolResult<T::Output> {
        let response = self.dispatch(T::TOOL, domain).await.map_err(|e| {
            tracing::error!(tool = T::TOOL, "lookup request failed: {}", e);
            ToolError::Transport(T::TRANSPORT_ERROR.to_string())
        })?;

        T::classify(domain, response)
    }

    /// Issues the single POST for `tool` and parses the envelope.
    pub async fn dispatch(&self, tool: &str, domain: &str) -> reqwest::Result<LookupResponse> {
        tracing::debug!(tool, domain, "dispatching lookup");

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("tool", tool), ("domain", domain)])
            .header("x-api-key", &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        let envelope: LookupEnvelope = response.json().await?;

        tracing::info!(tool, domain, %status, error = envelope.is_error(), "lookup completed");

        Ok(LookupResponse { status, envelope })
    }
}
