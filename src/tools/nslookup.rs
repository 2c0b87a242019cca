use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::render::{Render, Report, Section};
use super::validate;
use crate::config::Config;
use crate::error::{ToolError, ToolResult};

const FETCH_FAILED: &str = "Error occurred while fetching data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsLookupResult {
    pub domain: String,
    /// Whatever the route returned, untouched.
    pub response: Value,
}

impl NsLookupResult {
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.response).unwrap_or_else(|_| self.response.to_string())
    }
}

/// Client for the legacy `GET /api/nslookup?domain=` route.
#[derive(Debug, Clone)]
pub struct NsLookupClient {
    client: Client,
    url: String,
}

impl NsLookupClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Tools-Crowd-MCP/1.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    pub fn from_config(config: &Config) -> ToolResult<Self> {
        Ok(Self::new(config.nslookup_endpoint()?))
    }

    pub async fn lookup(&self, input: &str) -> ToolResult<NsLookupResult> {
        let domain = validate::domain(input)?;
        self.fetch(domain).await
    }

    pub async fn fetch(&self, domain: &str) -> ToolResult<NsLookupResult> {
        tracing::debug!(domain, "dispatching nslookup");

        let response = self
            .client
            .get(&self.url)
            .query(&[("domain", domain)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("nslookup request failed: {}", e);
                ToolError::Transport(FETCH_FAILED.to_string())
            })?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            tracing::error!(%status, "nslookup returned a non-JSON body: {}", e);
            ToolError::Transport(FETCH_FAILED.to_string())
        })?;

        Ok(NsLookupResult {
            domain: domain.to_string(),
            response: body,
        })
    }
}

impl Render for NsLookupResult {
    fn render(&self) -> Report {
        let mut report = Report::new("NS Lookup Results").with_domain(&self.domain);
        let mut section = Section::new("Response");
        section.item(self.pretty());
        report.push(section);
        report
    }
}
