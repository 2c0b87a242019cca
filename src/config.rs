use std::time::Duration;

use reqwest::Url;

use crate::error::{ToolError, ToolResult};

pub const DEFAULT_BASE64_DELAY: Duration = Duration::from_millis(500);

const PDF_PATH: &str = "/pdf.php";
const NSLOOKUP_PATH: &str = "/api/nslookup";

/// Endpoints and credentials for the tools.
///
/// Nothing here is required at startup. A tool whose endpoint is missing
/// reports a `ToolError::Config` when it is called.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub site_url: Option<String>,
    pub pdf_url: Option<String>,
    pub nslookup_url: Option<String>,
    pub base64_delay: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base64_delay = get("TOOLS_BASE64_DELAY_MS").and_then(|ms| match ms.parse::<u64>() {
            Ok(ms) => Some(Duration::from_millis(ms)),
            Err(_) => {
                tracing::warn!("ignoring invalid TOOLS_BASE64_DELAY_MS: {}", ms);
                None
            }
        });

        Self {
            api_url: get("TOOLS_API_URL"),
            api_key: get("TOOLS_API_KEY"),
            site_url: get("TOOLS_SITE_URL"),
            pdf_url: get("TOOLS_PDF_URL"),
            nslookup_url: get("TOOLS_NSLOOKUP_URL"),
            base64_delay,
        }
    }

    pub fn lookup_endpoint(&self) -> ToolResult<(String, String)> {
        let url = self
            .api_url
            .clone()
            .ok_or_else(|| ToolError::Config("TOOLS_API_URL is not set.".to_string()))?;
        let key = self
            .api_key
            .clone()
            .ok_or_else(|| ToolError::Config("TOOLS_API_KEY is not set.".to_string()))?;
        Ok((url, key))
    }

    pub fn pdf_endpoint(&self) -> ToolResult<String> {
        self.site_endpoint(self.pdf_url.as_deref(), PDF_PATH, "TOOLS_PDF_URL")
    }

    pub fn nslookup_endpoint(&self) -> ToolResult<String> {
        self.site_endpoint(self.nslookup_url.as_deref(), NSLOOKUP_PATH, "TOOLS_NSLOOKUP_URL")
    }

    pub fn base64_delay(&self) -> Duration {
        self.base64_delay.unwrap_or(DEFAULT_BASE64_DELAY)
    }

    // An explicit endpoint wins; otherwise the path is resolved against the site URL.
    fn site_endpoint(&self, explicit: Option<&str>, path: &str, var: &str) -> ToolResult<String> {
        if let Some(url) = explicit {
            return Ok(url.to_string());
        }

        let site = self.site_url.as_deref().ok_or_else(|| {
            ToolError::Config(format!("Neither {} nor TOOLS_SITE_URL is set.", var))
        })?;

        Url::parse(site)
            .and_then(|base| base.join(path))
            .map(|url| url.to_string())
            .map_err(|e| ToolError::Config(format!("Invalid TOOLS_SITE_URL {}: {}", site, e)))
    }
}
