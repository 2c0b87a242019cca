use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::{LookupResponse, LookupTool};
use super::render::{Render, Report, Section};
use crate::error::{ToolError, ToolResult};

pub const NO_HEADERS: &str = "No HTTP headers found for this domain.";
const FETCH_FAILED: &str = "Failed to fetch HTTP headers.";

/// Headers a hardened site is expected to send.
pub const SECURITY_HEADERS: &[&str] = &[
    "strict-transport-security",
    "x-frame-options",
    "x-content-type-options",
    "content-security-policy",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpHeadersResult {
    pub domain: String,
    pub headers: BTreeMap<String, String>,
}

impl HttpHeadersResult {
    /// Security headers absent from the response, compared case-insensitively.
    pub fn missing_security_headers(&self) -> Vec<&'static str> {
        SECURITY_HEADERS
            .iter()
            .copied()
            .filter(|wanted| !self.headers.keys().any(|k| k.eq_ignore_ascii_case(wanted)))
            .collect()
    }
}

fn header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(values) => values
            .iter()
            .map(header_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct HttpHeadersLookup;

impl LookupTool for HttpHeadersLookup {
    const TOOL: &'static str = "http";
    const TRANSPORT_ERROR: &'static str = "An error occurred while fetching HTTP headers.";

    type Output = HttpHeadersResult;

    fn classify(domain: &str, response: LookupResponse) -> ToolResult<HttpHeadersResult> {
        if !response.is_ok() {
            return Err(response.upstream_error(FETCH_FAILED));
        }

        let headers: BTreeMap<String, String> = response
            .envelope
            .headers
            .iter()
            .flatten()
            .map(|(name, value)| (name.clone(), header_value(value)))
            .collect();

        if headers.is_empty() {
            return Err(ToolError::Empty(NO_HEADERS.to_string()));
        }

        Ok(HttpHeadersResult {
            domain: response.domain_or(domain).to_string(),
            headers,
        })
    }
}

impl Render for HttpHeadersResult {
    fn render(&self) -> Report {
        let mut report = Report::new("HTTP Headers Results").with_domain(&self.domain);

        let mut headers = Section::new("Response Headers");
        for (name, value) in &self.headers {
            headers.field(name, value);
        }
        report.push(headers);

        let mut security = Section::new("Security Headers");
        for missing in self.missing_security_headers() {
            security.item(format!("missing: {}", missing));
        }
        report.push(security);

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::render::Entry;
    use reqwest::StatusCode;
    use serde_json::json;

    fn response(status: u16, body: Value) -> LookupResponse {
        LookupResponse {
            status: StatusCode::from_u16(status).unwrap(),
            envelope: serde_json::from_value(body).unwrap(),
        }
    }

    #[test]
    fn empty_headers_is_error_test() {
        for body in [
            json!({ "error": false, "headers": {} }),
            json!({ "error": false, "headers": null }),
            json!({ "error": false }),
        ] {
            let err = HttpHeadersLookup::classify("example.com", response(200, body)).unwrap_err();
            assert_eq!(err, ToolError::Empty(NO_HEADERS.to_string()));
        }
    }

    #[test]
    fn headers_and_security_audit_test() {
        let result = HttpHeadersLookup::classify(
            "example.com",
            response(
                200,
                json!({
                    "error": false,
                    "domain": "example.com",
                    "headers": {
                        "Content-Type": "text/html; charset=UTF-8",
                        "Strict-Transport-Security": "max-age=31536000",
                        "X-Content-Type-Options": "nosniff",
                        "Set-Cookie": ["a=1", "b=2"],
                        "Content-Length": 1256
                    }
                }),
            ),
        )
        .unwrap();

        assert_eq!(result.headers["Set-Cookie"], "a=1, b=2");
        assert_eq!(result.headers["Content-Length"], "1256");
        assert_eq!(
            result.missing_security_headers(),
            vec!["x-frame-options", "content-security-policy"]
        );

        let report = result.render();
        let headers = report.section("Response Headers").unwrap();
        assert_eq!(headers.value_of("Content-Type"), Some("text/html; charset=UTF-8"));

        let security = report.section("Security Headers").unwrap();
        assert_eq!(
            security.entries,
            vec![
                Entry::Item("missing: x-frame-options".to_string()),
                Entry::Item("missing: content-security-policy".to_string()),
            ]
        );
    }

    #[test]
    fn upstream_error_test() {
        let err = HttpHeadersLookup::classify(
            "example.com",
            response(200, json!({ "error": true, "rawData": "Could not resolve host" })),
        )
        .unwrap_err();
        assert_eq!(err, ToolError::Upstream("Could not resolve host".to_string()));
    }
}
