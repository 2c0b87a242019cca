pub mod catalog;
pub mod config;
pub mod error;
pub mod tools;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::error::{ToolError, ToolResult};
use crate::tools::dns::{DnsLookup, DnsLookupResult};
use crate::tools::domain_to_ip::{DomainToIp, IpResult};
use crate::tools::email_security::{EmailSecurityLookup, EmailSecurityResult};
use crate::tools::encoding::{Base64Output, Base64Tool, Mode};
use crate::tools::http_headers::{HttpHeadersLookup, HttpHeadersResult};
use crate::tools::nslookup::{NsLookupClient, NsLookupResult};
use crate::tools::pdf::{self, CompressedPdf, PdfCompressor, PdfUpload};
use crate::tools::ssl::{SslCertificateInfo, SslLookup};
use crate::tools::whois::{WhoisInfo, WhoisLookup};
use crate::tools::{validate, LookupClient, LookupTool, Render, ToolSession};

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DomainParam {
    /// Domain name, e.g. example.com
    pub domain: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct TextParam {
    pub text: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct PdfParam {
    /// Path of the PDF to compress
    pub path: String,
    /// Declared MIME type; inferred from the extension when omitted
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Where to write compressed_<name>; defaults to the input's directory
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DescribeParam {
    /// Category id, e.g. dns-tools
    pub category: String,
    /// Tool id, e.g. whois
    pub tool: String,
}

/// One request lifecycle per tool instance, shared by every clone of the server.
#[derive(Debug)]
struct Sessions {
    ns_lookup: ToolSession<NsLookupResult>,
    domain_to_ip: ToolSession<IpResult>,
    whois: ToolSession<WhoisInfo>,
    dns: ToolSession<DnsLookupResult>,
    ssl: ToolSession<SslCertificateInfo>,
    email_security: ToolSession<EmailSecurityResult>,
    http_headers: ToolSession<HttpHeadersResult>,
    base64: ToolSession<Base64Output>,
    pdf: ToolSession<CompressedPdf>,
}

impl Sessions {
    fn new() -> Self {
        Self {
            ns_lookup: ToolSession::new("ns_lookup"),
            domain_to_ip: ToolSession::new("domain_to_ip"),
            whois: ToolSession::new("whois_lookup"),
            dns: ToolSession::new("dns_lookup"),
            ssl: ToolSession::new("ssl_certificate_info"),
            email_security: ToolSession::new("email_security_lookup"),
            http_headers: ToolSession::new("http_headers_lookup"),
            base64: ToolSession::new("base64"),
            pdf: ToolSession::new("compress_pdf"),
        }
    }
}

#[derive(Clone)]
pub struct ToolsServer {
    lookup: ToolResult<LookupClient>,
    nslookup: ToolResult<NsLookupClient>,
    compressor: ToolResult<PdfCompressor>,
    base64: Base64Tool,
    sessions: Arc<Sessions>,
    tool_router: ToolRouter<ToolsServer>,
}

impl Default for ToolsServer {
    fn default() -> Self {
        Self::new(Config::from_env())
    }
}

#[tool_router]
impl ToolsServer {
    /// Builds the server. Missing endpoints are reported when the affected
    /// tool is called, not here.
    pub fn new(config: Config) -> Self {
        Self {
            lookup: LookupClient::from_config(&config),
            nslookup: NsLookupClient::from_config(&config),
            compressor: PdfCompressor::from_config(&config),
            base64: Base64Tool::new(config.base64_delay()),
            sessions: Arc::new(Sessions::new()),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Look up name server information for a domain")]
    async fn ns_lookup(
        &self,
        Parameters(DomainParam { domain }): Parameters<DomainParam>,
    ) -> Result<CallToolResult, McpError> {
        let client = self.nslookup.as_ref().map_err(Clone::clone);
        let session = &self.sessions.ns_lookup;
        let result = session
            .submit(
                || validate::domain(&domain).map(str::to_string),
                |domain| async move { client?.fetch(&domain).await },
            )
            .await;
        respond(session.name(), result)
    }

    #[tool(description = "Resolve a domain name to its IP addresses")]
    async fn domain_to_ip(
        &self,
        Parameters(DomainParam { domain }): Parameters<DomainParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_lookup::<DomainToIp>(&self.sessions.domain_to_ip, &domain)
            .await
    }

    #[tool(description = "Show the WHOIS registration record of a domain")]
    async fn whois_lookup(
        &self,
        Parameters(DomainParam { domain }): Parameters<DomainParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_lookup::<WhoisLookup>(&self.sessions.whois, &domain)
            .await
    }

    #[tool(description = "Show the A, NS, SOA and TXT records of a domain")]
    async fn dns_lookup(
        &self,
        Parameters(DomainParam { domain }): Parameters<DomainParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_lookup::<DnsLookup>(&self.sessions.dns, &domain)
            .await
    }

    #[tool(description = "Get SSL certificate information for a domain")]
    async fn ssl_certificate_info(
        &self,
        Parameters(DomainParam { domain }): Parameters<DomainParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_lookup::<SslLookup>(&self.sessions.ssl, &domain)
            .await
    }

    #[tool(description = "Show the SPF, DKIM and DMARC records of a domain")]
    async fn email_security_lookup(
        &self,
        Parameters(DomainParam { domain }): Parameters<DomainParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_lookup::<EmailSecurityLookup>(&self.sessions.email_security, &domain)
            .await
    }

    #[tool(description = "List the HTTP response headers of a domain and audit security headers")]
    async fn http_headers_lookup(
        &self,
        Parameters(DomainParam { domain }): Parameters<DomainParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_lookup::<HttpHeadersLookup>(&self.sessions.http_headers, &domain)
            .await
    }

    #[tool(description = "Encode text as Base64")]
    async fn base64_encode(
        &self,
        Parameters(TextParam { text }): Parameters<TextParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_base64(Mode::Encode, text).await
    }

    #[tool(description = "Decode Base64 into text")]
    async fn base64_decode(
        &self,
        Parameters(TextParam { text }): Parameters<TextParam>,
    ) -> Result<CallToolResult, McpError> {
        self.run_base64(Mode::Decode, text).await
    }

    #[tool(description = "Compress a PDF file (50MB max) and save it as compressed_<name>")]
    async fn compress_pdf(
        &self,
        Parameters(params): Parameters<PdfParam>,
    ) -> Result<CallToolResult, McpError> {
        let compressor = self.compressor.as_ref().map_err(Clone::clone);
        let session = &self.sessions.pdf;
        let result = session
            .submit(
                || pdf_request(&params),
                |(path, mime_type, dir)| async move {
                    let compressor = compressor?;
                    let upload = PdfUpload::from_path(&path, Some(mime_type.as_str())).await?;
                    let mut compressed = compressor.compress(&upload).await?;
                    compressed.save_in(&dir).await?;
                    Ok(compressed)
                },
            )
            .await;
        respond(session.name(), result)
    }

    #[tool(description = "Describe a tool from the catalog: what it does and its use cases")]
    async fn describe_tool(
        &self,
        Parameters(DescribeParam { category, tool }): Parameters<DescribeParam>,
    ) -> Result<CallToolResult, McpError> {
        let result = catalog::find(&category, &tool).map(|(_, info)| *info);
        respond("describe_tool", result)
    }
}

impl ToolsServer {
    async fn run_lookup<T>(
        &self,
        session: &ToolSession<T::Output>,
        domain: &str,
    ) -> Result<CallToolResult, McpError>
    where
        T: LookupTool,
        T::Output: Clone + Serialize + Render,
    {
        let client = self.lookup.as_ref().map_err(Clone::clone);
        let result = session
            .submit(
                || validate::domain(domain).map(str::to_string),
                |domain| async move { client?.fetch::<T>(&domain).await },
            )
            .await;
        respond(session.name(), result)
    }

    async fn run_base64(&self, mode: Mode, text: String) -> Result<CallToolResult, McpError> {
        let session = &self.sessions.base64;
        let tool = &self.base64;
        let input = text.as_str();
        let result = session
            .submit(
                || Base64Tool::check(input),
                |()| async move { tool.run(mode, input).await },
            )
            .await;
        respond(session.name(), result)
    }
}

/// Resolves path, MIME type and output directory. Type, presence and size
/// are checked here so a bad file never reaches the upload.
fn pdf_request(params: &PdfParam) -> ToolResult<(PathBuf, String, PathBuf)> {
    let raw = params.path.trim();
    if raw.is_empty() {
        return Err(ToolError::Validation(pdf::NO_FILE.to_string()));
    }

    let path = PathBuf::from(raw);
    let mime_type = params
        .mime_type
        .clone()
        .unwrap_or_else(|| pdf::mime_for(&path).to_string());
    if mime_type != pdf::PDF_MIME {
        return Err(ToolError::Validation(pdf::NOT_A_PDF.to_string()));
    }
    pdf::check_file(&path, &mime_type)?;

    let dir = match &params.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf(),
    };

    Ok((path, mime_type, dir))
}

fn respond<T>(tool: &str, result: ToolResult<T>) -> Result<CallToolResult, McpError>
where
    T: Serialize + Render,
{
    match result {
        Ok(payload) => {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|_| "Error formatting result".to_string());
            Ok(CallToolResult::success(vec![
                Content::text(payload.render().to_string()),
                Content::text(json),
            ]))
        }
        Err(e) => Err(to_mcp_error(tool, &e)),
    }
}

fn to_mcp_error(tool: &str, e: &ToolError) -> McpError {
    let data = Some(json!({ "error": e.to_string() }));
    if e.is_validation() {
        McpError::invalid_params(e.to_string(), data)
    } else {
        McpError::internal_error(format!("{}_failed", tool), data)
    }
}

#[tool_handler]
impl ServerHandler for ToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tools-crowd-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Tools Crowd MCP Server - network diagnostics and file utilities.\n{}\n\
                Use describe_tool for details on any tool.",
                catalog::summary()
            )),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::RequestState;
    use std::time::Duration;

    fn offline_server() -> ToolsServer {
        let config = Config::from_lookup(|key| match key {
            "TOOLS_BASE64_DELAY_MS" => Some("0".to_string()),
            _ => None,
        });
        ToolsServer::new(config)
    }

    fn text_of(result: &CallToolResult, index: usize) -> String {
        let value = serde_json::to_value(result).unwrap();
        value["content"][index]["text"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn invalid_domain_is_invalid_params_test() {
        let server = offline_server();
        let err = server
            .dns_lookup(Parameters(DomainParam {
                domain: "not a domain".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, validate::INVALID_DOMAIN);
        assert_eq!(
            server.sessions.dns.state(),
            RequestState::Error(validate::INVALID_DOMAIN.to_string())
        );
    }

    #[tokio::test]
    async fn missing_api_settings_is_internal_error_test() {
        let server = offline_server();
        let err = server
            .whois_lookup(Parameters(DomainParam {
                domain: "example.com".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.message, "whois_lookup_failed");
        assert_eq!(err.data, Some(json!({ "error": "TOOLS_API_URL is not set." })));
    }

    #[tokio::test]
    async fn base64_round_trip_test() {
        let server = offline_server();
        let encoded = server
            .base64_encode(Parameters(TextParam {
                text: "hello".to_string(),
            }))
            .await
            .unwrap();
        assert!(text_of(&encoded, 0).contains("aGVsbG8="));

        let decoded = server
            .base64_decode(Parameters(TextParam {
                text: "aGVsbG8=".to_string(),
            }))
            .await
            .unwrap();
        assert!(text_of(&decoded, 0).contains("hello"));
        assert!(text_of(&decoded, 1).contains("\"mode\": \"decode\""));
    }

    #[tokio::test]
    async fn base64_invalid_input_test() {
        let server = offline_server();
        let err = server
            .base64_decode(Parameters(TextParam {
                text: "@@@".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = server
            .base64_encode(Parameters(TextParam {
                text: String::new(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.message, crate::tools::encoding::EMPTY_INPUT);
    }

    #[tokio::test]
    async fn busy_session_refuses_second_submit_test() {
        let mut config = Config::from_lookup(|_| None);
        config.base64_delay = Some(Duration::from_millis(200));
        let server = ToolsServer::new(config);

        let first = server.base64_encode(Parameters(TextParam {
            text: "first".to_string(),
        }));
        let second = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            server
                .base64_encode(Parameters(TextParam {
                    text: "second".to_string(),
                }))
                .await
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_ok());
        let err = second.unwrap_err();
        assert_eq!(err.data, Some(json!({ "error": ToolError::Busy.to_string() })));
    }

    #[test]
    fn pdf_request_test() {
        let dir = tempfile::tempdir().unwrap();
        let file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile_in(dir.path())
            .unwrap();
        file.as_file().set_len(1024).unwrap();
        let raw = file.path().to_string_lossy().into_owned();

        let params = PdfParam {
            path: raw.clone(),
            mime_type: None,
            output_dir: None,
        };
        let (path, mime, out) = pdf_request(&params).unwrap();
        assert_eq!(path, file.path());
        assert_eq!(mime, pdf::PDF_MIME);
        assert_eq!(out, dir.path());

        let params = PdfParam {
            path: raw,
            mime_type: None,
            output_dir: Some("/tmp/out".to_string()),
        };
        assert_eq!(pdf_request(&params).unwrap().2, PathBuf::from("/tmp/out"));

        let params = PdfParam {
            path: "notes.txt".to_string(),
            mime_type: None,
            output_dir: None,
        };
        assert_eq!(
            pdf_request(&params).unwrap_err(),
            ToolError::Validation(pdf::NOT_A_PDF.to_string())
        );

        let params = PdfParam {
            path: "  ".to_string(),
            mime_type: None,
            output_dir: None,
        };
        assert_eq!(
            pdf_request(&params).unwrap_err(),
            ToolError::Validation(pdf::NO_FILE.to_string())
        );
    }

    #[tokio::test]
    async fn missing_pdf_fails_before_loading_test() {
        let server = offline_server();
        let dir = tempfile::tempdir().unwrap();
        let err = server
            .compress_pdf(Parameters(PdfParam {
                path: dir.path().join("gone.pdf").to_string_lossy().into_owned(),
                mime_type: None,
                output_dir: None,
            }))
            .await
            .unwrap_err();

        // The compressor is unconfigured, so reaching dispatch would report that instead.
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, pdf::NO_FILE);
        assert_eq!(
            server.sessions.pdf.state(),
            RequestState::Error(pdf::NO_FILE.to_string())
        );
    }

    #[tokio::test]
    async fn oversized_pdf_fails_before_loading_test() {
        let server = offline_server();
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.as_file().set_len(pdf::MAX_PDF_BYTES + 1).unwrap();

        let err = server
            .compress_pdf(Parameters(PdfParam {
                path: file.path().to_string_lossy().into_owned(),
                mime_type: None,
                output_dir: None,
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, pdf::TOO_LARGE);
        assert_eq!(
            server.sessions.pdf.state(),
            RequestState::Error(pdf::TOO_LARGE.to_string())
        );
    }

    #[tokio::test]
    async fn describe_tool_test() {
        let server = offline_server();
        let result = server
            .describe_tool(Parameters(DescribeParam {
                category: "dns-tools".to_string(),
                tool: "ssl".to_string(),
            }))
            .await
            .unwrap();
        assert!(text_of(&result, 0).contains("SSL Certificate Information"));

        let err = server
            .describe_tool(Parameters(DescribeParam {
                category: "dns-tools".to_string(),
                tool: "traceroute".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}
