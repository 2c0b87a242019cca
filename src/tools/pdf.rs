use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use super::render::{Render, Report, Section};
use crate::config::Config;
use crate::error::{ToolError, ToolResult};

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_PDF_BYTES: u64 = 50 * 1024 * 1024;

pub const NOT_A_PDF: &str = "Please upload a valid PDF file.";
pub const TOO_LARGE: &str = "File size exceeds the 50MB limit.";
pub const NO_FILE: &str = "Please select a PDF file to compress.";
const COMPRESS_FAILED: &str = "An error occurred while compressing the PDF.";

/// Declared type and size check, run before any bytes are read or sent.
pub fn check(mime_type: &str, size: u64) -> ToolResult<()> {
    if mime_type != PDF_MIME {
        return Err(ToolError::Validation(NOT_A_PDF.to_string()));
    }
    if size > MAX_PDF_BYTES {
        return Err(ToolError::Validation(TOO_LARGE.to_string()));
    }
    Ok(())
}

/// MIME type implied by the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MIME,
        _ => "application/octet-stream",
    }
}

/// Formats a byte count as `Bytes`/`KB`/`MB`/`GB`, two decimals at most.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit < UNITS.len() - 1 && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> ToolResult<Self> {
        let upload = Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        };
        check(&upload.mime_type, upload.size())?;
        Ok(upload)
    }

    /// Reads a file from disk. Type and size are checked before reading.
    pub async fn from_path(path: &Path, mime_type: Option<&str>) -> ToolResult<Self> {
        let mime_type = mime_type.unwrap_or_else(|| mime_for(path));
        check_file(path, mime_type)?;

        let bytes = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        Self::new(file_name, mime_type, bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Stats the file and applies [`check`] to its size. Returns the size.
pub fn check_file(path: &Path, mime_type: &str) -> ToolResult<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| read_error(path, e))?;
    if !metadata.is_file() {
        return Err(ToolError::Validation(NO_FILE.to_string()));
    }
    check(mime_type, metadata.len())?;
    Ok(metadata.len())
}

fn read_error(path: &Path, e: std::io::Error) -> ToolError {
    if e.kind() == ErrorKind::NotFound {
        ToolError::Validation(NO_FILE.to_string())
    } else {
        ToolError::Validation(format!("Could not read {}: {}", path.display(), e))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedPdf {
    pub file_name: String,
    pub original_size: u64,
    pub compressed_size: u64,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub saved_to: Option<PathBuf>,
}

impl CompressedPdf {
    /// Writes the bytes as `dir/compressed_<name>`.
    pub async fn save_in(&mut self, dir: &Path) -> ToolResult<PathBuf> {
        let target = dir.join(&self.file_name);
        tokio::fs::write(&target, &self.bytes).await.map_err(|e| {
            tracing::error!("failed to write {}: {}", target.display(), e);
            ToolError::Transport(format!("Could not save {}: {}", target.display(), e))
        })?;
        tracing::info!(path = %target.display(), "compressed PDF saved");
        self.saved_to = Some(target.clone());
        Ok(target)
    }

    /// Size reduction as a percentage of the original.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct PdfCompressor {
    client: Client,
    url: String,
}

impl PdfCompressor {
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
        Ok(Self::new(config.pdf_endpoint()?))
    }

    /// Uploads the file as multipart field `pdf`.
    ///
    /// A response typed `application/pdf` is the compressed document; any
    /// other response body is the upstream's error message.
    pub async fn compress(&self, upload: &PdfUpload) -> ToolResult<CompressedPdf> {
        check(&upload.mime_type, upload.size())?;

        tracing::debug!(file = %upload.file_name, size = upload.size(), "uploading PDF");

        let transport = |e: reqwest::Error| {
            tracing::error!("PDF compression failed: {}", e);
            ToolError::Transport(COMPRESS_FAILED.to_string())
        };

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(PDF_MIME)
            .map_err(transport)?;
        let form = Form::new().part("pdf", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let is_pdf = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains(PDF_MIME));

        if !is_pdf {
            let message = response.text().await.map_err(transport)?;
            tracing::warn!(%status, "PDF compression rejected: {}", message);
            let message = message.trim();
            return Err(ToolError::Upstream(if message.is_empty() {
                COMPRESS_FAILED.to_string()
            } else {
                message.to_string()
            }));
        }

        let bytes = response.bytes().await.map_err(transport)?.to_vec();
        tracing::info!(
            original = upload.size(),
            compressed = bytes.len(),
            "PDF compressed"
        );

        Ok(CompressedPdf {
            file_name: format!("compressed_{}", upload.file_name),
            original_size: upload.size(),
            compressed_size: bytes.len() as u64,
            bytes,
            saved_to: None,
        })
    }
}

impl Render for CompressedPdf {
    fn render(&self) -> Report {
        let mut report = Report::new("PDF Compressed");
        let mut section = Section::new("Result");
        section
            .field("File", &self.file_name)
            .field("Original Size", format_bytes(self.original_size))
            .field("Compressed Size", format_bytes(self.compressed_size))
            .field("Reduction", format!("{:.1}%", self.reduction_percent()));
        if let Some(path) = &self.saved_to {
            section.field("Saved To", path.display());
        }
        report.push(section);
        report
    }
}
