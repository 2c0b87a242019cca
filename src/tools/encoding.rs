use std::time::Duration;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::render::{Render, Report, Section};
use crate::error::{ToolError, ToolResult};

pub const INVALID_INPUT: &str = "Invalid Base64 input";
pub const EMPTY_INPUT: &str = "Please enter text to encode or decode.";

// Padding is optional on decode, as browsers' atob allows.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Encode,
    Decode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base64Output {
    pub mode: Mode,
    pub output: String,
}

pub fn encode(input: &str) -> String {
    STANDARD.encode(input.as_bytes())
}

/// Decodes, ignoring ASCII whitespace. Bytes that are not UTF-8 are replaced.
pub fn decode(input: &str) -> ToolResult<String> {
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = FORGIVING
        .decode(compact.as_bytes())
        .map_err(|_| ToolError::Validation(INVALID_INPUT.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Local encoder/decoder with a short artificial delay before answering.
#[derive(Debug, Clone)]
pub struct Base64Tool {
    delay: Duration,
}

impl Base64Tool {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn check(input: &str) -> ToolResult<()> {
        if input.is_empty() {
            return Err(ToolError::Validation(EMPTY_INPUT.to_string()));
        }
        Ok(())
    }

    pub async fn run(&self, mode: Mode, input: &str) -> ToolResult<Base64Output> {
        Self::check(input)?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let output = match mode {
            Mode::Encode => encode(input),
            Mode::Decode => decode(input)?,
        };

        Ok(Base64Output { mode, output })
    }
}

impl Render for Base64Output {
    fn render(&self) -> Report {
        let title = match self.mode {
            Mode::Encode => "Base64 Encoded",
            Mode::Decode => "Base64 Decoded",
        };
        let mut report = Report::new(title);
        let mut section = Section::new("Output");
        section.item(self.output.as_str());
        report.push(section);
        report
    }
}
