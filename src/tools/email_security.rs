use serde::{Deserialize, Serialize};

use super::client::{LookupResponse, LookupTool};
use super::dns::DnsRecord;
use super::render::{Render, Report, Section};
use crate::error::{ToolError, ToolResult};

pub const NO_RECORDS: &str = "No Email Security records found for this domain.";
pub const NO_DMARC: &str = "No DMARC records found for this domain.";
const FETCH_FAILED: &str = "Failed to fetch Email Security data.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailSecurityRecords {
    #[serde(rename = "SPF", default)]
    pub spf: Option<Vec<DnsRecord>>,
    #[serde(rename = "DKIM", default)]
    pub dkim: Option<Vec<DnsRecord>>,
    #[serde(rename = "DMARC", default)]
    pub dmarc: Option<Vec<DnsRecord>>,
}

fn records(list: &Option<Vec<DnsRecord>>) -> &[DnsRecord] {
    list.as_deref().unwrap_or_default()
}

impl EmailSecurityRecords {
    pub fn is_empty(&self) -> bool {
        records(&self.spf).is_empty()
            && records(&self.dkim).is_empty()
            && records(&self.dmarc).is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSecurityResult {
    pub domain: String,
    pub records: EmailSecurityRecords,
    /// Set when SPF or DKIM exist but DMARC does not.
    pub notice: Option<String>,
}

pub struct EmailSecurityLookup;

impl LookupTool for EmailSecurityLookup {
    const TOOL: &'static str = "email-security";
    const TRANSPORT_ERROR: &'static str = "An error occurred while fetching Email Security data.";

    type Output = EmailSecurityResult;

    fn classify(domain: &str, response: LookupResponse) -> ToolResult<EmailSecurityResult> {
        if !response.is_ok() {
            return Err(response.upstream_error(FETCH_FAILED));
        }

        let found: EmailSecurityRecords = response
            .envelope
            .data_as()
            .ok_or_else(|| ToolError::Upstream(FETCH_FAILED.to_string()))?;

        if found.is_empty() {
            return Err(ToolError::Empty(NO_RECORDS.to_string()));
        }

        let notice = records(&found.dmarc)
            .is_empty()
            .then(|| NO_DMARC.to_string());

        Ok(EmailSecurityResult {
            domain: response.domain_or(domain).to_string(),
            records: found,
            notice,
        })
    }
}

fn txt_section(title: &str, list: &[DnsRecord]) -> Section {
    let mut section = Section::new(title);
    for record in list {
        section
            .card_break()
            .field("Host", &record.host)
            .field_or_na("Type", record.record_type.as_deref())
            .field("TXT", record.field("txt").unwrap_or_default());
        if let Some(ttl) = record.ttl {
            section.field("TTL", ttl);
        }
        let entries = record.entries();
        if entries.len() > 1 {
            section.note("Entries");
            for entry in entries {
                section.item(entry);
            }
        }
    }
    section
}

impl Render for EmailSecurityResult {
    fn render(&self) -> Report {
        let mut report = Report::new("Email Security Results").with_domain(&self.domain);

        report.push(txt_section("SPF Records", records(&self.records.spf)));
        report.push(txt_section("DKIM Records", records(&self.records.dkim)));

        let mut dmarc = txt_section("DMARC Records", records(&self.records.dmarc));
        if let Some(notice) = &self.notice {
            dmarc.note(notice.as_str());
        }
        report.push(dmarc);

        report
    }
}
