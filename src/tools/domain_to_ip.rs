use serde::{Deserialize, Serialize};

use super::client::{LookupResponse, LookupTool};
use super::dns::DnsRecords;
use super::render::{Render, Report, Section};
use crate::error::{ToolError, ToolResult};

const GENERIC_ERROR: &str = "An error occurred while fetching data";
pub const NO_ADDRESSES: &str = "No IP addresses found for this domain.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpResult {
    pub domain: String,
    pub ip_addresses: Vec<String>,
}

/// Resolves a domain to its addresses through the `dns` lookup.
pub struct DomainToIp;

impl LookupTool for DomainToIp {
    const TOOL: &'static str = "dns";
    const TRANSPORT_ERROR: &'static str = GENERIC_ERROR;

    type Output = IpResult;

    fn classify(domain: &str, response: LookupResponse) -> ToolResult<IpResult> {
        if !response.is_ok() {
            return Err(response.upstream_error(GENERIC_ERROR));
        }

        let records: DnsRecords = response
            .envelope
            .data_as()
            .ok_or_else(|| ToolError::Upstream(GENERIC_ERROR.to_string()))?;

        let mut ip_addresses: Vec<String> = Vec::new();
        for ip in records.a.iter().flatten().filter_map(|r| r.ip()) {
            if !ip_addresses.contains(&ip) {
                ip_addresses.push(ip);
            }
        }

        if ip_addresses.is_empty() {
            return Err(ToolError::Empty(NO_ADDRESSES.to_string()));
        }

        Ok(IpResult {
            domain: domain.to_string(),
            ip_addresses,
        })
    }
}

impl Render for IpResult {
    fn render(&self) -> Report {
        let mut report = Report::new(format!("Results for {}", self.domain));
        let mut section = Section::new("IP Addresses");
        for (index, ip) in self.ip_addresses.iter().enumerate() {
            section.field(&format!("IP Address {}", index + 1), ip);
        }
        report.push(section);
        report
    }
}
