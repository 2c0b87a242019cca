use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::{LookupResponse, LookupTool};
use super::fields;
use super::render::{Render, Report, Section};
use crate::error::{ToolError, ToolResult};

pub const NO_DNS_DATA: &str = "DNS data is not available for this domain.";
const FETCH_FAILED: &str = "Failed to fetch DNS data.";

/// One record as the Lookup API returns it.
///
/// Type-specific fields (`ip`, `target`, `mname`, `txt`, ...) are kept in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(default, deserialize_with = "fields::string")]
    pub host: String,
    #[serde(default, deserialize_with = "fields::text")]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "fields::number")]
    pub ttl: Option<u64>,
    #[serde(rename = "type", default, deserialize_with = "fields::text")]
    pub record_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DnsRecord {
    /// A type-specific field rendered as text; numbers are stringified.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn ip(&self) -> Option<String> {
        self.field("ip")
    }

    pub fn entries(&self) -> Vec<String> {
        self.extra
            .get("entries")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn ttl_text(&self) -> String {
        self.ttl.map(|ttl| ttl.to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsRecords {
    #[serde(rename = "A", default, skip_serializing_if = "Option::is_none")]
    pub a: Option<Vec<DnsRecord>>,
    #[serde(rename = "NS", default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<Vec<DnsRecord>>,
    #[serde(rename = "SOA", default, skip_serializing_if = "Option::is_none")]
    pub soa: Option<Vec<DnsRecord>>,
    #[serde(rename = "TXT", default, skip_serializing_if = "Option::is_none")]
    pub txt: Option<Vec<DnsRecord>>,
}

impl DnsRecords {
    /// True when the upstream sent none of the record categories at all.
    pub fn is_absent(&self) -> bool {
        self.a.is_none() && self.ns.is_none() && self.soa.is_none() && self.txt.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsLookupResult {
    pub domain: String,
    pub records: DnsRecords,
}

pub struct DnsLookup;

impl LookupTool for DnsLookup {
    const TOOL: &'static str = "dns";
    const TRANSPORT_ERROR: &'static str = "An error occurred while fetching DNS data.";

    type Output = DnsLookupResult;

    fn classify(domain: &str, response: LookupResponse) -> ToolResult<DnsLookupResult> {
        if !response.is_ok() {
            return Err(response.upstream_error(FETCH_FAILED));
        }

        let records: DnsRecords = response
            .envelope
            .data_as()
            .ok_or_else(|| ToolError::Upstream(FETCH_FAILED.to_string()))?;

        if records.is_absent() {
            return Err(ToolError::Empty(NO_DNS_DATA.to_string()));
        }

        Ok(DnsLookupResult {
            domain: response.domain_or(domain).to_string(),
            records,
        })
    }
}

fn non_empty(records: &Option<Vec<DnsRecord>>) -> &[DnsRecord] {
    records.as_deref().unwrap_or_default()
}

impl Render for DnsLookupResult {
    fn render(&self) -> Report {
        let mut report = Report::new("DNS Results").with_domain(&self.domain);

        let mut a = Section::new("A Records");
        for record in non_empty(&self.records.a) {
            a.card_break()
                .field("Host", &record.host)
                .field("IP", record.ip().unwrap_or_default())
                .field("TTL", record.ttl_text());
        }
        report.push(a);

        let mut ns = Section::new("NS Records");
        for (index, record) in non_empty(&self.records.ns).iter().enumerate() {
            ns.item(format!(
                "NS{} : {}",
                index + 1,
                record.field("target").unwrap_or_default()
            ));
        }
        report.push(ns);

        let mut soa = Section::new("SOA Records");
        for record in non_empty(&self.records.soa) {
            soa.card_break();
            for (label, key) in [
                ("MNAME", "mname"),
                ("RNAME", "rname"),
                ("Serial", "serial"),
                ("Refresh", "refresh"),
                ("Retry", "retry"),
                ("Expire", "expire"),
                ("Minimum TTL", "minimum-ttl"),
            ] {
                soa.field(label, record.field(key).unwrap_or_default());
            }
        }
        report.push(soa);

        let mut txt = Section::new("TXT Records");
        for record in non_empty(&self.records.txt) {
            txt.card_break()
                .field("Host", &record.host)
                .field("TXT", record.field("txt").unwrap_or_default());
            let entries = record.entries();
            if entries.len() > 1 {
                txt.note("Entries");
                for entry in entries {
                    txt.item(entry);
                }
            }
        }
        report.push(txt);

        report
    }
}
