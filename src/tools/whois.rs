use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{LookupResponse, LookupTool};
use super::{dates, fields};
use super::render::{Render, Report, Section};
use crate::error::{ToolError, ToolResult};

pub const NOT_FOUND: &str = "Domain does not exist or WHOIS data not available.";
const ZERO_OBJECTS: &str = "returned 0 objects";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisData {
    #[serde(rename = "Domain Name", default, deserialize_with = "fields::text")]
    pub domain_name: Option<String>,
    #[serde(rename = "Registry Domain ID", default, deserialize_with = "fields::text")]
    pub registry_domain_id: Option<String>,
    #[serde(rename = "Registrar", default, deserialize_with = "fields::text")]
    pub registrar: Option<String>,
    #[serde(rename = "Registrar WHOIS Server", default, deserialize_with = "fields::text")]
    pub registrar_whois_server: Option<String>,
    #[serde(rename = "Registrar URL", default, deserialize_with = "fields::text")]
    pub registrar_url: Option<String>,
    #[serde(rename = "Registrar IANA ID", default, deserialize_with = "fields::text")]
    pub registrar_iana_id: Option<String>,
    #[serde(rename = "Registrar Abuse Contact Email", default, deserialize_with = "fields::text")]
    pub abuse_email: Option<String>,
    #[serde(rename = "Registrar Abuse Contact Phone", default, deserialize_with = "fields::text")]
    pub abuse_phone: Option<String>,
    #[serde(rename = "Creation Date", default, deserialize_with = "fields::text")]
    pub creation_date: Option<String>,
    #[serde(rename = "Updated Date", default, deserialize_with = "fields::text")]
    pub updated_date: Option<String>,
    #[serde(rename = "Registry Expiry Date", default, deserialize_with = "fields::text")]
    pub expiry_date: Option<String>,
    #[serde(rename = "Domain Status", default, deserialize_with = "fields::text_list")]
    pub domain_status: Vec<String>,
    #[serde(rename = "Name Server", default, deserialize_with = "fields::text_list")]
    pub name_servers: Vec<String>,
    #[serde(rename = "DNSSEC", default, deserialize_with = "fields::text")]
    pub dnssec: Option<String>,
    #[serde(rename = "DNSSEC DS Data", default, deserialize_with = "fields::text")]
    pub dnssec_ds_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhoisInfo {
    pub domain: String,
    pub whois_server: Option<String>,
    pub data: WhoisData,
    /// Days since `Creation Date`, when it parses.
    pub age_days: Option<i64>,
}

impl WhoisInfo {
    pub fn age_years(&self) -> Option<f64> {
        self.age_days.map(|days| days as f64 / 365.25)
    }
}

pub struct WhoisLookup;

impl WhoisLookup {
    pub fn classify_at(
        _domain: &str,
        response: LookupResponse,
        now: DateTime<Utc>,
    ) -> ToolResult<WhoisInfo> {
        // Status and the error flag are ignored for WHOIS; only the zero-objects
        // marker and the domain name decide.
        if response.envelope.raw_data_contains(ZERO_OBJECTS) {
            return Err(ToolError::Empty(NOT_FOUND.to_string()));
        }

        let data: WhoisData = response.envelope.data_as().unwrap_or_default();
        let Some(domain_name) = data.domain_name.clone() else {
            return Err(ToolError::Empty(NOT_FOUND.to_string()));
        };

        let age_days = data
            .creation_date
            .as_deref()
            .and_then(|created| dates::days_since(created, now));

        Ok(WhoisInfo {
            domain: domain_name,
            whois_server: response.envelope.whois_server.clone(),
            data,
            age_days,
        })
    }
}

impl LookupTool for WhoisLookup {
    const TOOL: &'static str = "whois";
    const TRANSPORT_ERROR: &'static str = "An error occurred while fetching WHOIS data.";

    type Output = WhoisInfo;

    fn classify(domain: &str, response: LookupResponse) -> ToolResult<WhoisInfo> {
        Self::classify_at(domain, response, Utc::now())
    }
}

fn date_or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(dates::display)
        .unwrap_or_else(|| "N/A".to_string())
}

impl Render for WhoisInfo {
    fn render(&self) -> Report {
        let data = &self.data;
        let mut report = Report::new("WHOIS Results").with_domain(&self.domain);

        let mut overview = Section::new("Domain Overview");
        overview
            .field_or_na("Domain Name", data.domain_name.as_deref())
            .field_or_na("Registry Domain ID", data.registry_domain_id.as_deref());
        for status in &data.domain_status {
            overview.field("Domain Status", status);
        }
        report.push(overview);

        let mut registrar = Section::new("Registrar Info");
        registrar
            .field_or_na("Registrar", data.registrar.as_deref())
            .field_or_na(
                "WHOIS Server",
                data.registrar_whois_server
                    .as_deref()
                    .or(self.whois_server.as_deref()),
            )
            .field_or_na("Registrar URL", data.registrar_url.as_deref())
            .field_or_na("IANA ID", data.registrar_iana_id.as_deref())
            .field_or_na("Abuse Email", data.abuse_email.as_deref())
            .field_or_na("Abuse Phone", data.abuse_phone.as_deref());
        report.push(registrar);

        let mut dates_section = Section::new("Registration Dates");
        dates_section
            .field("Creation Date", date_or_na(&data.creation_date))
            .field("Updated Date", date_or_na(&data.updated_date))
            .field("Expiry Date", date_or_na(&data.expiry_date));
        if let Some(years) = self.age_years() {
            dates_section.field("Domain Age", format!("{:.1} years", years));
        }
        report.push(dates_section);

        let mut nameservers = Section::new("Nameservers");
        for ns in &data.name_servers {
            nameservers.item(ns.as_str());
        }
        report.push(nameservers);

        let mut dnssec = Section::new("DNSSEC");
        dnssec
            .field_or_na("DNSSEC", data.dnssec.as_deref())
            .field_or_na("DNSSEC DS Data", data.dnssec_ds_data.as_deref());
        report.push(dnssec);

        report
    }
}
