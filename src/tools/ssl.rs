use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{LookupResponse, LookupTool};
use super::render::{Render, Report, Section};
use super::{dates, fields};
use crate::error::{ToolError, ToolResult};

pub const NOT_FOUND: &str = "SSL certificate does not exist or data is not available.";
const FETCH_FAILED: &str = "Failed to fetch SSL data.";
const NO_CERTIFICATE: &str = "No SSL certificate found";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SslIssuer {
    #[serde(rename = "C", default, deserialize_with = "fields::text")]
    pub country: Option<String>,
    #[serde(rename = "O", default, deserialize_with = "fields::text")]
    pub organization: Option<String>,
    #[serde(rename = "CN", default, deserialize_with = "fields::text")]
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SslSubject {
    #[serde(rename = "CN", default, deserialize_with = "fields::text")]
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslExtensions {
    #[serde(rename = "public_key", default, deserialize_with = "fields::text")]
    pub public_key: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub key_usage: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub extended_key_usage: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub basic_constraints: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub subject_key_identifier: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub authority_key_identifier: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub authority_info_access: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub subject_alt_name: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub certificate_policies: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub crl_distribution_points: Option<String>,
    #[serde(rename = "ct_precert_scts", default, deserialize_with = "fields::text")]
    pub ct_precert_scts: Option<String>,
}

impl SslExtensions {
    /// DNS names listed in `subjectAltName` (`DNS:a, DNS:b`).
    pub fn san_domains(&self) -> Vec<String> {
        self.subject_alt_name
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|part| part.trim().strip_prefix("DNS:"))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslData {
    #[serde(rename = "common_name", default, deserialize_with = "fields::text")]
    pub common_name: Option<String>,
    #[serde(default, deserialize_with = "fields::object")]
    pub issuer: SslIssuer,
    #[serde(default, deserialize_with = "fields::object")]
    pub subject: SslSubject,
    #[serde(default, deserialize_with = "fields::text")]
    pub valid_from: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub valid_to: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "fields::text")]
    pub signature_algorithm: Option<String>,
    #[serde(default, deserialize_with = "fields::object")]
    pub extensions: SslExtensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SslCertificateInfo {
    pub domain: String,
    pub data: SslData,
    pub san_domains: Vec<String>,
    pub days_until_expiry: Option<i64>,
    pub is_valid: bool,
}

pub struct SslLookup;

impl SslLookup {
    pub fn classify_at(
        domain: &str,
        response: LookupResponse,
        now: DateTime<Utc>,
    ) -> ToolResult<SslCertificateInfo> {
        if !response.is_ok() {
            return Err(response.upstream_error(FETCH_FAILED));
        }

        if response.envelope.raw_data_contains(NO_CERTIFICATE) {
            return Err(ToolError::Empty(NOT_FOUND.to_string()));
        }

        let data: SslData = response.envelope.data_as().unwrap_or_default();
        if data.common_name.is_none() {
            return Err(ToolError::Empty(NOT_FOUND.to_string()));
        }

        let days_until_expiry = data
            .valid_to
            .as_deref()
            .and_then(|valid_to| dates::days_until(valid_to, now));
        let not_yet_valid = data
            .valid_from
            .as_deref()
            .and_then(dates::parse)
            .is_some_and(|from| from > now);

        Ok(SslCertificateInfo {
            domain: response.domain_or(domain).to_string(),
            san_domains: data.extensions.san_domains(),
            is_valid: !not_yet_valid && days_until_expiry.is_some_and(|days| days > 0),
            days_until_expiry,
            data,
        })
    }
}

impl LookupTool for SslLookup {
    const TOOL: &'static str = "ssl";
    const TRANSPORT_ERROR: &'static str = "An error occurred while fetching SSL data.";

    type Output = SslCertificateInfo;

    fn classify(domain: &str, response: LookupResponse) -> ToolResult<SslCertificateInfo> {
        Self::classify_at(domain, response, Utc::now())
    }
}

fn date_or_na(value: Option<&str>) -> String {
    value.map(dates::display).unwrap_or_else(|| "N/A".to_string())
}

impl Render for SslCertificateInfo {
    fn render(&self) -> Report {
        let data = &self.data;
        let ext = &data.extensions;
        let mut report = Report::new("SSL Certificate Results").with_domain(&self.domain);

        let issuer = match (&data.issuer.organization, &data.issuer.country) {
            (Some(org), Some(country)) => format!("{} ({})", org, country),
            (Some(org), None) => org.clone(),
            _ => data
                .issuer
                .common_name
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
        };

        let mut overview = Section::new("Certificate Overview");
        overview
            .field_or_na(
                "Common Name",
                data.subject
                    .common_name
                    .as_deref()
                    .or(data.common_name.as_deref()),
            )
            .field("Issuer", issuer)
            .field_or_na("Serial Number", data.serial_number.as_deref())
            .field_or_na("Signature Algorithm", data.signature_algorithm.as_deref());
        report.push(overview);

        let mut validity = Section::new("Validity Period");
        validity
            .field("Valid From", date_or_na(data.valid_from.as_deref()))
            .field("Valid To", date_or_na(data.valid_to.as_deref()));
        match self.days_until_expiry {
            Some(days) if days > 0 => validity.field("Expires In", format!("{} days", days)),
            Some(days) => validity.field("Expired", format!("{} days ago", -days)),
            None => validity.field("Expires In", "N/A"),
        };
        report.push(validity);

        let mut usage = Section::new("Key Usage & Constraints");
        usage
            .field_or_na("Key Usage", ext.key_usage.as_deref())
            .field_or_na("Extended Key Usage", ext.extended_key_usage.as_deref())
            .field_or_na("Basic Constraints", ext.basic_constraints.as_deref());
        report.push(usage);

        let mut identifiers = Section::new("Identifiers & Access");
        identifiers
            .field_or_na("Subject Key Identifier", ext.subject_key_identifier.as_deref())
            .field_or_na(
                "Authority Key Identifier",
                ext.authority_key_identifier.as_deref(),
            )
            .field_or_na("Authority Info Access", ext.authority_info_access.as_deref())
            .field_or_na("Subject Alt Names", ext.subject_alt_name.as_deref())
            .field_or_na("Certificate Policies", ext.certificate_policies.as_deref())
            .field_or_na(
                "CRL Distribution Points",
                ext.crl_distribution_points.as_deref(),
            )
            .field_or_na("CT Precert SCTs", ext.ct_precert_scts.as_deref());
        report.push(identifiers);

        let mut key = Section::new("Public Key");
        key.field_or_na("Public Key", ext.public_key.as_deref());
        report.push(key);

        report
    }
}
