//! Static registry of tool categories, in display order.

use serde::Serialize;

use crate::error::{ToolError, ToolResult};
use crate::tools::render::{Render, Report, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub information: &'static str,
    pub use_cases: &'static [&'static str],
    /// Name of the MCP tool that runs it.
    pub mcp_tool: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub tools: &'static [ToolInfo],
}

pub static CATEGORIES: &[Category] = &[
    Category {
        id: "dns-tools",
        name: "DNS Tools",
        tools: &[
            ToolInfo {
                id: "nslookup",
                title: "NS Lookup",
                description: "Look up name server information for a domain",
                information: "NS Lookup (Name Server Lookup) queries the Domain Name System to \
                    obtain domain name or IP address mapping information. It helps diagnose \
                    DNS-related problems and verify DNS records.",
                use_cases: &[
                    "Troubleshooting email delivery issues",
                    "Verifying DNS changes have propagated",
                    "Identifying authoritative name servers for a domain",
                    "Debugging network connectivity problems",
                ],
                mcp_tool: "ns_lookup",
            },
            ToolInfo {
                id: "domain-to-ip",
                title: "Domain to IP",
                description: "Convert a domain name to IP address",
                information: "Resolves a domain name to its IP address(es), translating a \
                    human-readable name into the addresses computers use to reach each other.",
                use_cases: &[
                    "Troubleshooting network connectivity issues",
                    "Verifying server configurations",
                    "Setting up firewall rules",
                    "Bypassing DNS-based content filters",
                ],
                mcp_tool: "domain_to_ip",
            },
            ToolInfo {
                id: "whois",
                title: "WHOIS Information",
                description: "Check Whois information of a domain",
                information: "Shows the public registration record of a domain: registrar, \
                    key dates, status codes, name servers and DNSSEC state.",
                use_cases: &[
                    "Understand domain ownership and relationships.",
                    "Troubleshoot domain-related issues.",
                    "Conduct security research",
                    "Make informed decisions about online interactions.",
                ],
                mcp_tool: "whois_lookup",
            },
            ToolInfo {
                id: "dns",
                title: "DNS Information",
                description: "Check DNS records of a domain",
                information: "Queries the A, NS, SOA and TXT records of a domain to show how it \
                    is configured and to diagnose resolution problems.",
                use_cases: &[
                    "Identify the IP address associated with a domain.",
                    "Determine the authoritative nameservers for a domain.",
                    "Inspect email server configurations via MX records.",
                    "Verify domain security through DNSSEC records.",
                    "Troubleshoot connectivity and performance issues.",
                    "Analyze DNS propagation and updates.",
                ],
                mcp_tool: "dns_lookup",
            },
            ToolInfo {
                id: "ssl",
                title: "SSL Certificate Information",
                description: "Check SSL certificate details of a domain",
                information: "Inspects the TLS certificate a domain serves: subject, issuer, \
                    validity window, key usage and extensions.",
                use_cases: &[
                    "Verify the issuer and validity period of an SSL certificate.",
                    "Ensure that the SSL certificate is properly configured.",
                    "Detect potential security issues related to SSL/TLS.",
                    "Assess the strength of encryption algorithms used.",
                    "Monitor certificate expiration to prevent downtime.",
                    "Analyze certificate chain and trustworthiness.",
                ],
                mcp_tool: "ssl_certificate_info",
            },
            ToolInfo {
                id: "email-security",
                title: "Email Security Information",
                description: "Check Email Security records of a domain",
                information: "Shows the SPF, DKIM and DMARC records that authenticate mail \
                    sent on behalf of a domain.",
                use_cases: &[
                    "Verify the SPF record to ensure authorized mail servers.",
                    "Check DKIM records for email integrity and authenticity.",
                    "Assess DMARC policies to enforce email handling strategies.",
                    "Prevent email spoofing and phishing attacks.",
                    "Improve email deliverability and reduce spam.",
                    "Diagnose and troubleshoot email authentication issues.",
                ],
                mcp_tool: "email_security_lookup",
            },
            ToolInfo {
                id: "http-headers",
                title: "HTTP Headers Information",
                description: "Check HTTP headers of a domain",
                information: "Lists the HTTP response headers a domain sends and flags missing \
                    security headers.",
                use_cases: &[
                    "Analyze server configurations and technologies.",
                    "Inspect caching policies and content delivery strategies.",
                    "Evaluate security headers for vulnerabilities.",
                    "Monitor HTTP response codes and redirects.",
                    "Understand content types and character encoding.",
                    "Diagnose issues related to HTTP requests and responses.",
                ],
                mcp_tool: "http_headers_lookup",
            },
        ],
    },
    Category {
        id: "encoding-tools",
        name: "Encoding/Decoding Tools",
        tools: &[ToolInfo {
            id: "base64",
            title: "Base64 Encoder/Decoder",
            description: "Encode or decode Base64 strings",
            information: "Base64 represents binary data as ASCII text so it can travel through \
                channels that only handle text reliably.",
            use_cases: &[
                "Encoding binary data for inclusion in XML or JSON",
                "Embedding image data in CSS or HTML",
                "Encoding data in URL parameters",
                "Storing complex data structures in text-based databases",
            ],
            mcp_tool: "base64_encode",
        }],
    },
    Category {
        id: "pdf-tools",
        name: "PDF Tools",
        tools: &[ToolInfo {
            id: "pdf-compress",
            title: "PDF Compress Tool",
            description: "Compress PDF files to reduce their size",
            information: "Uploads a PDF of up to 50MB to the compression service and saves the \
                smaller copy as compressed_<name>.",
            use_cases: &[
                "Optimize PDF files for faster web loading.",
                "Reduce file size for email attachments.",
                "Manage storage by minimizing document sizes.",
                "Prepare documents for online sharing and distribution.",
                "Enhance user experience by decreasing download times.",
                "Ensure compliance with file size restrictions on various platforms.",
            ],
            mcp_tool: "compress_pdf",
        }],
    },
];

pub fn find(category_id: &str, tool_id: &str) -> ToolResult<(&'static Category, &'static ToolInfo)> {
    CATEGORIES
        .iter()
        .find(|c| c.id == category_id)
        .and_then(|category| {
            category
                .tools
                .iter()
                .find(|t| t.id == tool_id)
                .map(|tool| (category, tool))
        })
        .ok_or_else(|| {
            ToolError::Validation(format!(
                "No tool '{}' in category '{}'.",
                tool_id, category_id
            ))
        })
}

impl Render for ToolInfo {
    fn render(&self) -> Report {
        let mut report = Report::new(self.title);
        report.subtitle = Some(self.description.to_string());

        let mut about = Section::new("Information");
        about.item(self.information.split_whitespace().collect::<Vec<_>>().join(" "));
        report.push(about);

        let mut uses = Section::new("Use Cases");
        for use_case in self.use_cases {
            uses.item(*use_case);
        }
        report.push(uses);

        let mut run = Section::new("Usage");
        run.field("MCP Tool", self.mcp_tool);
        report.push(run);

        report
    }
}

/// One line per tool, used in the server instructions.
pub fn summary() -> String {
    CATEGORIES
        .iter()
        .map(|category| {
            let tools = category
                .tools
                .iter()
                .map(|t| format!("  {} ({}): {}", t.title, t.mcp_tool, t.description))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}:\n{}", category.name, tools)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_test() {
        let (category, tool) = find("dns-tools", "whois").unwrap();
        assert_eq!(category.name, "DNS Tools");
        assert_eq!(tool.mcp_tool, "whois_lookup");
        assert_eq!(tool.use_cases.len(), 4);
    }

    #[test]
    fn find_unknown_test() {
        assert!(find("dns-tools", "traceroute").is_err());
        assert!(find("nope", "whois").is_err());
        assert!(find("encoding-tools", "whois").is_err());
    }

    #[test]
    fn ids_are_unique_test() {
        let mut ids: Vec<&str> = CATEGORIES
            .iter()
            .flat_map(|c| c.tools.iter().map(|t| t.id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 9);
    }

    #[test]
    fn render_test() {
        let (_, tool) = find("pdf-tools", "pdf-compress").unwrap();
        let report = tool.render();
        assert_eq!(report.title, "PDF Compress Tool");
        assert_eq!(report.section("Use Cases").unwrap().entries.len(), 6);
        assert_eq!(
            report.section("Usage").unwrap().value_of("MCP Tool"),
            Some("compress_pdf")
        );
    }

    #[test]
    fn summary_lists_every_tool_test() {
        let text = summary();
        for category in CATEGORIES {
            for tool in category.tools {
                assert!(text.contains(tool.mcp_tool), "{}", tool.mcp_tool);
            }
        }
    }
}
