use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ToolError, ToolResult};

pub const INVALID_DOMAIN: &str = "Please enter a valid domain name (e.g., example.com).";

// One or more `label.` segments followed by an alphabetic TLD.
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9-]{1,63}\.)+[a-zA-Z]{2,63}$").expect("domain pattern is valid")
});

/// Trims the input and checks it has the shape of a domain name.
///
/// Returns the trimmed domain on success.
pub fn domain(input: &str) -> ToolResult<&str> {
    let domain = input.trim();
    if DOMAIN_RE.is_match(domain) {
        Ok(domain)
    } else {
        Err(ToolError::Validation(INVALID_DOMAIN.to_string()))
    }
}
