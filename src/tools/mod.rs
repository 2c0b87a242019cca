pub mod client;
pub mod dates;
pub mod dns;
pub mod domain_to_ip;
pub mod email_security;
pub mod encoding;
pub mod fields;
pub mod http_headers;
pub mod nslookup;
pub mod pdf;
pub mod render;
pub mod session;
pub mod ssl;
pub mod validate;
pub mod whois;

pub use client::{LookupClient, LookupTool};
pub use render::{Render, Report};
pub use session::{RequestState, ToolSession};
