//! WHOIS querying and registration expiration extraction

mod client;
mod expiry;
mod servers;

use async_trait::async_trait;

use crate::error::Result;
use crate::validation::DomainName;

pub use client::WhoisClient;
pub use expiry::{extract_expiration, EXPIRATION_PATTERNS};
pub use servers::{extract_iana_referral, extract_referral, get_whois_server, IANA_WHOIS_SERVER};

/// Anything that can answer a WHOIS query with raw response text.
#[async_trait]
pub trait WhoisSource: Send + Sync {
    async fn fetch(&self, domain: &DomainName) -> Result<String>;
}
