//! TLS certificate probing
//!
//! Connects to a domain over HTTPS and reads the expiration instant of the
//! leaf certificate. The chain is verified against the system trust store by
//! the handshake itself; nothing beyond the leaf's `notAfter` is inspected.

mod prober;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::validation::DomainName;

pub use prober::TlsProber;

/// Textual date-time format equivalent to RFC 1123 with an explicit zone.
pub const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// Source of leaf certificate expirations.
#[async_trait]
pub trait CertificateProbe: Send + Sync {
    /// Returns the `notAfter` instant of the certificate presented first by
    /// the domain's HTTPS endpoint.
    async fn leaf_expiration(&self, domain: &DomainName) -> Result<DateTime<Utc>>;
}

/// Render a timestamp as `Wed, 02 Jan 2030 15:04:05 UTC`.
pub fn format_rfc1123(instant: &DateTime<Utc>) -> String {
    instant.format(RFC1123_FORMAT).to_string()
}
