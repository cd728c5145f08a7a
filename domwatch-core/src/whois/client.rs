use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::servers::{extract_iana_referral, extract_referral, get_whois_server, IANA_WHOIS_SERVER};
use super::WhoisSource;
use crate::error::{DomwatchError, Result};
use crate::validation::DomainName;

const WHOIS_PORT: u16 = 43;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB
const MAX_REFERRAL_DEPTH: u8 = 3;

/// Plain-text WHOIS client (RFC 3912 over TCP port 43).
#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
    port: u16,
    server: Option<String>,
    iana_server: String,
    follow_referrals: bool,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            port: WHOIS_PORT,
            server: None,
            iana_server: IANA_WHOIS_SERVER.to_string(),
            follow_referrals: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query this server instead of resolving one from the TLD.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Server asked for the TLD record when a TLD is not in the table.
    pub fn with_iana_server(mut self, server: impl Into<String>) -> Self {
        self.iana_server = server.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Also query the registrar server a registry response refers to and
    /// append its answer to the registry's.
    pub fn with_referrals(mut self, follow: bool) -> Self {
        self.follow_referrals = follow;
        self
    }

    /// Raw WHOIS text for a domain.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn lookup(&self, domain: &DomainName) -> Result<String> {
        let server = self.resolve_server(domain).await?;

        let mut visited = HashSet::new();
        let mut responses = Vec::new();
        let mut next = Some(server);
        let mut depth = 0u8;

        while let Some(server) = next.take() {
            if !visited.insert(server.to_lowercase()) {
                warn!(server = %server, "Circular WHOIS referral detected");
                break;
            }

            debug!(whois_server = %server, depth = depth, "Querying WHOIS server");
            let response = match self.query_server(&server, domain.as_str()).await {
                Ok(response) => response,
                // A failing registrar must not hide the registry answer
                Err(e) if depth > 0 => {
                    warn!(server = %server, error = %e, "Registrar WHOIS referral failed");
                    break;
                }
                Err(e) => return Err(e),
            };

            if self.follow_referrals {
                depth += 1;
                if depth < MAX_REFERRAL_DEPTH {
                    next = extract_referral(&response);
                } else if extract_referral(&response).is_some() {
                    warn!(depth = depth, server = %server, "Max referral depth exceeded");
                }
            }

            responses.push(response);
        }

        Ok(responses.join("\n"))
    }

    /// Pick the authority for a domain: explicit override, built-in table,
    /// then the IANA record for the TLD.
    async fn resolve_server(&self, domain: &DomainName) -> Result<String> {
        if let Some(server) = &self.server {
            return Ok(server.clone());
        }

        let tld = domain
            .tld()
            .ok_or_else(|| DomwatchError::InvalidDomain(domain.to_string()))?;

        if let Some(server) = get_whois_server(tld) {
            return Ok(server.to_string());
        }

        debug!(tld = %tld, "TLD not in server table, asking IANA");
        let iana = self.query_server(&self.iana_server, tld).await?;
        extract_iana_referral(&iana).ok_or_else(|| DomwatchError::WhoisServerNotFound(tld.to_string()))
    }

    async fn query_server(&self, server: &str, query: &str) -> Result<String> {
        let mut stream = timeout(self.timeout, TcpStream::connect((server, self.port)))
            .await
            .map_err(|_| DomwatchError::Timeout(format!("Connection to {} timed out", server)))?
            .map_err(|e| DomwatchError::WhoisError(format!("Failed to connect to {}: {}", server, e)))?;

        // Send query with CRLF
        let query_bytes = format!("{}\r\n", query);
        timeout(self.timeout, stream.write_all(query_bytes.as_bytes()))
            .await
            .map_err(|_| DomwatchError::Timeout("Write timed out".to_string()))??;

        let mut response = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            match timeout(self.timeout, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break, // EOF
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.len() > MAX_RESPONSE_SIZE {
                        return Err(DomwatchError::WhoisError("Response too large".to_string()));
                    }
                }
                Ok(Err(e)) => return Err(DomwatchError::WhoisConnectionFailed(e)),
                Err(_) => {
                    // Some servers never close; keep what arrived
                    if !response.is_empty() {
                        break;
                    }
                    return Err(DomwatchError::Timeout("Read timed out".to_string()));
                }
            }
        }

        Ok(decode_response(response))
    }
}

#[async_trait]
impl WhoisSource for WhoisClient {
    async fn fetch(&self, domain: &DomainName) -> Result<String> {
        self.lookup(domain).await
    }
}

/// UTF-8, falling back to Latin-1.
fn decode_response(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}
