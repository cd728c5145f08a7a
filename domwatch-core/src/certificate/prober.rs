use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument};
use x509_parser::parse_x509_certificate;

use super::CertificateProbe;
use crate::error::{DomwatchError, Result};
use crate::validation::DomainName;

const HTTPS_PORT: u16 = 443;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads leaf certificate expirations over a real TLS handshake.
#[derive(Debug, Clone)]
pub struct TlsProber {
    timeout: Duration,
    port: u16,
}

impl Default for TlsProber {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsProber {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            port: HTTPS_PORT,
        }
    }

    /// Bound for the TCP connect and for the TLS handshake, each.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    async fn probe(&self, domain: &str) -> Result<DateTime<Utc>> {
        // System trust store, no client certificate
        let connector = TlsConnector::new()
            .map_err(|e| DomwatchError::CertificateError(e.to_string()))?;
        let connector = tokio_native_tls::TlsConnector::from(connector);

        let stream = timeout(self.timeout, TcpStream::connect((domain, self.port)))
            .await
            .map_err(|_| DomwatchError::Timeout(format!("Connection to {} timed out", domain)))?
            .map_err(|e| {
                DomwatchError::CertificateError(format!("Failed to connect to {}: {}", domain, e))
            })?;

        let mut tls_stream = timeout(self.timeout, connector.connect(domain, stream))
            .await
            .map_err(|_| DomwatchError::Timeout(format!("TLS handshake with {} timed out", domain)))?
            .map_err(|e| {
                DomwatchError::CertificateError(format!("TLS handshake with {} failed: {}", domain, e))
            })?;

        let leaf = tls_stream
            .get_ref()
            .peer_certificate()
            .map_err(|e| DomwatchError::CertificateError(e.to_string()))
            .and_then(|cert| {
                cert.ok_or_else(|| {
                    DomwatchError::CertificateError("No certificate presented".to_string())
                })
            })
            .and_then(|cert| {
                cert.to_der()
                    .map_err(|e| DomwatchError::CertificateError(e.to_string()))
            });

        // Shut down on every path before the certificate is parsed
        if let Err(e) = tls_stream.shutdown().await {
            debug!(error = %e, "TLS shutdown failed");
        }
        drop(tls_stream);

        not_after_from_der(&leaf?)
    }
}

#[async_trait]
impl CertificateProbe for TlsProber {
    #[instrument(skip(self), fields(domain = %domain))]
    async fn leaf_expiration(&self, domain: &DomainName) -> Result<DateTime<Utc>> {
        debug!(port = self.port, "Probing TLS certificate");
        let not_after = self.probe(domain.as_str()).await?;
        debug!(not_after = %not_after, "Leaf certificate read");
        Ok(not_after)
    }
}

/// Extract the `notAfter` instant from a DER-encoded X.509 certificate.
fn not_after_from_der(der: &[u8]) -> Result<DateTime<Utc>> {
    let (_, cert) = parse_x509_certificate(der)
        .map_err(|e| DomwatchError::CertificateError(format!("Invalid certificate: {}", e)))?;

    let timestamp = cert.validity().not_after.timestamp();
    DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        DomwatchError::CertificateError(format!("notAfter out of range: {}", timestamp))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use chrono::TimeZone;
    use tokio::net::TcpListener;
    use x509_parser::pem::parse_x509_pem;

    use crate::certificate::format_rfc1123;

    // Self-signed, CN=domwatch.test, valid until 2030-01-02 15:04:05 UTC
    const LEAF_PEM: &str = "\
-----BEGIN CERTIFICATE-----
MIIBhTCCASugAwIBAgIUC7elk6+HiZJEH84S3wzQ/oXL7vowCgYIKoZIzj0EAwIw
GDEWMBQGA1UEAwwNZG9td2F0Y2gudGVzdDAeFw0yNTAxMDEwMDAwMDBaFw0zMDAx
MDIxNTA0MDVaMBgxFjAUBgNVBAMMDWRvbXdhdGNoLnRlc3QwWTATBgcqhkjOPQIB
BggqhkjOPQMBBwNCAASTGlvA98Diw7fwAb3vgJja4SYRryu2HyE7UWJYG/NPOvXP
aU8pnn8f/PMUVfqRXX5NgIPFvJnxGMrRMEdqmkqvo1MwUTAdBgNVHQ4EFgQUaRqP
VfQJ7HdlX2ZF19AbhyRupXQwHwYDVR0jBBgwFoAUaRqPVfQJ7HdlX2ZF19AbhyRu
pXQwDwYDVR0TAQH/BAUwAwEB/zAKBggqhkjOPQQDAgNIADBFAiEAkWR+k48Hdkdx
bcZlbFfkZYkM+0/o3TX15wveuUfJ1xsCIF5VpQJ2pT/R+Oxt2qXsY6rqeIeDPf//
bLXC4nBMkwpL
-----END CERTIFICATE-----
";

    #[test]
    fn test_not_after_from_der() {
        let (_, pem) = parse_x509_pem(LEAF_PEM.as_bytes()).unwrap();
        let not_after = not_after_from_der(&pem.contents).unwrap();

        assert_eq!(not_after, Utc.with_ymd_and_hms(2030, 1, 2, 15, 4, 5).unwrap());
        assert_eq!(format_rfc1123(&not_after), "Wed, 02 Jan 2030 15:04:05 UTC");
    }

    #[test]
    fn test_not_after_from_invalid_der() {
        let result = not_after_from_der(&[0x30, 0x03, 0x02, 0x01, 0x00]);
        assert!(matches!(result, Err(DomwatchError::CertificateError(_))));
    }

    #[tokio::test]
    async fn test_probe_closed_port_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let prober = TlsProber::new()
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        let domain = DomainName::new("127.0.0.1").unwrap();

        assert!(prober.leaf_expiration(&domain).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_handshake_makes_single_attempt() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = accepted.clone();
        tokio::spawn(async move {
            // Drop every connection straight away so the handshake fails
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(stream);
            }
        });

        let prober = TlsProber::new()
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        let domain = DomainName::new("127.0.0.1").unwrap();

        let result = prober.leaf_expiration(&domain).await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(5)).await;
                drop(stream);
            }
        });

        let prober = TlsProber::new()
            .with_port(port)
            .with_timeout(Duration::from_millis(200));
        let domain = DomainName::new("127.0.0.1").unwrap();

        let result = prober.leaf_expiration(&domain).await;
        assert!(matches!(result, Err(DomwatchError::Timeout(_))));
    }
}
