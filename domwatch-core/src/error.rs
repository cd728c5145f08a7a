use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomwatchError {
    #[error("WHOIS lookup failed: {0}")]
    WhoisError(String),

    #[error("WHOIS server not found for TLD: {0}")]
    WhoisServerNotFound(String),

    #[error("WHOIS connection failed: {0}")]
    WhoisConnectionFailed(#[from] std::io::Error),

    #[error("Certificate probe failed: {0}")]
    CertificateError(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Notification failed: {0}")]
    NotificationError(String),

    #[error("Failed to read domain list {path}: {source}")]
    DomainListError {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DomwatchError>;
