//! Configuration values handed to the inspector and notifiers at
//! construction time.

use serde::{Deserialize, Serialize};

use crate::error::{DomwatchError, Result};

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (submission, port 587).
    #[default]
    StartTls,
    /// TLS from the first byte (SMTPS, port 465).
    Tls,
}

/// SMTP relay settings for the e-mail notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Sender address, e.g. `alerts@example.com` or `Alerts <alerts@example.com>`
    pub from: String,
    #[serde(default)]
    pub security: SmtpSecurity,
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl SmtpConfig {
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port: DEFAULT_SMTP_PORT,
            username: username.into(),
            password: password.into(),
            from: from.into(),
            security: SmtpSecurity::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_security(mut self, security: SmtpSecurity) -> Self {
        self.security = security;
        self
    }

    /// Reject configurations with missing fields.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("smtp server", &self.server),
            ("smtp username", &self.username),
            ("smtp password", &self.password),
            ("from address", &self.from),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(DomwatchError::ConfigError(format!("{} is required", name)));
            }
        }

        if self.port == 0 {
            return Err(DomwatchError::ConfigError(
                "smtp port must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Settings for a run of the domain inspector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Recipient identity passed to the notifier with every report.
    pub recipient: String,
}

impl InspectorConfig {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }
}
