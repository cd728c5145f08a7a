use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, instrument};

use super::Notifier;
use crate::config::{SmtpConfig, SmtpSecurity};
use crate::error::{DomwatchError, Result};

/// Sends reports as plain-text e-mail through an authenticated SMTP relay.
pub struct EmailNotifier {
    config: SmtpConfig,
    from: Mailbox,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("server", &self.config.server)
            .field("port", &self.config.port)
            .field("from", &self.config.from)
            .finish_non_exhaustive()
    }
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        config.validate()?;
        let from = parse_mailbox(&config.from)?;
        Ok(Self { config, from })
    }

    fn build_message(&self, recipient: &str, subject: &str, body: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(recipient)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DomwatchError::NotificationError(format!("Failed to build message: {}", e)))
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());

        let builder = match self.config.security {
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&self.config.server),
            SmtpSecurity::Tls => SmtpTransport::relay(&self.config.server),
        }
        .map_err(|e| DomwatchError::NotificationError(format!("Invalid SMTP relay: {}", e)))?;

        Ok(builder
            .credentials(credentials)
            .port(self.config.port)
            .build())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    #[instrument(skip(self, body))]
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let message = self.build_message(recipient, subject, body)?;
        let transport = self.transport()?;

        // lettre's SMTP transport blocks
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| DomwatchError::NotificationError(format!("Send task failed: {}", e)))?
            .map_err(|e| DomwatchError::NotificationError(format!("Failed to send email: {}", e)))?;

        debug!("Report e-mailed");
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e| DomwatchError::ConfigError(format!("Invalid e-mail address {:?}: {}", address, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> SmtpConfig {
        SmtpConfig::new("smtp.example.com", "user", "pass", "Domain Watch <alerts@example.com>")
    }

    #[test]
    fn test_email_notifier_new() {
        assert!(EmailNotifier::new(create_test_config()).is_ok());
    }

    #[test]
    fn test_email_notifier_rejects_bad_sender() {
        let mut config = create_test_config();
        config.from = "not an address".to_string();
        assert!(matches!(
            EmailNotifier::new(config),
            Err(DomwatchError::ConfigError(_))
        ));
    }

    #[test]
    fn test_build_message() {
        let notifier = EmailNotifier::new(create_test_config()).unwrap();
        let message = notifier
            .build_message(
                "admin@example.com",
                "Domain and SSL Check Results: example.com (2026-01-01)",
                "Domain: example.com\nDomain Expiration: Unknown\nSSL Expiration: Error\n",
            )
            .unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("To: admin@example.com"));
        assert!(formatted.contains("Subject: Domain and SSL Check Results: example.com (2026-01-01)"));
        assert!(formatted.contains("Domain Expiration: Unknown"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let notifier = EmailNotifier::new(create_test_config()).unwrap();
        assert!(notifier.build_message("nobody", "subject", "body").is_err());
    }

    #[test]
    fn test_transport_builds_for_both_modes() {
        let notifier = EmailNotifier::new(create_test_config()).unwrap();
        assert!(notifier.transport().is_ok());

        let config = create_test_config().with_security(SmtpSecurity::Tls).with_port(465);
        let notifier = EmailNotifier::new(config).unwrap();
        assert!(notifier.transport().is_ok());
    }

    #[test]
    fn test_name() {
        let notifier = EmailNotifier::new(create_test_config()).unwrap();
        assert_eq!(notifier.name(), "email");
    }
}
