use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::certificate::format_rfc1123;
use crate::validation::DomainName;

pub const ERROR_SENTINEL: &str = "Error";
pub const UNKNOWN_SENTINEL: &str = "Unknown";

const SUBJECT_PREFIX: &str = "Domain and SSL Check Results";

/// Expiration of a domain's leaf TLS certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "not_after", rename_all = "snake_case")]
pub enum CertificateExpiration {
    Expires(DateTime<Utc>),
    /// The probe failed; details were logged.
    Error,
}

impl CertificateExpiration {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for CertificateExpiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expires(not_after) => f.write_str(&format_rfc1123(not_after)),
            Self::Error => f.write_str(ERROR_SENTINEL),
        }
    }
}

/// Expiration of a domain's registration as found in WHOIS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum RegistrationExpiration {
    /// Date text copied verbatim from the WHOIS response.
    Date(String),
    /// No known expiration label in the response.
    Unknown,
    /// The WHOIS query failed; details were logged.
    Error,
}

impl RegistrationExpiration {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for RegistrationExpiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => f.write_str(date),
            Self::Unknown => f.write_str(UNKNOWN_SENTINEL),
            Self::Error => f.write_str(ERROR_SENTINEL),
        }
    }
}

/// Result of inspecting one domain. Built once per domain per run and handed
/// straight to the notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionReport {
    pub domain: DomainName,
    pub registration: RegistrationExpiration,
    pub certificate: CertificateExpiration,
    pub inspected_at: DateTime<Utc>,
}

impl InspectionReport {
    pub fn new(
        domain: DomainName,
        registration: RegistrationExpiration,
        certificate: CertificateExpiration,
    ) -> Self {
        Self {
            domain,
            registration,
            certificate,
            inspected_at: Utc::now(),
        }
    }

    pub fn with_inspected_at(mut self, inspected_at: DateTime<Utc>) -> Self {
        self.inspected_at = inspected_at;
        self
    }

    pub fn subject(&self) -> String {
        format!(
            "{}: {} ({})",
            SUBJECT_PREFIX,
            self.domain,
            self.inspected_at.format("%Y-%m-%d")
        )
    }

    pub fn body(&self) -> String {
        format!(
            "Domain: {}\nDomain Expiration: {}\nSSL Expiration: {}\n",
            self.domain, self.registration, self.certificate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(registration: RegistrationExpiration, certificate: CertificateExpiration) -> InspectionReport {
        InspectionReport::new(DomainName::new("example.com").unwrap(), registration, certificate)
            .with_inspected_at(Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap())
    }

    #[test]
    fn test_body_layout() {
        let not_after = Utc.with_ymd_and_hms(2030, 1, 2, 15, 4, 5).unwrap();
        let report = report(
            RegistrationExpiration::Date("2030-01-01T00:00:00Z".to_string()),
            CertificateExpiration::Expires(not_after),
        );

        assert_eq!(
            report.body(),
            "Domain: example.com\n\
             Domain Expiration: 2030-01-01T00:00:00Z\n\
             SSL Expiration: Wed, 02 Jan 2030 15:04:05 UTC\n"
        );
    }

    #[test]
    fn test_body_with_sentinels() {
        let body = report(RegistrationExpiration::Unknown, CertificateExpiration::Error).body();
        assert!(body.contains("Domain Expiration: Unknown\n"));
        assert!(body.contains("SSL Expiration: Error\n"));

        let body = report(RegistrationExpiration::Error, CertificateExpiration::Error).body();
        assert!(body.contains("Domain Expiration: Error\n"));
    }

    #[test]
    fn test_subject_contains_domain_and_date() {
        let subject = report(RegistrationExpiration::Unknown, CertificateExpiration::Error).subject();
        assert_eq!(subject, "Domain and SSL Check Results: example.com (2026-03-14)");
    }

    #[test]
    fn test_report_serializes_tagged() {
        let json = serde_json::to_value(report(
            RegistrationExpiration::Date("12-Dec-2025".to_string()),
            CertificateExpiration::Error,
        ))
        .unwrap();

        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["registration"]["status"], "date");
        assert_eq!(json["registration"]["date"], "12-Dec-2025");
        assert_eq!(json["certificate"]["status"], "error");
    }
}
