pub mod certificate;
pub mod config;
pub mod domains;
pub mod error;
pub mod inspector;
pub mod notify;
pub mod output;
pub mod report;
pub mod validation;
pub mod whois;

pub use error::{DomwatchError, Result};
pub use validation::DomainName;

pub use certificate::{CertificateProbe, TlsProber};
pub use config::{InspectorConfig, SmtpConfig, SmtpSecurity};
pub use domains::{load_domains, parse_domains};
pub use inspector::{DomainInspector, InspectionOutcome, ProgressCallback, RunSummary};
pub use notify::{ConsoleNotifier, EmailNotifier, Notifier};
pub use report::{CertificateExpiration, InspectionReport, RegistrationExpiration};
pub use whois::{extract_expiration, WhoisClient, WhoisSource};

pub use output::{OutputFormat, OutputFormatter};
