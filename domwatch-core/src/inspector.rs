//! Per-domain inspection loop.
//!
//! Domains are handled strictly one after another. Each one gets a
//! certificate probe, a WHOIS query, one report and one notification attempt.
//! Failures are logged here and folded into the report as sentinel values;
//! nothing that goes wrong for one domain stops the run.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::certificate::{CertificateProbe, TlsProber};
use crate::config::InspectorConfig;
use crate::notify::Notifier;
use crate::report::{CertificateExpiration, InspectionReport, RegistrationExpiration};
use crate::validation::DomainName;
use crate::whois::{extract_expiration, WhoisClient, WhoisSource};

/// Called after each domain with (completed, total, domain).
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// What happened to one domain during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionOutcome {
    pub report: InspectionReport,
    pub delivered: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Outcomes of a completed run, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcomes: Vec<InspectionOutcome>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.delivered).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.delivered()
    }

    /// Domains whose certificate probe or WHOIS query failed.
    pub fn lookup_errors(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.report.certificate.is_error() || o.report.registration.is_error())
            .count()
    }
}

#[derive(Clone)]
pub struct DomainInspector {
    config: InspectorConfig,
    prober: Arc<dyn CertificateProbe>,
    whois: Arc<dyn WhoisSource>,
    notifier: Arc<dyn Notifier>,
}

impl DomainInspector {
    /// Inspector using the real TLS prober and WHOIS client.
    pub fn new(config: InspectorConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            prober: Arc::new(TlsProber::new()),
            whois: Arc::new(WhoisClient::new()),
            notifier,
        }
    }

    pub fn with_prober(mut self, prober: Arc<dyn CertificateProbe>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_whois(mut self, whois: Arc<dyn WhoisSource>) -> Self {
        self.whois = whois;
        self
    }

    /// Inspect a single domain. Never fails: problems become sentinels.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn inspect(&self, domain: &DomainName) -> InspectionReport {
        let certificate = self.certificate_expiration(domain).await;
        let registration = self.registration_expiration(domain).await;

        InspectionReport::new(domain.clone(), registration, certificate)
    }

    /// Inspect and notify every domain in order, then return the outcomes.
    pub async fn run(
        &self,
        domains: &[DomainName],
        progress: Option<ProgressCallback>,
    ) -> RunSummary {
        let total = domains.len();
        let mut summary = RunSummary {
            outcomes: Vec::with_capacity(total),
        };

        info!(total = total, notifier = self.notifier.name(), "Starting inspection run");

        for (index, domain) in domains.iter().enumerate() {
            let start = Instant::now();
            let report = self.inspect(domain).await;

            let error = match self
                .notifier
                .notify(&self.config.recipient, &report.subject(), &report.body())
                .await
            {
                Ok(()) => None,
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Failed to deliver report");
                    Some(e.to_string())
                }
            };

            summary.outcomes.push(InspectionOutcome {
                report,
                delivered: error.is_none(),
                error,
                duration_ms: start.elapsed().as_millis() as u64,
            });

            if let Some(progress) = &progress {
                progress(index + 1, total, domain.as_str());
            }
        }

        info!(
            total = summary.total(),
            delivered = summary.delivered(),
            failed = summary.failed(),
            lookup_errors = summary.lookup_errors(),
            "Inspection run complete"
        );

        summary
    }

    async fn certificate_expiration(&self, domain: &DomainName) -> CertificateExpiration {
        match self.prober.leaf_expiration(domain).await {
            Ok(not_after) => CertificateExpiration::Expires(not_after),
            Err(e) => {
                warn!(domain = %domain, error = %e, "Certificate probe failed");
                CertificateExpiration::Error
            }
        }
    }

    async fn registration_expiration(&self, domain: &DomainName) -> RegistrationExpiration {
        match self.whois.fetch(domain).await {
            Ok(raw) => match extract_expiration(&raw) {
                Some(date) => RegistrationExpiration::Date(date),
                None => {
                    debug!(domain = %domain, "No expiration label in WHOIS response");
                    RegistrationExpiration::Unknown
                }
            },
            Err(e) => {
                warn!(domain = %domain, error = %e, "WHOIS query failed");
                RegistrationExpiration::Error
            }
        }
    }
}
