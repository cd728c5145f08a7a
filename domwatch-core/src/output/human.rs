use chrono::{DateTime, Utc};
use colored::Colorize;

use super::OutputFormatter;
use crate::certificate::format_rfc1123;
use crate::inspector::RunSummary;
use crate::report::{CertificateExpiration, InspectionReport, RegistrationExpiration};

const CRITICAL_DAYS: i64 = 30;
const WARNING_DAYS: i64 = 90;

pub struct HumanFormatter {
    use_colors: bool,
    now: Option<DateTime<Utc>>,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            now: None,
        }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Fix the reference time used for day counts.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.bright_cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.bright_white().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.bright_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.bright_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.bright_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        if self.use_colors {
            format!("\n{}\n{}", text.bright_blue().bold(), "─".repeat(text.len()).dimmed())
        } else {
            format!("\n{}\n{}", text, "-".repeat(text.len()))
        }
    }

    fn certificate(&self, certificate: &CertificateExpiration) -> String {
        match certificate {
            CertificateExpiration::Expires(not_after) => {
                let now = self.now.unwrap_or_else(Utc::now);
                let days = (*not_after - now).num_days();
                let text = format!("{} ({} days)", format_rfc1123(not_after), days);
                if days < CRITICAL_DAYS {
                    self.error(&text)
                } else if days < WARNING_DAYS {
                    self.warning(&text)
                } else {
                    self.value(&text)
                }
            }
            CertificateExpiration::Error => self.error(&certificate.to_string()),
        }
    }

    fn registration(&self, registration: &RegistrationExpiration) -> String {
        match registration {
            RegistrationExpiration::Date(date) => self.value(date),
            RegistrationExpiration::Unknown => self.warning(&registration.to_string()),
            RegistrationExpiration::Error => self.error(&registration.to_string()),
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &InspectionReport) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("Domain: {}", report.domain)));
        output.push(format!(
            "  {}: {}",
            self.label("Domain Expiration"),
            self.registration(&report.registration)
        ));
        output.push(format!(
            "  {}: {}",
            self.label("SSL Expiration"),
            self.certificate(&report.certificate)
        ));

        output.join("\n")
    }

    fn format_summary(&self, summary: &RunSummary) -> String {
        let mut output = Vec::new();

        for outcome in &summary.outcomes {
            output.push(self.format_report(&outcome.report));
            let delivery = match &outcome.error {
                None => self.success("delivered"),
                Some(e) => self.error(&format!("not delivered: {}", e)),
            };
            output.push(format!(
                "  {}: {} ({} ms)",
                self.label("Report"),
                delivery,
                outcome.duration_ms
            ));
        }

        output.push(self.header("Summary"));
        output.push(format!(
            "  {}: {}",
            self.label("Domains"),
            self.value(&summary.total().to_string())
        ));
        output.push(format!(
            "  {}: {}",
            self.label("Delivered"),
            self.success(&summary.delivered().to_string())
        ));
        if summary.failed() > 0 {
            output.push(format!(
                "  {}: {}",
                self.label("Failed"),
                self.error(&summary.failed().to_string())
            ));
        }
        if summary.lookup_errors() > 0 {
            output.push(format!(
                "  {}: {}",
                self.label("Lookup errors"),
                self.warning(&summary.lookup_errors().to_string())
            ));
        }

        output.join("\n")
    }
}
