use super::OutputFormatter;
use crate::inspector::RunSummary;
use crate::report::InspectionReport;

pub struct JsonFormatter {
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    fn to_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> String {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &InspectionReport) -> String {
        self.to_json(report)
    }

    fn format_summary(&self, summary: &RunSummary) -> String {
        self.to_json(summary)
    }
}
