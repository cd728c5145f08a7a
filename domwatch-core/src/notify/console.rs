use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;

use super::Notifier;
use crate::error::{DomwatchError, Result};

/// Writes reports to a terminal or any other writer instead of sending them.
pub struct ConsoleNotifier {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| DomwatchError::NotificationError("Console writer poisoned".to_string()))?;

        writeln!(out, "To: {}\nSubject: {}\n\n{}", recipient, subject, body)
            .and_then(|_| out.flush())
            .map_err(|e| DomwatchError::NotificationError(format!("Failed to write report: {}", e)))
    }

    fn name(&self) -> &str {
        "console"
    }
}
