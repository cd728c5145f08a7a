//! Report delivery
//!
//! The inspector hands every report to a [`Notifier`] exactly once. Delivery
//! errors are returned to the caller, which decides whether they matter.

mod console;
mod email;

use async_trait::async_trait;

use crate::error::Result;

pub use console::ConsoleNotifier;
pub use email::EmailNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to `recipient`.
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
