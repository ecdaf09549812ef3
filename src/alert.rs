//! Operator alerts for failed sends

use tracing::warn;

/// Sink for operator-facing failure notifications. Implementations must not fail.
pub trait Notifier {
    fn notify(&self, subject: &str, message: &str);
}

/// Records alerts in the log. Stand-in until a real email/webhook sender exists.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    destination: String,
}

impl LogNotifier {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, subject: &str, message: &str) {
        warn!(to = %self.destination, "[ALERT] {} - {}", subject, message);
    }
}
