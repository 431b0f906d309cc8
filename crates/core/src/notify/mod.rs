//! Notification sink interface.
//!
//! Delivery transport (email, push, in-app) lives outside this engine;
//! callers hand completed [`Notification`]s to a fire-and-forget sink.

#[cfg(test)]
use std::sync::{Mutex, PoisonError};

use custodia_shared::types::AccountId;
use serde::{Deserialize, Serialize};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine balance-change information.
    Info,
    /// Something the account holder should look at.
    Warning,
}

impl Severity {
    /// Returns the string representation of the severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// A notification addressed to an account holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// The account the notification concerns.
    pub account_id: AccountId,
    /// Short title.
    pub title: String,
    /// Human-readable body.
    pub message: String,
    /// Severity level.
    pub severity: Severity,
}

/// Fire-and-forget notification delivery.
pub trait NotificationSink: Send + Sync {
    /// Emits a notification. Failures are the sink's problem; the caller
    /// never blocks on delivery.
    fn emit(&self, notification: Notification);
}

/// Sink that writes notifications to the tracing log.
///
/// The default sink in production until a real delivery transport is
/// plugged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, notification: Notification) {
        tracing::info!(
            account_id = %notification.account_id,
            severity = notification.severity.as_str(),
            title = %notification.title,
            "{}",
            notification.message
        );
    }
}

/// Sink that collects notifications in memory for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every notification emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
impl NotificationSink for MemorySink {
    fn emit(&self, notification: Notification) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.emit(Notification {
            account_id: AccountId::new(),
            title: "Funds received".into(),
            message: "0.001 BTC received".into(),
            severity: Severity::Info,
        });

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Funds received");
    }

    #[test]
    fn test_severity_as_str() {
        assert_eq!(Severity::Info.as_str(), "info");
        assert_eq!(Severity::Warning.as_str(), "warning");
    }
}
