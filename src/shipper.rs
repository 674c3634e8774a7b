//! Log shipping: record shape and the producer-side handle.
//!
//! Remote shipping is fire-and-forget: producers build a [`LogRecord`] and
//! hand it to the uplink queue. Local console logging stays on `tracing`;
//! the shipper only covers the remote ingester.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::uplink::UplinkHandle;

/// One log record in the remote ingester's wire format.
///
/// Serialized as a single JSON object per line: `timestamp` (ISO-8601),
/// `level`, `message` (string or JSON structure), `label` (originating
/// module).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Time the record was produced.
    pub timestamp: DateTime<Utc>,
    /// Severity level (`"debug"`, `"info"`, `"warn"`, `"error"`).
    pub level: String,
    /// Message body; a plain string or a JSON-serialized structure.
    pub message: serde_json::Value,
    /// Originating module.
    pub label: String,
}

impl LogRecord {
    /// Builds a record stamped with the current time.
    #[must_use]
    pub fn new(level: &str, label: &str, message: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            level: level.to_string(),
            message,
            label: label.to_string(),
        }
    }
}

/// Producer-side handle for shipping records to the remote ingester.
///
/// Cloneable; every method is non-blocking and infallible. Records queue
/// in memory while the log uplink is down and flush in order on reconnect.
#[derive(Debug, Clone)]
pub struct LogShipper {
    uplink: UplinkHandle<LogRecord>,
    label: String,
}

impl LogShipper {
    /// Creates a shipper feeding the given log uplink.
    #[must_use]
    pub fn new(uplink: UplinkHandle<LogRecord>, label: &str) -> Self {
        Self {
            uplink,
            label: label.to_string(),
        }
    }

    /// Returns a shipper with the same uplink but a different label,
    /// for per-module attribution.
    #[must_use]
    pub fn with_label(&self, label: &str) -> Self {
        Self {
            uplink: self.uplink.clone(),
            label: label.to_string(),
        }
    }

    /// Ships a record at the given level.
    pub fn ship(&self, level: &str, message: serde_json::Value) {
        self.uplink.enqueue(LogRecord::new(level, &self.label, message));
    }

    /// Ships a debug-level record.
    pub fn debug(&self, message: impl Into<serde_json::Value>) {
        self.ship("debug", message.into());
    }

    /// Ships an info-level record.
    pub fn info(&self, message: impl Into<serde_json::Value>) {
        self.ship("info", message.into());
    }

    /// Ships a warn-level record.
    pub fn warn(&self, message: impl Into<serde_json::Value>) {
        self.ship("warn", message.into());
    }

    /// Ships an error-level record.
    pub fn error(&self, message: impl Into<serde_json::Value>) {
        self.ship("error", message.into());
    }
}
