//! Messages from the catalog builder thread to the UI loop.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use lulcview_catalog::ProductCatalog;

/// Messages sent from background threads to the main UI loop.
pub enum AppMessage {
    /// One (kind, year) pair has been attempted.
    Progress { done: usize, total: usize },
    /// The catalog is complete.
    CatalogReady {
        catalog: Arc<ProductCatalog>,
        elapsed: Duration,
    },
    /// Catalog build failed.
    Error { context: String, message: String },
    /// A log message for the console.
    Log(LogEntry),
}

/// Log level for console messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// A log entry for the console panel.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: SystemTime,
}

impl LogEntry {
    fn new(level: LogLevel, msg: impl Into<String>) -> Self {
        Self {
            level,
            message: msg.into(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, msg)
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, msg)
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, msg)
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, msg)
    }
}
