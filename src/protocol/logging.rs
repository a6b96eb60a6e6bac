//! Log events consumed by the [`LoggerActor`](crate::logger_actor::LoggerActor).

use crate::framework::ActorId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Severity of a log event. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Information,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Debug => "DEBUG",
            Severity::Information => "INFO",
            Severity::Error => "ERROR",
        };
        f.pad(label)
    }
}

/// Payload shared by every log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Actor that emitted the event.
    pub origin: ActorId,
    /// Path or identifier the event is about.
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    FileInformation(LogRecord),
    FileError(LogRecord),
    FileDebug(LogRecord),
}

impl LogEvent {
    pub fn information(origin: &ActorId, subject: impl Display, text: impl Into<String>) -> Self {
        LogEvent::FileInformation(LogRecord::new(origin, subject, text))
    }

    pub fn error(origin: &ActorId, subject: impl Display, text: impl Into<String>) -> Self {
        LogEvent::FileError(LogRecord::new(origin, subject, text))
    }

    pub fn debug(origin: &ActorId, subject: impl Display, text: impl Into<String>) -> Self {
        LogEvent::FileDebug(LogRecord::new(origin, subject, text))
    }

    pub fn severity(&self) -> Severity {
        match self {
            LogEvent::FileInformation(_) => Severity::Information,
            LogEvent::FileError(_) => Severity::Error,
            LogEvent::FileDebug(_) => Severity::Debug,
        }
    }

    pub fn record(&self) -> &LogRecord {
        match self {
            LogEvent::FileInformation(record) | LogEvent::FileError(record) | LogEvent::FileDebug(record) => record,
        }
    }
}

impl LogRecord {
    fn new(origin: &ActorId, subject: impl Display, text: impl Into<String>) -> Self {
        Self {
            origin: origin.clone(),
            subject: subject.to_string(),
            text: text.into(),
        }
    }
}
