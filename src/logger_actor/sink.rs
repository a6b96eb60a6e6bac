//! Destinations for rendered log lines.

use crate::protocol::Severity;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Where the [`LoggerActor`](super::LoggerActor) writes rendered lines.
pub trait LogSink: Send + 'static {
    fn write_line(&mut self, severity: Severity, line: &str) -> std::io::Result<()>;
}

/// Re-emits every line through `tracing` at the matching level.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write_line(&mut self, severity: Severity, line: &str) -> std::io::Result<()> {
        match severity {
            Severity::Debug => debug!("{line}"),
            Severity::Information => info!("{line}"),
            Severity::Error => error!("{line}"),
        }
        Ok(())
    }
}

/// Appends lines to a file, opened on first write.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }
}

impl LogSink for FileSink {
    fn write_line(&mut self, severity: Severity, line: &str) -> std::io::Result<()> {
        if self.file.is_none() {
            self.file = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        match &mut self.file {
            Some(file) => writeln!(file, "{severity:<5} {line}"),
            None => Ok(()),
        }
    }
}
