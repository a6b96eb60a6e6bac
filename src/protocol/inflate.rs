//! Messages exchanged with the archive inflation pump.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InflateMessage {
    InflateFile { path: PathBuf },
    InflateFileDone { path: PathBuf, extracted: Vec<PathBuf> },
    InflateFileFailed { path: PathBuf, reason: String },
}
