//! Errors reported by the external services the actors delegate to.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Not found: {0}")]
    NotFound(PathBuf),
    #[error("Unreadable {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("Target already exists: {0}")]
    TargetExists(PathBuf),
    #[error("Invalid target template {template}: {reason}")]
    InvalidTemplate { template: String, reason: String },
    #[error("{program} exited with {status} for {path}")]
    CommandFailed {
        program: String,
        status: String,
        path: PathBuf,
    },
}

impl CollaboratorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CollaboratorError::NotFound(path)
        } else {
            CollaboratorError::Io { path, source }
        }
    }
}
