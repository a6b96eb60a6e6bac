//! Archive inflation.

use crate::collaborators::walker::{FsWalker, SourceWalker};
use crate::collaborators::CollaboratorError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;
use uuid::Uuid;

/// Extracts an archive and returns the paths of every extracted file.
#[async_trait]
pub trait ArchiveInflater: Send + Sync {
    async fn inflate(&self, archive: &Path) -> Result<Vec<PathBuf>, CollaboratorError>;
}

/// Inflates through an external extractor (`7z` by default).
///
/// Every call extracts into a fresh `<workdir>/<archive stem>-<uuid>`, so
/// archives sharing a name never see each other's files.
#[derive(Debug, Clone)]
pub struct CommandInflater {
    program: String,
    workdir: PathBuf,
}

impl CommandInflater {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }

    fn output_dir(&self, archive: &Path) -> PathBuf {
        let stem = archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        self.workdir.join(format!("{stem}-{}", Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl ArchiveInflater for CommandInflater {
    async fn inflate(&self, archive: &Path) -> Result<Vec<PathBuf>, CollaboratorError> {
        let output_dir = self.output_dir(archive);
        match tokio::fs::remove_dir_all(&output_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CollaboratorError::io(&output_dir, e)),
        }
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| CollaboratorError::io(&output_dir, e))?;

        debug!(program = %self.program, archive = %archive.display(), "Inflating");
        let status = Command::new(&self.program)
            .arg("x")
            .arg("-y")
            .arg(format!("-o{}", output_dir.display()))
            .arg(archive)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await
            .map_err(|e| CollaboratorError::io(archive, e))?;

        if !status.success() {
            return Err(CollaboratorError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
                path: archive.to_path_buf(),
            });
        }
        FsWalker.walk(&output_dir).await
    }
}
