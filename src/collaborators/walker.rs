//! Directory walking.

use crate::collaborators::CollaboratorError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists every regular file below a source.
#[async_trait]
pub trait SourceWalker: Send + Sync {
    async fn walk(&self, source: &Path) -> Result<Vec<PathBuf>, CollaboratorError>;
}

/// Recursive filesystem walk, sorted by path for a stable discovery order.
#[derive(Debug, Clone, Default)]
pub struct FsWalker;

#[async_trait]
impl SourceWalker for FsWalker {
    async fn walk(&self, source: &Path) -> Result<Vec<PathBuf>, CollaboratorError> {
        let source = source.to_path_buf();
        tokio::task::spawn_blocking(move || walk_blocking(&source))
            .await
            .map_err(|e| CollaboratorError::Unreadable {
                path: PathBuf::new(),
                reason: e.to_string(),
            })?
    }
}

fn walk_blocking(source: &Path) -> Result<Vec<PathBuf>, CollaboratorError> {
    if !source.is_dir() {
        return Err(CollaboratorError::NotFound(source.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| CollaboratorError::Unreadable {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf()),
            reason: e.to_string(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_walk_lists_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("one.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("a/b/two.zip"), b"x").unwrap();

        let files = FsWalker.walk(dir.path()).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&dir.path().join("one.mp3")));
        assert!(files.contains(&dir.path().join("a/b/two.zip")));
    }

    #[tokio::test]
    async fn test_walk_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = FsWalker.walk(&dir.path().join("missing")).await;
        assert!(matches!(result, Err(CollaboratorError::NotFound(_))));
    }
}
