//! Packaging of a tagged file into the target library.

use crate::collaborators::CollaboratorError;
use crate::model::MediaMetadata;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_TEMPLATE: &str = "{artist}/{album}/{track} - {title}.{ext}";

const COVER_NAMES: &[&str] = &["cover.jpg", "folder.jpg", "cover.png"];

/// Everything a packager needs for one file.
#[derive(Debug, Clone)]
pub struct PackagingRequest {
    pub path: PathBuf,
    pub metadata: MediaMetadata,
    pub target_template: String,
}

/// Places a file into the target library and returns its destination.
#[async_trait]
pub trait FilePackager: Send + Sync {
    async fn package(&self, request: &PackagingRequest) -> Result<PathBuf, CollaboratorError>;
}

/// Copies files under `target`, at the path rendered from the template.
///
/// With `cover_art` enabled, a cover image found next to the source file is
/// copied into the destination directory as well.
#[derive(Debug, Clone)]
pub struct CopyPackager {
    target: PathBuf,
    cover_art: bool,
}

impl CopyPackager {
    pub fn new(target: impl Into<PathBuf>, cover_art: bool) -> Self {
        Self {
            target: target.into(),
            cover_art,
        }
    }

    async fn copy_cover_art(&self, source: &Path, destination_dir: &Path) -> Result<(), CollaboratorError> {
        let Some(source_dir) = source.parent() else {
            return Ok(());
        };
        for name in COVER_NAMES {
            let cover = source_dir.join(name);
            if tokio::fs::try_exists(&cover).await.unwrap_or(false) {
                let target = destination_dir.join(name);
                if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
                    tokio::fs::copy(&cover, &target)
                        .await
                        .map_err(|e| CollaboratorError::io(&target, e))?;
                }
                break;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FilePackager for CopyPackager {
    async fn package(&self, request: &PackagingRequest) -> Result<PathBuf, CollaboratorError> {
        let extension = request
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let relative = render_template(&request.target_template, &request.metadata, &extension)?;
        let destination = self.target.join(relative);

        if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            return Err(CollaboratorError::TargetExists(destination));
        }
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CollaboratorError::io(parent, e))?;
            if self.cover_art {
                self.copy_cover_art(&request.path, parent).await?;
            }
        }
        tokio::fs::copy(&request.path, &destination)
            .await
            .map_err(|e| CollaboratorError::io(&request.path, e))?;

        debug!(source = %request.path.display(), destination = %destination.display(), "Packaged");
        Ok(destination)
    }
}

/// Renders `{artist}`, `{album}`, `{title}`, `{track}` (two digits) and `{ext}`.
pub fn render_template(template: &str, metadata: &MediaMetadata, extension: &str) -> Result<PathBuf, CollaboratorError> {
    let invalid = |reason: &str| CollaboratorError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut rendered = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| invalid("unclosed placeholder"))?;
        let value = match &after[..end] {
            "artist" => sanitize(&metadata.artist),
            "album" => sanitize(&metadata.album),
            "title" => sanitize(&metadata.title),
            "track" => format!("{:02}", metadata.track_number),
            "ext" => extension.to_string(),
            other => return Err(invalid(&format!("unknown placeholder {{{other}}}"))),
        };
        rendered.push_str(&value);
        rest = &after[end + 1..];
    }
    rendered.push_str(rest);

    let path = PathBuf::from(rendered);
    if path.is_absolute() || path.as_os_str().is_empty() {
        return Err(invalid("template must render to a relative path"));
    }
    Ok(path)
}

fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> MediaMetadata {
        MediaMetadata {
            artist: "AC/DC".into(),
            title: "Back in Black".into(),
            album: "Back in Black".into(),
            track_number: 6,
        }
    }

    #[test]
    fn test_render_default_template() {
        let path = render_template(DEFAULT_TEMPLATE, &metadata(), "mp3").unwrap();
        assert_eq!(path, PathBuf::from("AC_DC/Back in Black/06 - Back in Black.mp3"));
    }

    #[test]
    fn test_render_rejects_unknown_placeholder() {
        let result = render_template("{genre}/{title}", &metadata(), "mp3");
        assert!(matches!(result, Err(CollaboratorError::InvalidTemplate { .. })));
    }

    #[test]
    fn test_render_rejects_unclosed_placeholder() {
        assert!(render_template("{artist/{title}.mp3", &metadata(), "mp3").is_err());
    }

    #[tokio::test]
    async fn test_copy_packager_refuses_collisions() {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("song.mp3");
        std::fs::write(&source, b"audio").unwrap();
        std::fs::write(source_dir.path().join("cover.jpg"), b"jpeg").unwrap();

        let packager = CopyPackager::new(target_dir.path(), true);
        let request = PackagingRequest {
            path: source,
            metadata: metadata(),
            target_template: DEFAULT_TEMPLATE.to_string(),
        };

        let destination = packager.package(&request).await.unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), b"audio");
        assert!(destination.parent().unwrap().join("cover.jpg").exists());

        let second = packager.package(&request).await;
        assert!(matches!(second, Err(CollaboratorError::TargetExists(_))));
    }

    #[tokio::test]
    async fn test_cover_art_is_copied_next_to_destination() {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("track.MP3");
        std::fs::write(&source, b"audio").unwrap();
        std::fs::write(source_dir.path().join("folder.jpg"), b"folder").unwrap();
        let request = PackagingRequest {
            path: source,
            metadata: metadata(),
            target_template: DEFAULT_TEMPLATE.to_string(),
        };

        let destination = CopyPackager::new(target_dir.path(), true).package(&request).await.unwrap();

        assert_eq!(destination, target_dir.path().join("AC_DC/Back in Black/06 - Back in Black.mp3"));
        let album_dir = destination.parent().unwrap();
        assert_eq!(std::fs::read(album_dir.join("folder.jpg")).unwrap(), b"folder");
        assert!(!album_dir.join("cover.jpg").exists());
    }

    #[tokio::test]
    async fn test_cover_art_is_left_behind_when_disabled() {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("song.mp3");
        std::fs::write(&source, b"audio").unwrap();
        std::fs::write(source_dir.path().join("cover.jpg"), b"jpeg").unwrap();
        let request = PackagingRequest {
            path: source,
            metadata: metadata(),
            target_template: DEFAULT_TEMPLATE.to_string(),
        };

        let destination = CopyPackager::new(target_dir.path(), false).package(&request).await.unwrap();

        assert!(destination.exists());
        assert!(!destination.parent().unwrap().join("cover.jpg").exists());
    }
}
