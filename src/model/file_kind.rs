//! Classification of discovered files by extension.

use std::path::Path;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3"];
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Audio,
    Archive,
    Other,
}

impl FileKind {
    /// Classifies `path` by its (case-insensitive) extension.
    pub fn of(path: &Path) -> Self {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return FileKind::Other;
        };
        let extension = extension.to_ascii_lowercase();
        if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            FileKind::Audio
        } else if ARCHIVE_EXTENSIONS.contains(&extension.as_str()) {
            FileKind::Archive
        } else {
            FileKind::Other
        }
    }
}
