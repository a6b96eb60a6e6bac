//! # Scripted Collaborators
//!
//! In-memory stand-ins for the services in this module, for tests that want to
//! drive the actors without touching archives or real audio files. Each mock is
//! configured up front with builder methods and records what it was asked:
//!
//! ```ignore
//! let inflater = Arc::new(
//!     MockInflater::new()
//!         .on("/in/album.zip", vec!["/tmp/album/01.mp3".into()])
//!         .failing_on("/in/broken.rar", "corrupt")
//!         .delayed("/in/album.zip", Duration::from_millis(50)),
//! );
//! // hand `inflater.clone()` to the pump, then:
//! assert_eq!(inflater.calls().len(), 2);
//! ```
//!
//! Anything a mock was not told about fails with [`CollaboratorError::NotFound`].
//! `panicking_on` makes a mock panic for one path, the way a buggy service would.

use crate::collaborators::{
    render_template, ArchiveInflater, CollaboratorError, FilePackager, MetadataReader, PackagingRequest,
    SourceWalker,
};
use crate::model::RawTags;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn unreadable(path: &Path, reason: &str) -> CollaboratorError {
    CollaboratorError::Unreadable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Complete tags, the common case in tests.
pub fn full_tags(artist: &str, title: &str, album: &str, track_number: u32) -> RawTags {
    RawTags {
        artist: Some(artist.to_string()),
        title: Some(title.to_string()),
        album: Some(album.to_string()),
        track_number: Some(track_number),
    }
}

/// Returns a fixed listing, or fails every walk.
#[derive(Debug, Clone, Default)]
pub struct MockWalker {
    files: Vec<PathBuf>,
    failure: Option<String>,
}

impl MockWalker {
    pub fn returning(files: Vec<PathBuf>) -> Self {
        Self { files, failure: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            files: Vec::new(),
            failure: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl SourceWalker for MockWalker {
    async fn walk(&self, source: &Path) -> Result<Vec<PathBuf>, CollaboratorError> {
        match &self.failure {
            Some(reason) => Err(unreadable(source, reason)),
            None => Ok(self.files.clone()),
        }
    }
}

#[derive(Default)]
pub struct MockInflater {
    outcomes: HashMap<PathBuf, Result<Vec<PathBuf>, String>>,
    delays: HashMap<PathBuf, Duration>,
    panics: HashSet<PathBuf>,
    calls: Mutex<Vec<PathBuf>>,
}

impl MockInflater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, archive: impl Into<PathBuf>, extracted: Vec<PathBuf>) -> Self {
        self.outcomes.insert(archive.into(), Ok(extracted));
        self
    }

    pub fn failing_on(mut self, archive: impl Into<PathBuf>, reason: &str) -> Self {
        self.outcomes.insert(archive.into(), Err(reason.to_string()));
        self
    }

    pub fn panicking_on(mut self, archive: impl Into<PathBuf>) -> Self {
        self.panics.insert(archive.into());
        self
    }

    /// Holds the answer for `archive` back by `delay`.
    pub fn delayed(mut self, archive: impl Into<PathBuf>, delay: Duration) -> Self {
        self.delays.insert(archive.into(), delay);
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ArchiveInflater for MockInflater {
    async fn inflate(&self, archive: &Path) -> Result<Vec<PathBuf>, CollaboratorError> {
        self.calls.lock().push(archive.to_path_buf());
        if let Some(delay) = self.delays.get(archive) {
            tokio::time::sleep(*delay).await;
        }
        if self.panics.contains(archive) {
            panic!("inflater crashed on {}", archive.display());
        }
        match self.outcomes.get(archive) {
            Some(Ok(extracted)) => Ok(extracted.clone()),
            Some(Err(reason)) => Err(unreadable(archive, reason)),
            None => Err(CollaboratorError::NotFound(archive.to_path_buf())),
        }
    }
}

#[derive(Default)]
pub struct MockReader {
    outcomes: HashMap<PathBuf, Result<RawTags, String>>,
    delays: HashMap<PathBuf, Duration>,
    panics: HashSet<PathBuf>,
    calls: Mutex<Vec<PathBuf>>,
}

impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, path: impl Into<PathBuf>, tags: RawTags) -> Self {
        self.outcomes.insert(path.into(), Ok(tags));
        self
    }

    pub fn failing_on(mut self, path: impl Into<PathBuf>, reason: &str) -> Self {
        self.outcomes.insert(path.into(), Err(reason.to_string()));
        self
    }

    pub fn panicking_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.panics.insert(path.into());
        self
    }

    pub fn delayed(mut self, path: impl Into<PathBuf>, delay: Duration) -> Self {
        self.delays.insert(path.into(), delay);
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MetadataReader for MockReader {
    async fn read(&self, path: &Path) -> Result<RawTags, CollaboratorError> {
        self.calls.lock().push(path.to_path_buf());
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        if self.panics.contains(path) {
            panic!("reader crashed on {}", path.display());
        }
        match self.outcomes.get(path) {
            Some(Ok(tags)) => Ok(tags.clone()),
            Some(Err(reason)) => Err(unreadable(path, reason)),
            None => Err(CollaboratorError::NotFound(path.to_path_buf())),
        }
    }
}

/// Renders destinations under `target` without copying anything.
pub struct MockPackager {
    target: PathBuf,
    failures: HashMap<PathBuf, String>,
    panics: HashSet<PathBuf>,
    packaged: Mutex<Vec<PackagingRequest>>,
}

impl MockPackager {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            failures: HashMap::new(),
            panics: HashSet::new(),
            packaged: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, path: impl Into<PathBuf>, reason: &str) -> Self {
        self.failures.insert(path.into(), reason.to_string());
        self
    }

    pub fn panicking_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.panics.insert(path.into());
        self
    }

    /// Every request received, failed ones included.
    pub fn requests(&self) -> Vec<PackagingRequest> {
        self.packaged.lock().clone()
    }
}

#[async_trait]
impl FilePackager for MockPackager {
    async fn package(&self, request: &PackagingRequest) -> Result<PathBuf, CollaboratorError> {
        self.packaged.lock().push(request.clone());
        if self.panics.contains(&request.path) {
            panic!("packager crashed on {}", request.path.display());
        }
        if let Some(reason) = self.failures.get(&request.path) {
            return Err(unreadable(&request.path, reason));
        }
        let extension = request
            .path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative = render_template(&request.target_template, &request.metadata, &extension)?;
        Ok(self.target.join(relative))
    }
}
