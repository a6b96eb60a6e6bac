//! Tracking entries kept per media file and the summary built from them.

use crate::model::TrackingToken;
use std::path::PathBuf;

/// Something that happened to a tracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingEvent {
    /// The file was packaged to `destination`.
    Processed { destination: PathBuf },
    ProcessingFailed { cause: String },
    /// The archive could not be inflated.
    InflateFailed { reason: String },
    /// Informational event that does not change the entry.
    Note { kind: String, description: String },
}

impl TrackingEvent {
    /// Event type name: `DESTINATION`, `PROCESSING_FAILED`, `INFLATE_FAILED`,
    /// or the free-form kind of a note.
    pub fn kind(&self) -> &str {
        match self {
            TrackingEvent::Processed { .. } => "DESTINATION",
            TrackingEvent::ProcessingFailed { .. } => "PROCESSING_FAILED",
            TrackingEvent::InflateFailed { .. } => "INFLATE_FAILED",
            TrackingEvent::Note { kind, .. } => kind,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TrackingEvent::ProcessingFailed { .. } | TrackingEvent::InflateFailed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Audio { archive: Option<TrackingToken> },
    Archive { audio_files: Vec<TrackingToken>, inflated: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEntry {
    pub tracking: TrackingToken,
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub kind: EntryKind,
    pub events: Vec<TrackingEvent>,
}

impl TrackingEntry {
    pub fn audio(tracking: TrackingToken, source: PathBuf, archive: Option<TrackingToken>) -> Self {
        Self {
            tracking,
            source,
            destination: None,
            kind: EntryKind::Audio { archive },
            events: Vec::new(),
        }
    }

    pub fn archive(tracking: TrackingToken, source: PathBuf) -> Self {
        Self {
            tracking,
            source,
            destination: None,
            kind: EntryKind::Archive {
                audio_files: Vec::new(),
                inflated: true,
            },
            events: Vec::new(),
        }
    }

    /// Appends `event` and applies its effect on the entry.
    pub fn register(&mut self, event: TrackingEvent) {
        match (&event, &mut self.kind) {
            (TrackingEvent::Processed { destination }, _) => self.destination = Some(destination.clone()),
            (TrackingEvent::InflateFailed { .. }, EntryKind::Archive { inflated, .. }) => *inflated = false,
            _ => {}
        }
        self.events.push(event);
    }

    pub fn failed(&self) -> bool {
        self.events.iter().any(TrackingEvent::is_failure)
    }

    pub fn from_archive(&self) -> bool {
        matches!(self.kind, EntryKind::Audio { archive: Some(_) })
    }

    pub fn is_archive(&self) -> bool {
        matches!(self.kind, EntryKind::Archive { .. })
    }

    /// Events of one [`TrackingEvent::kind`], altering or not.
    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a TrackingEvent> + 'a {
        self.events.iter().filter(move |event| event.kind() == kind)
    }
}

/// Snapshot of every tracked entry, split by audio files and archives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingSummary {
    pub audio: Vec<TrackingEntry>,
    pub archives: Vec<TrackingEntry>,
}

impl TrackingSummary {
    pub fn audio_total(&self) -> usize {
        self.audio.len()
    }

    /// Successful audio files; `include_archived` also counts files extracted from archives.
    pub fn audio_successes(&self, include_archived: bool) -> Vec<&TrackingEntry> {
        self.audio
            .iter()
            .filter(|e| !e.failed() && (include_archived || !e.from_archive()))
            .collect()
    }

    pub fn audio_failures(&self, include_archived: bool) -> Vec<&TrackingEntry> {
        self.audio
            .iter()
            .filter(|e| e.failed() && (include_archived || !e.from_archive()))
            .collect()
    }

    pub fn archive_successes(&self) -> Vec<&TrackingEntry> {
        self.archives.iter().filter(|e| !e.failed()).collect()
    }

    pub fn archive_failures(&self) -> Vec<&TrackingEntry> {
        self.archives.iter().filter(|e| e.failed()).collect()
    }

    pub fn find(&self, tracking: &TrackingToken) -> Option<&TrackingEntry> {
        self.audio
            .iter()
            .chain(self.archives.iter())
            .find(|e| &e.tracking == tracking)
    }
}
