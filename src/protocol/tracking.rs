//! Messages exchanged with the [`TrackingActor`](crate::tracking_actor::TrackingActor).

use crate::model::{TrackingEntry, TrackingEvent, TrackingSummary, TrackingToken};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackingMessage {
    CreateTrackingEntry {
        path: PathBuf,
    },
    TrackingEntryCreated {
        path: PathBuf,
        tracking: TrackingToken,
    },
    CreateCompressedFileTrackingEntry {
        path: PathBuf,
    },
    CompressedFileTrackingEntryCreated {
        path: PathBuf,
        tracking: TrackingToken,
    },
    /// Tracks an audio file extracted from `archive`; the archive entry is created on first use.
    CreateCompressedAudioFileTrackingEntry {
        path: PathBuf,
        archive: PathBuf,
    },
    CompressedAudioFileTrackingEntryCreated {
        path: PathBuf,
        tracking: TrackingToken,
        parent: TrackingToken,
    },
    /// Records that `path` could not be inflated, creating its archive entry if needed.
    RegisterInflateFailure {
        path: PathBuf,
        reason: String,
    },
    RegisterTrackingEvent {
        tracking: TrackingToken,
        event: TrackingEvent,
    },
    TrackingEventRegistered {
        tracking: TrackingToken,
    },
    LookupTrackingEntry {
        tracking: TrackingToken,
    },
    TrackingEntryFound {
        entry: TrackingEntry,
    },
    TrackingEntryNotFound {
        tracking: TrackingToken,
    },
    GenerateSummary,
    SummaryGenerated {
        summary: TrackingSummary,
    },
}
