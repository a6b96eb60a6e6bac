//! Messages exchanged with the [`Id3TagHandlerSupervisor`](crate::id3_actor::Id3TagHandlerSupervisor).

use crate::model::{MediaMetadata, TagField, TrackingToken};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataMessage {
    InspectFileMetadata {
        path: PathBuf,
        tracking: TrackingToken,
    },
    /// Every required tag is present.
    FileMetadataAvailable {
        path: PathBuf,
        metadata: MediaMetadata,
        tracking: TrackingToken,
    },
    /// The file was read but some required tags are missing.
    FileMetadataNotFullyAvailable {
        path: PathBuf,
        missing: Vec<TagField>,
        tracking: TrackingToken,
    },
    /// The file could not be read at all.
    FileMetadataCouldNotBeEvaluated {
        path: PathBuf,
        reason: String,
        tracking: TrackingToken,
    },
}
