//! Messages exchanged with the [`FlowConductorSupervisor`](crate::flow_actor::FlowConductorSupervisor).

use crate::model::{TagField, TrackingToken};
use std::fmt::Display;
use std::path::PathBuf;

/// Why a media file's pipeline ended in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    MetadataUnreadable { reason: String },
    MetadataIncomplete { missing: Vec<TagField> },
    PackagingFailed { reason: String },
    Internal { reason: String },
}

impl Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::MetadataUnreadable { reason } => write!(f, "metadata could not be read: {reason}"),
            FailureCause::MetadataIncomplete { missing } => {
                let fields: Vec<String> = missing.iter().map(ToString::to_string).collect();
                write!(f, "metadata incomplete, missing {}", fields.join(", "))
            }
            FailureCause::PackagingFailed { reason } => write!(f, "packaging failed: {reason}"),
            FailureCause::Internal { reason } => write!(f, "internal failure: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowMessage {
    MediaFileAvailable {
        path: PathBuf,
        tracking: TrackingToken,
    },
    MediaFileHasBeenProcessed {
        destination: PathBuf,
        tracking: TrackingToken,
    },
    MediaFileProcessingFailed {
        tracking: TrackingToken,
        cause: FailureCause,
    },
}
