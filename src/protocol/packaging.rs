//! Messages exchanged with the [`FilePackagingSupervisor`](crate::packaging_actor::FilePackagingSupervisor).

use crate::model::{MediaMetadata, TrackingToken};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagingMessage {
    PerformFilePackaging {
        path: PathBuf,
        metadata: MediaMetadata,
        target_template: String,
        tracking: TrackingToken,
    },
    FilePackagingFinished {
        destination: PathBuf,
        tracking: TrackingToken,
    },
    FilePackagingFailure {
        path: PathBuf,
        reason: String,
        tracking: TrackingToken,
    },
}
