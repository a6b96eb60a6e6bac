//! Messages exchanged with the [`FilePollerActor`](crate::poller_actor::FilePollerActor).

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollingMessage {
    /// Request: walk `source` and report what is found.
    StartPolling { source: PathBuf },
    AudioFileFound { path: PathBuf },
    /// An archive was found; what it holds is reported once it is inflated.
    CompressedFileFound { path: PathBuf },
    /// An audio file extracted from `archive`.
    CompressedAudioFileFound { path: PathBuf, archive: PathBuf },
    CompressedFileCouldNotBeOpened { path: PathBuf, reason: String },
    /// Sent exactly once per accepted `StartPolling`.
    FilePollingDone { source: PathBuf },
    /// A polling cycle was already running when `StartPolling` arrived.
    PollingRejected { source: PathBuf },
}
