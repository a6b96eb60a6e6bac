//! # Tracking Actor
//!
//! Keeps one [`TrackingEntry`] per discovered file and hands out the
//! [`TrackingToken`]s that correlate a file through the pipeline.
//!
//! Archives get an entry of their own. Audio files extracted from an archive
//! point to that entry as their parent, and the archive entry lists them. The
//! archive entry is created the first time anything refers to the archive, so
//! inner files, inflate failures and explicit archive entries all share it.

use crate::framework::{Actor, ActorContext, ActorFault, ActorRef};
use crate::model::{EntryKind, TrackingEntry, TrackingEvent, TrackingSummary, TrackingToken};
use crate::protocol::{Message, TrackingMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Default)]
pub struct TrackingActor {
    entries: HashMap<TrackingToken, TrackingEntry>,
    /// Creation order, for a stable summary.
    order: Vec<TrackingToken>,
    archives: HashMap<PathBuf, TrackingToken>,
}

impl TrackingActor {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, entry: TrackingEntry) -> TrackingToken {
        let tracking = entry.tracking.clone();
        debug!(%tracking, source = %entry.source.display(), "Tracking entry created");
        self.order.push(tracking.clone());
        self.entries.insert(tracking.clone(), entry);
        tracking
    }

    fn archive_entry(&mut self, path: &Path) -> TrackingToken {
        if let Some(tracking) = self.archives.get(path) {
            return tracking.clone();
        }
        let tracking = self.insert(TrackingEntry::archive(TrackingToken::new(), path.to_path_buf()));
        self.archives.insert(path.to_path_buf(), tracking.clone());
        tracking
    }

    fn compressed_audio_entry(&mut self, path: PathBuf, archive: &Path) -> (TrackingToken, TrackingToken) {
        let parent = self.archive_entry(archive);
        let tracking = self.insert(TrackingEntry::audio(TrackingToken::new(), path, Some(parent.clone())));
        if let Some(TrackingEntry {
            kind: EntryKind::Archive { audio_files, .. },
            ..
        }) = self.entries.get_mut(&parent)
        {
            audio_files.push(tracking.clone());
        }
        (tracking, parent)
    }

    fn register(&mut self, tracking: TrackingToken, event: TrackingEvent) -> TrackingMessage {
        match self.entries.get_mut(&tracking) {
            Some(entry) => {
                entry.register(event);
                TrackingMessage::TrackingEventRegistered { tracking }
            }
            None => TrackingMessage::TrackingEntryNotFound { tracking },
        }
    }

    fn summary(&self) -> TrackingSummary {
        let mut summary = TrackingSummary::default();
        for entry in self.order.iter().filter_map(|t| self.entries.get(t)) {
            if entry.is_archive() {
                summary.archives.push(entry.clone());
            } else {
                summary.audio.push(entry.clone());
            }
        }
        summary
    }

    fn handle(&mut self, message: TrackingMessage) -> Result<TrackingMessage, TrackingMessage> {
        let reply = match message {
            TrackingMessage::CreateTrackingEntry { path } => {
                let tracking = self.insert(TrackingEntry::audio(TrackingToken::new(), path.clone(), None));
                TrackingMessage::TrackingEntryCreated { path, tracking }
            }
            TrackingMessage::CreateCompressedFileTrackingEntry { path } => {
                let tracking = self.archive_entry(&path);
                TrackingMessage::CompressedFileTrackingEntryCreated { path, tracking }
            }
            TrackingMessage::CreateCompressedAudioFileTrackingEntry { path, archive } => {
                let (tracking, parent) = self.compressed_audio_entry(path.clone(), &archive);
                TrackingMessage::CompressedAudioFileTrackingEntryCreated { path, tracking, parent }
            }
            TrackingMessage::RegisterInflateFailure { path, reason } => {
                let tracking = self.archive_entry(&path);
                self.register(tracking, TrackingEvent::InflateFailed { reason })
            }
            TrackingMessage::RegisterTrackingEvent { tracking, event } => self.register(tracking, event),
            TrackingMessage::LookupTrackingEntry { tracking } => match self.entries.get(&tracking) {
                Some(entry) => TrackingMessage::TrackingEntryFound { entry: entry.clone() },
                None => TrackingMessage::TrackingEntryNotFound { tracking },
            },
            TrackingMessage::GenerateSummary => TrackingMessage::SummaryGenerated {
                summary: self.summary(),
            },
            other => return Err(other),
        };
        Ok(reply)
    }
}

#[async_trait]
impl Actor<Message> for TrackingActor {
    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        let request = match message {
            Message::Tracking(request) => request,
            other => {
                ctx.notify_marooned_message(sender.as_ref(), other);
                return Ok(());
            }
        };
        match self.handle(request) {
            Ok(reply) => {
                if let Some(sender) = &sender {
                    ctx.tell(sender, reply.into())?;
                }
            }
            Err(unhandled) => ctx.notify_marooned_message(sender.as_ref(), unhandled.into()),
        }
        Ok(())
    }
}
