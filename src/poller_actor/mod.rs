//! # File Poller
//!
//! Walks a source directory and reports what it finds to whoever sent
//! `StartPolling` (the requester):
//!
//! - every audio file right away, as `AudioFileFound`;
//! - every archive right away, as `CompressedFileFound`;
//! - every archive after the [`InflatePumpActor`] answers, as one
//!   `CompressedAudioFileFound` per extracted audio file, or
//!   `CompressedFileCouldNotBeOpened`.
//!
//! ## Join
//!
//! Archives inflate concurrently and answer in any order. The poller keeps the
//! set of archive paths it is still waiting for and re-checks, after the walk
//! and after every single removal, whether the walk is finished and the set is
//! empty. Only then is `FilePollingDone` sent, and the cycle state is taken
//! out at that moment so it is sent exactly once.
//!
//! A walk error ends the cycle early with `FilePollingDone`. A `StartPolling`
//! arriving while a cycle is active is answered with `PollingRejected`.

pub mod pump;

pub use pump::InflatePumpActor;

use crate::collaborators::SourceWalker;
use crate::framework::{Actor, ActorContext, ActorFault, ActorId, ActorRef};
use crate::model::FileKind;
use crate::protocol::{InflateMessage, LogEvent, Message, PollingMessage};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

struct PollingCycle {
    source: PathBuf,
    requester: Option<ActorRef<Message>>,
    pending: HashSet<PathBuf>,
    walk_finished: bool,
}

impl PollingCycle {
    fn notify(&self, message: PollingMessage, ctx: &ActorContext<Message>) {
        if let Some(requester) = &self.requester {
            if let Err(e) = ctx.tell(requester, message.into()) {
                warn!(error = %e, "Polling requester is gone");
            }
        }
    }
}

pub struct FilePollerActor {
    walker: Arc<dyn SourceWalker>,
    pump: ActorId,
    cycle: Option<PollingCycle>,
}

impl FilePollerActor {
    /// `pump` is the id of the [`InflatePumpActor`] archives are sent to.
    pub fn new(walker: Arc<dyn SourceWalker>, pump: impl Into<ActorId>) -> Self {
        Self {
            walker,
            pump: pump.into(),
            cycle: None,
        }
    }

    async fn start_polling(
        &mut self,
        source: PathBuf,
        requester: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) {
        if let Some(active) = &self.cycle {
            info!(source = %source.display(), active = %active.source.display(), "Polling already in progress");
            if let Some(requester) = &requester {
                let _ = ctx.tell(requester, PollingMessage::PollingRejected { source }.into());
            }
            return;
        }

        let mut cycle = PollingCycle {
            source: source.clone(),
            requester,
            pending: HashSet::new(),
            walk_finished: false,
        };

        match self.walker.walk(&source).await {
            Ok(files) => {
                debug!(source = %source.display(), files = files.len(), "Walk finished");
                for path in files {
                    self.classify(path, &mut cycle, ctx);
                }
            }
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Polling aborted");
                ctx.log(LogEvent::error(ctx.id(), source.display(), format!("polling aborted: {e}")).into());
                cycle.pending.clear();
            }
        }

        cycle.walk_finished = true;
        self.cycle = Some(cycle);
        self.try_complete(ctx);
    }

    fn classify(&self, path: PathBuf, cycle: &mut PollingCycle, ctx: &ActorContext<Message>) {
        match FileKind::of(&path) {
            FileKind::Audio => {
                ctx.log(LogEvent::debug(ctx.id(), path.display(), "audio file found").into());
                cycle.notify(PollingMessage::AudioFileFound { path }, ctx);
            }
            FileKind::Archive => {
                cycle.notify(PollingMessage::CompressedFileFound { path: path.clone() }, ctx);
                let sent = match ctx.get_by_id(self.pump.as_str()) {
                    Some(pump) => ctx
                        .tell(&pump, InflateMessage::InflateFile { path: path.clone() }.into())
                        .map_err(|e| e.to_string()),
                    None => Err(format!("inflate pump {} is not running", self.pump)),
                };
                match sent {
                    Ok(()) => {
                        cycle.pending.insert(path);
                    }
                    Err(reason) => cycle.notify(PollingMessage::CompressedFileCouldNotBeOpened { path, reason }, ctx),
                }
            }
            FileKind::Other => debug!(path = %path.display(), "Skipping"),
        }
    }

    /// Removes `archive` from the pending set; `false` if it was not pending.
    fn resolve(&mut self, archive: &Path) -> bool {
        self.cycle
            .as_mut()
            .map(|cycle| cycle.pending.remove(archive))
            .unwrap_or(false)
    }

    fn try_complete(&mut self, ctx: &ActorContext<Message>) {
        let finished = self
            .cycle
            .as_ref()
            .is_some_and(|cycle| cycle.walk_finished && cycle.pending.is_empty());
        if !finished {
            return;
        }
        if let Some(cycle) = self.cycle.take() {
            info!(source = %cycle.source.display(), "Polling done");
            cycle.notify(
                PollingMessage::FilePollingDone {
                    source: cycle.source.clone(),
                },
                ctx,
            );
        }
    }

    fn inflate_done(&mut self, archive: PathBuf, extracted: Vec<PathBuf>, ctx: &ActorContext<Message>) {
        if let Some(cycle) = &self.cycle {
            for path in extracted.into_iter().filter(|p| FileKind::of(p) == FileKind::Audio) {
                cycle.notify(
                    PollingMessage::CompressedAudioFileFound {
                        path,
                        archive: archive.clone(),
                    },
                    ctx,
                );
            }
        }
        self.resolve(&archive);
        self.try_complete(ctx);
    }

    fn inflate_failed(&mut self, archive: PathBuf, reason: String, ctx: &ActorContext<Message>) {
        ctx.log(LogEvent::error(ctx.id(), archive.display(), format!("could not be opened: {reason}")).into());
        if let Some(cycle) = &self.cycle {
            cycle.notify(PollingMessage::CompressedFileCouldNotBeOpened { path: archive.clone(), reason }, ctx);
        }
        self.resolve(&archive);
        self.try_complete(ctx);
    }

    fn is_pending(&self, archive: &Path) -> bool {
        self.cycle
            .as_ref()
            .is_some_and(|cycle| cycle.pending.contains(archive))
    }
}

#[async_trait]
impl Actor<Message> for FilePollerActor {
    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        match message {
            Message::Polling(PollingMessage::StartPolling { source }) => {
                self.start_polling(source, sender, ctx).await;
            }
            Message::Inflate(InflateMessage::InflateFileDone { path, extracted }) if self.is_pending(&path) => {
                self.inflate_done(path, extracted, ctx);
            }
            Message::Inflate(InflateMessage::InflateFileFailed { path, reason }) if self.is_pending(&path) => {
                self.inflate_failed(path, reason, ctx);
            }
            // Answers for archives this cycle is not waiting on are stale.
            other => ctx.notify_marooned_message(sender.as_ref(), other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::mock::{MockInflater, MockWalker};
    use crate::framework::{ActorSystem, Probe};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);
    const QUIET: Duration = Duration::from_millis(150);

    fn paths(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    fn start(source: &str) -> Message {
        PollingMessage::StartPolling {
            source: PathBuf::from(source),
        }
        .into()
    }

    fn done(source: &str) -> Message {
        PollingMessage::FilePollingDone {
            source: PathBuf::from(source),
        }
        .into()
    }

    /// Poller wired to a probe standing in for the pump, so the test decides
    /// when and in which order inflate answers arrive.
    async fn poller_with_probe_pump(
        files: &[&str],
    ) -> (ActorSystem<Message>, ActorRef<Message>, Probe<Message>, Probe<Message>) {
        let system = ActorSystem::<Message>::new("test");
        let pump = Probe::spawn(&system, "pump").await.unwrap();
        let requester = Probe::spawn(&system, "requester").await.unwrap();
        let poller = system
            .spawn(
                "poller",
                FilePollerActor::new(Arc::new(MockWalker::returning(paths(files))), "pump"),
            )
            .await
            .unwrap();
        (system, poller, pump, requester)
    }

    fn archive_found(archive: &str) -> Message {
        PollingMessage::CompressedFileFound {
            path: PathBuf::from(archive),
        }
        .into()
    }

    fn inflated(archive: &str, extracted: &[&str]) -> Message {
        InflateMessage::InflateFileDone {
            path: PathBuf::from(archive),
            extracted: paths(extracted),
        }
        .into()
    }

    fn inflate_failed(archive: &str) -> Message {
        InflateMessage::InflateFileFailed {
            path: PathBuf::from(archive),
            reason: "corrupt".to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_two_audio_files_and_one_archive() {
        let system = ActorSystem::<Message>::new("test");
        let inflater = MockInflater::new().on("/dir/album.zip", paths(&["/tmp/album/01.mp3", "/tmp/album/cover.jpg"]));
        system
            .spawn("pump", InflatePumpActor::new(Arc::new(inflater)))
            .await
            .unwrap();
        let walker = MockWalker::returning(paths(&["/dir/a.mp3", "/dir/album.zip", "/dir/b.mp3", "/dir/notes.txt"]));
        let poller = system
            .spawn("poller", FilePollerActor::new(Arc::new(walker), "pump"))
            .await
            .unwrap();
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();

        let messages = requester.expect_messages(5, WAIT).await;
        assert_eq!(
            messages,
            vec![
                PollingMessage::AudioFileFound {
                    path: PathBuf::from("/dir/a.mp3")
                }
                .into(),
                archive_found("/dir/album.zip"),
                PollingMessage::AudioFileFound {
                    path: PathBuf::from("/dir/b.mp3")
                }
                .into(),
                PollingMessage::CompressedAudioFileFound {
                    path: PathBuf::from("/tmp/album/01.mp3"),
                    archive: PathBuf::from("/dir/album.zip"),
                }
                .into(),
                done("/dir"),
            ]
        );
        requester.expect_no_message(QUIET).await;
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_archives_completes_after_walk() {
        let (system, poller, mut pump, mut requester) = poller_with_probe_pump(&["/dir/a.mp3"]).await;

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();

        requester.expect_message(WAIT).await;
        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        pump.expect_no_message(QUIET).await;
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_source_completes_once() {
        let (system, poller, _pump, mut requester) = poller_with_probe_pump(&[]).await;

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();

        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        requester.expect_no_message(QUIET).await;
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_join_waits_for_every_archive_in_any_order() {
        let archives = ["/dir/1.zip", "/dir/2.rar", "/dir/3.7z", "/dir/4.zip"];
        let (system, poller, mut pump, mut requester) = poller_with_probe_pump(&archives).await;

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();
        let found: Vec<Message> = archives.iter().map(|a| archive_found(a)).collect();
        assert_eq!(requester.expect_messages(archives.len(), WAIT).await, found);
        for archive in archives {
            assert_eq!(
                pump.expect_message(WAIT).await,
                InflateMessage::InflateFile {
                    path: PathBuf::from(archive)
                }
                .into()
            );
        }

        // Answer out of order, mixing successes and failures.
        let answers = [
            inflated("/dir/3.7z", &["/tmp/3/a.mp3"]),
            inflate_failed("/dir/1.zip"),
            inflated("/dir/4.zip", &[]),
        ];
        for answer in answers {
            poller.tell(answer, Some(&pump.actor_ref())).unwrap();
        }
        let before_last = requester.expect_messages(2, WAIT).await;
        assert!(!before_last.contains(&done("/dir")));
        requester.expect_no_message(QUIET).await;

        poller
            .tell(inflated("/dir/2.rar", &["/tmp/2/b.mp3"]), Some(&pump.actor_ref()))
            .unwrap();
        assert_eq!(
            requester.expect_message(WAIT).await,
            PollingMessage::CompressedAudioFileFound {
                path: PathBuf::from("/tmp/2/b.mp3"),
                archive: PathBuf::from("/dir/2.rar"),
            }
            .into()
        );
        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        requester.expect_no_message(QUIET).await;
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_answers_do_not_complete_twice() {
        let (system, poller, mut pump, mut requester) = poller_with_probe_pump(&["/dir/1.zip"]).await;

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();
        pump.expect_message(WAIT).await;

        poller.tell(inflated("/dir/1.zip", &[]), Some(&pump.actor_ref())).unwrap();
        poller.tell(inflate_failed("/dir/1.zip"), Some(&pump.actor_ref())).unwrap();

        assert_eq!(requester.expect_message(WAIT).await, archive_found("/dir/1.zip"));
        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        requester.expect_no_message(QUIET).await;
        assert_eq!(system.marooned_count(), 1);
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_archive_is_reported() {
        let (system, poller, mut pump, mut requester) = poller_with_probe_pump(&["/dir/1.zip"]).await;

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();
        pump.expect_message(WAIT).await;
        poller.tell(inflate_failed("/dir/1.zip"), Some(&pump.actor_ref())).unwrap();

        assert_eq!(requester.expect_message(WAIT).await, archive_found("/dir/1.zip"));
        assert_eq!(
            requester.expect_message(WAIT).await,
            PollingMessage::CompressedFileCouldNotBeOpened {
                path: PathBuf::from("/dir/1.zip"),
                reason: "corrupt".to_string(),
            }
            .into()
        );
        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_walk_error_still_completes() {
        let system = ActorSystem::<Message>::new("test");
        let poller = system
            .spawn(
                "poller",
                FilePollerActor::new(Arc::new(MockWalker::failing("permission denied")), "pump"),
            )
            .await
            .unwrap();
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();
        let mut sink = Probe::spawn(&system, "logger").await.unwrap();
        system.set_log_sink("logger");

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();

        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        match sink.expect_message(WAIT).await {
            Message::Logging(event) => assert!(event.record().text.contains("permission denied")),
            other => panic!("unexpected {other:?}"),
        }
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_pump_reports_archive_unopened() {
        let system = ActorSystem::<Message>::new("test");
        let poller = system
            .spawn(
                "poller",
                FilePollerActor::new(Arc::new(MockWalker::returning(paths(&["/dir/1.zip"]))), "no-pump"),
            )
            .await
            .unwrap();
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();

        assert_eq!(requester.expect_message(WAIT).await, archive_found("/dir/1.zip"));
        assert!(matches!(
            requester.expect_message(WAIT).await,
            Message::Polling(PollingMessage::CompressedFileCouldNotBeOpened { .. })
        ));
        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_second_start_is_rejected_while_active() {
        let (system, poller, mut pump, mut requester) = poller_with_probe_pump(&["/dir/1.zip"]).await;
        let mut other = Probe::spawn(&system, "other").await.unwrap();

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();
        pump.expect_message(WAIT).await;
        poller.tell(start("/elsewhere"), Some(&other.actor_ref())).unwrap();

        assert_eq!(
            other.expect_message(WAIT).await,
            PollingMessage::PollingRejected {
                source: PathBuf::from("/elsewhere")
            }
            .into()
        );

        poller.tell(inflated("/dir/1.zip", &[]), Some(&pump.actor_ref())).unwrap();
        assert_eq!(requester.expect_message(WAIT).await, archive_found("/dir/1.zip"));
        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));

        // A new cycle is accepted once the previous one is done.
        poller.tell(start("/dir"), Some(&other.actor_ref())).unwrap();
        pump.expect_message(WAIT).await;
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_crashing_inflater_still_completes() {
        let system = ActorSystem::<Message>::new("test");
        let inflater = MockInflater::new().panicking_on("/dir/a.zip");
        system
            .spawn("pump", InflatePumpActor::new(Arc::new(inflater)))
            .await
            .unwrap();
        let poller = system
            .spawn(
                "poller",
                FilePollerActor::new(Arc::new(MockWalker::returning(paths(&["/dir/a.zip"]))), "pump"),
            )
            .await
            .unwrap();
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        poller.tell(start("/dir"), Some(&requester.actor_ref())).unwrap();

        assert_eq!(requester.expect_message(WAIT).await, archive_found("/dir/a.zip"));
        match requester.expect_message(WAIT).await {
            Message::Polling(PollingMessage::CompressedFileCouldNotBeOpened { path, reason }) => {
                assert_eq!(path, PathBuf::from("/dir/a.zip"));
                assert!(reason.contains("inflater crashed"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(requester.expect_message(WAIT).await, done("/dir"));
        system.shutdown().await.unwrap();
    }
}
