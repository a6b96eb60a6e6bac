//! # Organizer
//!
//! Root supervisor of a pipeline and the parent the flow conductor reports to.
//! It owns every other pipeline actor, spawned in `pre_setup`:
//!
//! | Child | Actor |
//! |-------|-------|
//! | `<id>/tracking` | [`TrackingActor`] |
//! | `<id>/pump` | [`InflatePumpActor`] |
//! | `<id>/poller` | [`FilePollerActor`] |
//! | `<id>/flow` | [`FlowConductorSupervisor`] |
//!
//! An `Organize{source}` run goes through three steps:
//!
//! 1. polling: every file and archive the poller reports gets a tracking
//!    entry; once an audio file's entry exists, a `MediaFileAvailable` goes to
//!    the conductor;
//! 2. waiting: each terminal report from the conductor is registered as an
//!    event on its entry;
//! 3. finishing: when polling is done, no entry is still being created and no
//!    token is in flight, the summary is requested from the tracking actor and
//!    sent to the requester as `OrganizeFinished`.
//!
//! Only one run is active at a time; a second `Organize` is answered with
//! `OrganizeRejected`. Tracking entries accumulate over the organizer's
//! lifetime, so the summary covers every run so far.

use crate::collaborators::Services;
use crate::config::LongtangConfig;
use crate::flow_actor::FlowConductorSupervisor;
use crate::framework::{Actor, ActorContext, ActorFault, ActorRef};
use crate::model::{TrackingEvent, TrackingSummary, TrackingToken};
use crate::poller_actor::{FilePollerActor, InflatePumpActor};
use crate::protocol::{FlowMessage, LogEvent, Message, OrganizerMessage, PollingMessage, TrackingMessage};
use crate::tracking_actor::TrackingActor;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

struct Children {
    tracking: ActorRef<Message>,
    poller: ActorRef<Message>,
    flow: ActorRef<Message>,
}

struct Run {
    source: PathBuf,
    requester: Option<ActorRef<Message>>,
    polling_done: bool,
    /// Tracking entries requested but not created yet.
    pending_entries: usize,
    in_flight: HashSet<TrackingToken>,
    summary_requested: bool,
}

impl Run {
    fn is_settled(&self) -> bool {
        self.polling_done && self.pending_entries == 0 && self.in_flight.is_empty()
    }
}

pub struct OrganizerSupervisor {
    services: Services,
    config: LongtangConfig,
    children: Option<Children>,
    run: Option<Run>,
}

impl OrganizerSupervisor {
    pub fn new(services: Services, config: LongtangConfig) -> Self {
        Self {
            services,
            config,
            children: None,
            run: None,
        }
    }

    fn children(&self) -> Result<&Children, ActorFault> {
        self.children
            .as_ref()
            .ok_or_else(|| ActorFault::failed("organizer children are not running"))
    }

    fn start(
        &mut self,
        source: PathBuf,
        requester: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        if let Some(run) = &self.run {
            info!(source = %source.display(), active = %run.source.display(), "Organize rejected");
            if let Some(requester) = &requester {
                ctx.tell(requester, OrganizerMessage::OrganizeRejected { source }.into())?;
            }
            return Ok(());
        }

        let poller = self.children()?.poller.clone();
        ctx.log(LogEvent::information(ctx.id(), source.display(), "organizing").into());
        ctx.tell(&poller, PollingMessage::StartPolling { source: source.clone() }.into())?;
        self.run = Some(Run {
            source,
            requester,
            polling_done: false,
            pending_entries: 0,
            in_flight: HashSet::new(),
            summary_requested: false,
        });
        Ok(())
    }

    fn request_entry(&mut self, request: TrackingMessage, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        let tracking = self.children()?.tracking.clone();
        if let Some(run) = &mut self.run {
            run.pending_entries += 1;
        }
        ctx.tell(&tracking, request.into())?;
        Ok(())
    }

    fn archive_entry_created(&mut self, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        if let Some(run) = &mut self.run {
            run.pending_entries = run.pending_entries.saturating_sub(1);
        }
        self.try_finish(ctx)
    }

    fn entry_created(
        &mut self,
        path: PathBuf,
        tracking: TrackingToken,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        let flow = self.children()?.flow.clone();
        if let Some(run) = &mut self.run {
            run.pending_entries = run.pending_entries.saturating_sub(1);
            run.in_flight.insert(tracking.clone());
        }
        ctx.tell(&flow, FlowMessage::MediaFileAvailable { path, tracking }.into())?;
        Ok(())
    }

    fn file_finished(
        &mut self,
        tracking: TrackingToken,
        event: TrackingEvent,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        let tracker = self.children()?.tracking.clone();
        if let Some(run) = &mut self.run {
            run.in_flight.remove(&tracking);
        }
        ctx.tell(&tracker, TrackingMessage::RegisterTrackingEvent { tracking, event }.into())?;
        self.try_finish(ctx)
    }

    fn try_finish(&mut self, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        let tracking = self.children()?.tracking.clone();
        match &mut self.run {
            Some(run) if run.is_settled() && !run.summary_requested => {
                debug!(source = %run.source.display(), "Run settled, requesting summary");
                run.summary_requested = true;
                ctx.tell(&tracking, TrackingMessage::GenerateSummary.into())?;
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self, summary: TrackingSummary, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        let Some(run) = self.run.take() else {
            return Ok(());
        };
        let successes = summary.audio_successes(true).len();
        let failures = summary.audio_failures(true).len();
        info!(source = %run.source.display(), successes, failures, "Organize finished");
        ctx.log(
            LogEvent::information(
                ctx.id(),
                run.source.display(),
                format!("finished: {successes} processed, {failures} failed"),
            )
            .into(),
        );
        if let Some(requester) = &run.requester {
            ctx.tell(requester, OrganizerMessage::OrganizeFinished { summary }.into())?;
        }
        Ok(())
    }

    fn run_active(&self) -> bool {
        self.run.is_some()
    }

    fn is_in_flight(&self, tracking: &TrackingToken) -> bool {
        self.run.as_ref().is_some_and(|run| run.in_flight.contains(tracking))
    }

    fn awaiting_summary(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.summary_requested)
    }

    fn archive_unopened(&mut self, path: &Path, reason: String, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        let tracking = self.children()?.tracking.clone();
        ctx.tell(
            &tracking,
            TrackingMessage::RegisterInflateFailure {
                path: path.to_path_buf(),
                reason,
            }
            .into(),
        )?;
        Ok(())
    }
}

#[async_trait]
impl Actor<Message> for OrganizerSupervisor {
    async fn pre_setup(&mut self, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        let id = ctx.id();
        let tracking = ctx.spawn(id.child("tracking"), TrackingActor::new()).await?;
        let pump = ctx
            .spawn(id.child("pump"), InflatePumpActor::new(self.services.inflater.clone()))
            .await?;
        let poller = ctx
            .spawn(
                id.child("poller"),
                FilePollerActor::new(self.services.walker.clone(), pump.id()),
            )
            .await?;
        let flow = ctx
            .spawn(id.child("flow"), FlowConductorSupervisor::new(&self.services, &self.config))
            .await?;
        self.children = Some(Children { tracking, poller, flow });
        Ok(())
    }

    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        match message {
            Message::Organizer(OrganizerMessage::Organize { source }) => self.start(source, sender, ctx)?,

            Message::Polling(PollingMessage::AudioFileFound { path }) if self.run_active() => {
                self.request_entry(TrackingMessage::CreateTrackingEntry { path }, ctx)?;
            }
            Message::Polling(PollingMessage::CompressedFileFound { path }) if self.run_active() => {
                self.request_entry(TrackingMessage::CreateCompressedFileTrackingEntry { path }, ctx)?;
            }
            Message::Polling(PollingMessage::CompressedAudioFileFound { path, archive }) if self.run_active() => {
                self.request_entry(TrackingMessage::CreateCompressedAudioFileTrackingEntry { path, archive }, ctx)?;
            }
            Message::Polling(PollingMessage::CompressedFileCouldNotBeOpened { path, reason }) if self.run_active() => {
                self.archive_unopened(&path, reason, ctx)?;
            }
            Message::Polling(PollingMessage::FilePollingDone { .. }) if self.run_active() => {
                if let Some(run) = &mut self.run {
                    run.polling_done = true;
                }
                self.try_finish(ctx)?;
            }
            Message::Polling(PollingMessage::PollingRejected { source }) => {
                warn!(source = %source.display(), "Poller busy");
                if let Some(run) = self.run.take() {
                    if let Some(requester) = &run.requester {
                        ctx.tell(requester, OrganizerMessage::OrganizeRejected { source }.into())?;
                    }
                }
            }

            Message::Tracking(TrackingMessage::TrackingEntryCreated { path, tracking })
            | Message::Tracking(TrackingMessage::CompressedAudioFileTrackingEntryCreated { path, tracking, .. })
                if self.run_active() =>
            {
                self.entry_created(path, tracking, ctx)?;
            }
            Message::Tracking(TrackingMessage::CompressedFileTrackingEntryCreated { path, tracking })
                if self.run_active() =>
            {
                debug!(%tracking, archive = %path.display(), "Archive tracked");
                self.archive_entry_created(ctx)?;
            }
            Message::Tracking(TrackingMessage::TrackingEventRegistered { tracking }) => {
                debug!(%tracking, "Tracking event registered");
            }
            Message::Tracking(TrackingMessage::SummaryGenerated { summary }) if self.awaiting_summary() => {
                self.finish(summary, ctx)?;
            }

            Message::Flow(FlowMessage::MediaFileHasBeenProcessed { destination, tracking })
                if self.is_in_flight(&tracking) =>
            {
                self.file_finished(tracking, TrackingEvent::Processed { destination }, ctx)?;
            }
            Message::Flow(FlowMessage::MediaFileProcessingFailed { tracking, cause }) if self.is_in_flight(&tracking) => {
                let event = TrackingEvent::ProcessingFailed {
                    cause: cause.to_string(),
                };
                self.file_finished(tracking, event, ctx)?;
            }

            other => ctx.notify_marooned_message(sender.as_ref(), other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::mock::{full_tags, MockInflater, MockPackager, MockReader, MockWalker};
    use crate::framework::{ask, ActorSystem, Probe};
    use std::sync::Arc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(3);

    fn paths(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    fn organize(source: &str) -> Message {
        OrganizerMessage::Organize {
            source: PathBuf::from(source),
        }
        .into()
    }

    fn library_services(inflater: MockInflater) -> Services {
        Services {
            walker: Arc::new(MockWalker::returning(paths(&[
                "/in/a.mp3",
                "/in/album.zip",
                "/in/b.mp3",
                "/in/broken.rar",
                "/in/readme.txt",
            ]))),
            inflater: Arc::new(inflater),
            reader: Arc::new(
                MockReader::new()
                    .with_tags("/in/a.mp3", full_tags("Popol Vuh", "Aguirre I", "Aguirre", 1))
                    .with_tags("/tmp/album/01.mp3", full_tags("Ash Ra Tempel", "Amboss", "Ash Ra Tempel", 1))
                    .failing_on("/in/b.mp3", "no tag"),
            ),
            packager: Arc::new(MockPackager::new("/lib")),
        }
    }

    fn library_inflater() -> MockInflater {
        MockInflater::new()
            .on("/in/album.zip", paths(&["/tmp/album/01.mp3"]))
            .failing_on("/in/broken.rar", "unexpected end of archive")
    }

    #[tokio::test]
    async fn test_spawns_pipeline() {
        let system = ActorSystem::<Message>::new("test");
        system
            .spawn(
                "organizer",
                OrganizerSupervisor::new(library_services(library_inflater()), LongtangConfig::default()),
            )
            .await
            .unwrap();

        for id in ["organizer/tracking", "organizer/pump", "organizer/poller", "organizer/flow"] {
            assert!(system.get_by_id(id).is_some(), "{id} not running");
        }
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_organize_reports_summary() {
        let system = ActorSystem::<Message>::new("test");
        let organizer = system
            .spawn(
                "organizer",
                OrganizerSupervisor::new(library_services(library_inflater()), LongtangConfig::default()),
            )
            .await
            .unwrap();

        let reply = ask(&system, &organizer, organize("/in"), WAIT).await.unwrap();
        let summary = match reply {
            Message::Organizer(OrganizerMessage::OrganizeFinished { summary }) => summary,
            other => panic!("unexpected {other:?}"),
        };

        assert_eq!(summary.audio_total(), 3);
        assert_eq!(summary.audio_successes(true).len(), 2);
        assert_eq!(summary.audio_successes(false).len(), 1);
        assert_eq!(summary.audio_failures(true).len(), 1);
        assert_eq!(summary.archive_successes().len(), 1);
        assert_eq!(summary.archive_failures().len(), 1);

        let a = summary
            .audio
            .iter()
            .find(|e| e.source == PathBuf::from("/in/a.mp3"))
            .unwrap();
        assert_eq!(
            a.destination,
            Some(PathBuf::from("/lib/Popol Vuh/Aguirre/01 - Aguirre I.mp3"))
        );
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_source_finishes_with_empty_summary() {
        let system = ActorSystem::<Message>::new("test");
        let services = Services {
            walker: Arc::new(MockWalker::returning(Vec::new())),
            ..library_services(MockInflater::new())
        };
        let organizer = system
            .spawn("organizer", OrganizerSupervisor::new(services, LongtangConfig::default()))
            .await
            .unwrap();

        let reply = ask(&system, &organizer, organize("/empty"), WAIT).await.unwrap();
        assert_eq!(
            reply,
            OrganizerMessage::OrganizeFinished {
                summary: TrackingSummary::default()
            }
            .into()
        );
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_second_organize_is_rejected_while_running() {
        let inflater = library_inflater().delayed("/in/album.zip", Duration::from_millis(300));
        let system = ActorSystem::<Message>::new("test");
        let organizer = system
            .spawn(
                "organizer",
                OrganizerSupervisor::new(library_services(inflater), LongtangConfig::default()),
            )
            .await
            .unwrap();
        let mut first = Probe::spawn(&system, "first").await.unwrap();
        let mut second = Probe::spawn(&system, "second").await.unwrap();

        organizer.tell(organize("/in"), Some(&first.actor_ref())).unwrap();
        organizer.tell(organize("/elsewhere"), Some(&second.actor_ref())).unwrap();

        assert_eq!(
            second.expect_message(WAIT).await,
            OrganizerMessage::OrganizeRejected {
                source: PathBuf::from("/elsewhere")
            }
            .into()
        );
        assert!(matches!(
            first.expect_message(WAIT).await,
            Message::Organizer(OrganizerMessage::OrganizeFinished { .. })
        ));
        first.expect_no_message(Duration::from_millis(200)).await;
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_archive_without_audio_counts_as_success() {
        let system = ActorSystem::<Message>::new("test");
        let services = Services {
            walker: Arc::new(MockWalker::returning(paths(&["/in/a.mp3", "/in/scans.zip"]))),
            ..library_services(MockInflater::new().on("/in/scans.zip", paths(&["/tmp/scans/front.jpg"])))
        };
        let organizer = system
            .spawn("organizer", OrganizerSupervisor::new(services, LongtangConfig::default()))
            .await
            .unwrap();

        let reply = ask(&system, &organizer, organize("/in"), WAIT).await.unwrap();
        let summary = match reply {
            Message::Organizer(OrganizerMessage::OrganizeFinished { summary }) => summary,
            other => panic!("unexpected {other:?}"),
        };

        assert_eq!(summary.audio_total(), 1);
        assert_eq!(summary.archive_successes().len(), 1);
        assert!(summary.archive_failures().is_empty());
        assert_eq!(summary.archives[0].source, PathBuf::from("/in/scans.zip"));
        system.shutdown().await.unwrap();
    }
}
