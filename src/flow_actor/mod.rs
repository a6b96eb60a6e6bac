//! # Flow Conductor
//!
//! Supervisor sequencing the per-file pipeline: tag inspection first, then
//! packaging, then a single report to its parent.
//!
//! ```text
//! MediaFileAvailable ──► AwaitingMetadata ──FileMetadataAvailable──► AwaitingPackaging
//!                              │                                          │
//!                  NotFullyAvailable / CouldNotBeEvaluated     Finished / Failure
//!                              ▼                                          ▼
//!                   MediaFileProcessingFailed          MediaFileHasBeenProcessed / ...Failed
//! ```
//!
//! The stage of every in-flight [`TrackingToken`] lives in a map owned by the
//! conductor. An entry is removed the moment its terminal report is sent, so a
//! late or duplicated answer for that token finds no stage and is marooned
//! instead of producing a second report. Tokens never share state: one file
//! failing has no effect on any other.
//!
//! Children, spawned in `pre_setup`:
//! - `<id>/id3` - [`Id3TagHandlerSupervisor`]
//! - `<id>/packaging` - [`FilePackagingSupervisor`]

use crate::collaborators::Services;
use crate::config::LongtangConfig;
use crate::framework::{Actor, ActorContext, ActorFault, ActorRef};
use crate::id3_actor::Id3TagHandlerSupervisor;
use crate::model::{MediaMetadata, TrackingToken};
use crate::packaging_actor::FilePackagingSupervisor;
use crate::protocol::{FailureCause, FlowMessage, LogEvent, Message, MetadataMessage, PackagingMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitingMetadata,
    AwaitingPackaging,
}

struct Children {
    id3: ActorRef<Message>,
    packaging: ActorRef<Message>,
}

pub struct FlowConductorSupervisor {
    id3: Option<Id3TagHandlerSupervisor>,
    packaging: Option<FilePackagingSupervisor>,
    target_template: String,
    children: Option<Children>,
    stages: HashMap<TrackingToken, Stage>,
}

impl FlowConductorSupervisor {
    pub fn new(services: &Services, config: &LongtangConfig) -> Self {
        Self {
            id3: Some(Id3TagHandlerSupervisor::new(services.reader.clone(), config.id3.clone())),
            packaging: Some(FilePackagingSupervisor::new(services.packager.clone())),
            target_template: config.packaging.template.clone(),
            children: None,
            stages: HashMap::new(),
        }
    }

    /// Number of tokens with an outstanding request.
    pub fn in_flight(&self) -> usize {
        self.stages.len()
    }

    fn stage(&self, tracking: &TrackingToken) -> Option<Stage> {
        self.stages.get(tracking).copied()
    }

    fn children(&self) -> Result<&Children, ActorFault> {
        self.children
            .as_ref()
            .ok_or_else(|| ActorFault::failed("flow conductor children are not running"))
    }

    fn media_file_available(
        &mut self,
        path: PathBuf,
        tracking: TrackingToken,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        let id3 = self.children()?.id3.clone();
        self.stages.insert(tracking.clone(), Stage::AwaitingMetadata);
        let request = MetadataMessage::InspectFileMetadata {
            path,
            tracking: tracking.clone(),
        };
        if let Err(e) = ctx.tell(&id3, request.into()) {
            self.fail(tracking, FailureCause::Internal { reason: e.to_string() }, ctx);
        }
        Ok(())
    }

    fn metadata_available(
        &mut self,
        path: PathBuf,
        metadata: MediaMetadata,
        tracking: TrackingToken,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        let packaging = self.children()?.packaging.clone();
        self.stages.insert(tracking.clone(), Stage::AwaitingPackaging);
        let request = PackagingMessage::PerformFilePackaging {
            path,
            metadata,
            target_template: self.target_template.clone(),
            tracking: tracking.clone(),
        };
        if let Err(e) = ctx.tell(&packaging, request.into()) {
            self.fail(tracking, FailureCause::Internal { reason: e.to_string() }, ctx);
        }
        Ok(())
    }

    fn succeed(&mut self, destination: PathBuf, tracking: TrackingToken, ctx: &ActorContext<Message>) {
        self.stages.remove(&tracking);
        ctx.log(LogEvent::information(ctx.id(), &tracking, format!("processed into {}", destination.display())).into());
        self.report(FlowMessage::MediaFileHasBeenProcessed { destination, tracking }, ctx);
    }

    fn fail(&mut self, tracking: TrackingToken, cause: FailureCause, ctx: &ActorContext<Message>) {
        self.stages.remove(&tracking);
        ctx.log(LogEvent::error(ctx.id(), &tracking, cause.to_string()).into());
        self.report(FlowMessage::MediaFileProcessingFailed { tracking, cause }, ctx);
    }

    fn report(&self, report: FlowMessage, ctx: &ActorContext<Message>) {
        debug!(in_flight = self.stages.len(), ?report, "Terminal report");
        if let Err(e) = ctx.tell_parent(report.into()) {
            warn!(error = %e, "Flow report dropped");
        }
    }
}

#[async_trait]
impl Actor<Message> for FlowConductorSupervisor {
    async fn pre_setup(&mut self, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        let (Some(id3), Some(packaging)) = (self.id3.take(), self.packaging.take()) else {
            return Err(ActorFault::failed("flow conductor set up twice"));
        };
        let id3 = ctx.spawn(ctx.id().child("id3"), id3).await?;
        let packaging = ctx.spawn(ctx.id().child("packaging"), packaging).await?;
        self.children = Some(Children { id3, packaging });
        Ok(())
    }

    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        use MetadataMessage::*;
        use PackagingMessage::*;

        match message {
            Message::Flow(FlowMessage::MediaFileAvailable { path, tracking }) if self.stage(&tracking).is_none() => {
                self.media_file_available(path, tracking, ctx)?;
            }
            Message::Metadata(FileMetadataAvailable {
                path,
                metadata,
                tracking,
            }) if self.stage(&tracking) == Some(Stage::AwaitingMetadata) => {
                self.metadata_available(path, metadata, tracking, ctx)?;
            }
            Message::Metadata(FileMetadataNotFullyAvailable { missing, tracking, .. })
                if self.stage(&tracking) == Some(Stage::AwaitingMetadata) =>
            {
                self.fail(tracking, FailureCause::MetadataIncomplete { missing }, ctx);
            }
            Message::Metadata(FileMetadataCouldNotBeEvaluated { reason, tracking, .. })
                if self.stage(&tracking) == Some(Stage::AwaitingMetadata) =>
            {
                self.fail(tracking, FailureCause::MetadataUnreadable { reason }, ctx);
            }
            Message::Packaging(FilePackagingFinished { destination, tracking })
                if self.stage(&tracking) == Some(Stage::AwaitingPackaging) =>
            {
                self.succeed(destination, tracking, ctx);
            }
            Message::Packaging(FilePackagingFailure { reason, tracking, .. })
                if self.stage(&tracking) == Some(Stage::AwaitingPackaging) =>
            {
                self.fail(tracking, FailureCause::PackagingFailed { reason }, ctx);
            }
            other => ctx.notify_marooned_message(sender.as_ref(), other),
        }
        Ok(())
    }

    async fn post_stop(&mut self, ctx: &ActorContext<Message>) {
        if !self.stages.is_empty() {
            warn!(actor = %ctx.id(), in_flight = self.stages.len(), "Stopped with files in flight");
        }
    }
}
