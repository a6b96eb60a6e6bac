//! # File Packaging
//!
//! Supervisor answering `PerformFilePackaging` with `FilePackagingFinished`
//! (carrying the destination) or `FilePackagingFailure`. Like the tag handler,
//! it spawns a single worker child (`<id>/packager`) in `pre_setup` and forwards
//! requests to it with the original sender.

pub mod packager;

pub use packager::FilePackagerActor;

use crate::collaborators::FilePackager;
use crate::framework::{Actor, ActorContext, ActorFault, ActorId, ActorRef};
use crate::protocol::{Message, PackagingMessage};
use async_trait::async_trait;
use std::sync::Arc;

pub struct FilePackagingSupervisor {
    packager: Arc<dyn FilePackager>,
    child: Option<ActorRef<Message>>,
}

impl FilePackagingSupervisor {
    pub fn new(packager: Arc<dyn FilePackager>) -> Self {
        Self { packager, child: None }
    }

    pub fn packager_id(supervisor: &ActorId) -> ActorId {
        supervisor.child("packager")
    }
}

#[async_trait]
impl Actor<Message> for FilePackagingSupervisor {
    async fn pre_setup(&mut self, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        let child = FilePackagerActor::new(Arc::clone(&self.packager));
        self.child = Some(ctx.spawn(Self::packager_id(ctx.id()), child).await?);
        Ok(())
    }

    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        match (message, &self.child) {
            (message @ Message::Packaging(PackagingMessage::PerformFilePackaging { .. }), Some(child)) => {
                ctx.forward(child, message, sender.as_ref())?;
            }
            (message, _) => ctx.notify_marooned_message(sender.as_ref(), message),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::mock::MockPackager;
    use crate::collaborators::{CopyPackager, DEFAULT_TEMPLATE};
    use crate::framework::{ActorSystem, Probe};
    use crate::model::{MediaMetadata, TrackingToken};
    use crate::protocol::LogEvent;
    use std::path::PathBuf;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    fn metadata() -> MediaMetadata {
        MediaMetadata {
            artist: "Neu!".into(),
            title: "Hallogallo".into(),
            album: "Neu!".into(),
            track_number: 1,
        }
    }

    fn package_request(path: &std::path::Path, tracking: &str) -> Message {
        PackagingMessage::PerformFilePackaging {
            path: path.to_path_buf(),
            metadata: metadata(),
            target_template: DEFAULT_TEMPLATE.to_string(),
            tracking: TrackingToken::from(tracking),
        }
        .into()
    }

    #[tokio::test]
    async fn test_packages_into_target_and_logs_destination() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let path = source.path().join("hallogallo.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let system = ActorSystem::<Message>::new("test");
        let mut logger = Probe::spawn(&system, "logger").await.unwrap();
        system.set_log_sink("logger");
        let packaging = system
            .spawn(
                "packaging",
                FilePackagingSupervisor::new(Arc::new(CopyPackager::new(target.path(), false))),
            )
            .await
            .unwrap();
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        packaging.tell(package_request(&path, "t1"), Some(&requester.actor_ref())).unwrap();

        let expected = target.path().join("Neu!/Neu!/01 - Hallogallo.mp3");
        assert_eq!(
            requester.expect_message(WAIT).await,
            PackagingMessage::FilePackagingFinished {
                destination: expected.clone(),
                tracking: TrackingToken::from("t1"),
            }
            .into()
        );
        assert!(expected.exists());
        match logger.expect_message(WAIT).await {
            Message::Logging(event @ LogEvent::FileDebug(_)) => {
                assert_eq!(event.record().origin, ActorId::from("packaging/packager"));
            }
            other => panic!("unexpected {other:?}"),
        }
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_collision_is_reported_as_failure() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let path = source.path().join("hallogallo.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let system = ActorSystem::<Message>::new("test");
        let packaging = system
            .spawn(
                "packaging",
                FilePackagingSupervisor::new(Arc::new(CopyPackager::new(target.path(), false))),
            )
            .await
            .unwrap();
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        packaging.tell(package_request(&path, "t1"), Some(&requester.actor_ref())).unwrap();
        requester.expect_message(WAIT).await;
        packaging.tell(package_request(&path, "t2"), Some(&requester.actor_ref())).unwrap();

        match requester.expect_message(WAIT).await {
            Message::Packaging(PackagingMessage::FilePackagingFailure { tracking, reason, .. }) => {
                assert_eq!(tracking, TrackingToken::from("t2"));
                assert!(reason.contains("already exists"));
            }
            other => panic!("unexpected {other:?}"),
        }
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_replies_come_from_packager_child() {
        let packager = Arc::new(MockPackager::new("/library"));
        let system = ActorSystem::<Message>::new("test");
        let packaging = system
            .spawn("packaging", FilePackagingSupervisor::new(packager.clone()))
            .await
            .unwrap();
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        packaging
            .tell(package_request(&PathBuf::from("/in/a.mp3"), "t1"), Some(&requester.actor_ref()))
            .unwrap();

        let reply = requester.recv_within(WAIT).await.unwrap();
        assert_eq!(reply.sender, Some(ActorId::from("packaging/packager")));
        assert_eq!(packager.requests().len(), 1);
        system.shutdown().await.unwrap();
    }
}
