//! # ID3 Tag Handler
//!
//! Supervisor answering `InspectFileMetadata` with exactly one of:
//!
//! | Reply | When |
//! |-------|------|
//! | `FileMetadataAvailable` | artist, title, album and track number are all present |
//! | `FileMetadataNotFullyAvailable` | the file was read but a required tag is missing |
//! | `FileMetadataCouldNotBeEvaluated` | the file could not be read |
//!
//! The supervisor spawns its reader child (`<id>/reader`) in `pre_setup` and
//! forwards every request to it with the original sender, so replies go
//! straight back to the requester. Configured tag overrides replace or fill
//! tags before classification; they never add a fourth outcome.

pub mod reader;

pub use reader::Id3TagReaderActor;

use crate::collaborators::MetadataReader;
use crate::config::Id3Config;
use crate::framework::{Actor, ActorContext, ActorFault, ActorId, ActorRef};
use crate::protocol::{Message, MetadataMessage};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct Id3TagHandlerSupervisor {
    reader: Arc<dyn MetadataReader>,
    config: Id3Config,
    child: Option<ActorRef<Message>>,
}

impl Id3TagHandlerSupervisor {
    pub fn new(reader: Arc<dyn MetadataReader>, config: Id3Config) -> Self {
        Self {
            reader,
            config,
            child: None,
        }
    }

    pub fn reader_id(supervisor: &ActorId) -> ActorId {
        supervisor.child("reader")
    }
}

#[async_trait]
impl Actor<Message> for Id3TagHandlerSupervisor {
    async fn pre_setup(&mut self, ctx: &ActorContext<Message>) -> Result<(), ActorFault> {
        if self.config.offline {
            info!(actor = %ctx.id(), "Offline mode, tags are taken from files only");
        }
        if !self.config.overrides.is_empty() {
            info!(actor = %ctx.id(), overrides = ?self.config.overrides, "Tag overrides active");
        }
        let child = Id3TagReaderActor::new(Arc::clone(&self.reader), self.config.overrides.clone());
        self.child = Some(ctx.spawn(Self::reader_id(ctx.id()), child).await?);
        Ok(())
    }

    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        match (message, &self.child) {
            (message @ Message::Metadata(MetadataMessage::InspectFileMetadata { .. }), Some(child)) => {
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
    use crate::collaborators::mock::{full_tags, MockReader};
    use crate::framework::{ActorSystem, Probe};
    use crate::model::{RawTags, TagField, TagOverrides, TrackingToken};
    use std::path::PathBuf;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    fn inspect_request(path: &str, tracking: &str) -> Message {
        MetadataMessage::InspectFileMetadata {
            path: PathBuf::from(path),
            tracking: TrackingToken::from(tracking),
        }
        .into()
    }

    async fn handler(reader: MockReader, config: Id3Config) -> (ActorSystem<Message>, ActorRef<Message>) {
        let system = ActorSystem::<Message>::new("test");
        let handler = system
            .spawn("id3", Id3TagHandlerSupervisor::new(Arc::new(reader), config))
            .await
            .unwrap();
        (system, handler)
    }

    #[tokio::test]
    async fn test_spawns_reader_child() {
        let (system, _handler) = handler(MockReader::new(), Id3Config::default()).await;
        assert!(system.get_by_id("id3/reader").is_some());
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_three_way_classification() {
        let reader = MockReader::new()
            .with_tags("/in/full.mp3", full_tags("Can", "Vitamin C", "Ege Bamyasi", 5))
            .with_tags(
                "/in/partial.mp3",
                RawTags {
                    title: Some("Untitled".into()),
                    ..RawTags::default()
                },
            )
            .failing_on("/in/corrupt.mp3", "bad frame");
        let (system, handler) = handler(reader, Id3Config::default()).await;
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        handler.tell(inspect_request("/in/full.mp3", "t1"), Some(&requester.actor_ref())).unwrap();
        let available = requester.recv_within(WAIT).await.unwrap();
        assert_eq!(available.sender, Some(ActorId::from("id3/reader")));
        assert!(matches!(
            available.message,
            Message::Metadata(MetadataMessage::FileMetadataAvailable { ref metadata, .. }) if metadata.track_number == 5
        ));

        handler.tell(inspect_request("/in/partial.mp3", "t2"), Some(&requester.actor_ref())).unwrap();
        assert_eq!(
            requester.expect_message(WAIT).await,
            MetadataMessage::FileMetadataNotFullyAvailable {
                path: PathBuf::from("/in/partial.mp3"),
                missing: vec![TagField::Artist, TagField::Album, TagField::TrackNumber],
                tracking: TrackingToken::from("t2"),
            }
            .into()
        );

        handler.tell(inspect_request("/in/corrupt.mp3", "t3"), Some(&requester.actor_ref())).unwrap();
        assert!(matches!(
            requester.expect_message(WAIT).await,
            Message::Metadata(MetadataMessage::FileMetadataCouldNotBeEvaluated { ref tracking, .. })
                if tracking == &TrackingToken::from("t3")
        ));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_overrides_complete_partial_tags() {
        let reader = MockReader::new().with_tags(
            "/in/partial.mp3",
            RawTags {
                album: None,
                ..full_tags("Can", "Vitamin C", "", 5)
            },
        );
        let config = Id3Config {
            offline: true,
            overrides: TagOverrides {
                album: Some("Singles".into()),
                ..TagOverrides::default()
            },
        };
        let (system, handler) = handler(reader, config).await;
        let mut requester = Probe::spawn(&system, "requester").await.unwrap();

        handler.tell(inspect_request("/in/partial.mp3", "t1"), Some(&requester.actor_ref())).unwrap();

        match requester.expect_message(WAIT).await {
            Message::Metadata(MetadataMessage::FileMetadataAvailable { metadata, .. }) => {
                assert_eq!(metadata.album, "Singles");
                assert_eq!(metadata.artist, "Can");
            }
            other => panic!("unexpected {other:?}"),
        }
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unrelated_messages_are_marooned() {
        let (system, handler) = handler(MockReader::new(), Id3Config::default()).await;

        handler
            .tell(
                crate::protocol::PollingMessage::AudioFileFound {
                    path: PathBuf::from("/in/a.mp3"),
                }
                .into(),
                None,
            )
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(system.marooned_count(), 1);
        assert_eq!(system.marooned_messages()[0].receiver, ActorId::from("id3"));
        system.shutdown().await.unwrap();
    }
}
