//! Reads and classifies the tags of one file per request.

use crate::collaborators::MetadataReader;
use crate::framework::{Actor, ActorContext, ActorFault, ActorRef};
use crate::model::{TagOverrides, TrackingToken};
use crate::protocol::{Message, MetadataMessage};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct Id3TagReaderActor {
    reader: Arc<dyn MetadataReader>,
    overrides: Arc<TagOverrides>,
}

impl Id3TagReaderActor {
    pub fn new(reader: Arc<dyn MetadataReader>, overrides: TagOverrides) -> Self {
        Self {
            reader,
            overrides: Arc::new(overrides),
        }
    }
}

/// Three-way result: unreadable, incomplete, or available.
pub async fn inspect(
    reader: &dyn MetadataReader,
    overrides: &TagOverrides,
    path: PathBuf,
    tracking: TrackingToken,
) -> MetadataMessage {
    let tags = match reader.read(&path).await {
        Ok(tags) => tags.apply_overrides(overrides),
        Err(e) => {
            return MetadataMessage::FileMetadataCouldNotBeEvaluated {
                path,
                reason: e.to_string(),
                tracking,
            }
        }
    };
    match tags.complete() {
        Ok(metadata) => MetadataMessage::FileMetadataAvailable {
            path,
            metadata,
            tracking,
        },
        Err(missing) => MetadataMessage::FileMetadataNotFullyAvailable {
            path,
            missing,
            tracking,
        },
    }
}

#[async_trait]
impl Actor<Message> for Id3TagReaderActor {
    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        match (message, sender) {
            (Message::Metadata(MetadataMessage::InspectFileMetadata { path, tracking }), Some(requester)) => {
                let request = Message::from(MetadataMessage::InspectFileMetadata {
                    path: path.clone(),
                    tracking: tracking.clone(),
                });
                let reader = Arc::clone(&self.reader);
                let overrides = Arc::clone(&self.overrides);
                ctx.reply_from_task(request, requester, async move {
                    debug!(path = %path.display(), %tracking, "Inspecting metadata");
                    Message::from(inspect(reader.as_ref(), &overrides, path, tracking).await)
                });
            }
            (message, sender) => ctx.notify_marooned_message(sender.as_ref(), message),
        }
        Ok(())
    }
}
