//! Inflate pump: answers `InflateFile` through an [`ArchiveInflater`].

use crate::collaborators::ArchiveInflater;
use crate::framework::{Actor, ActorContext, ActorFault, ActorRef};
use crate::protocol::{InflateMessage, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Inflates every archive on its own task, so several archives are in flight
/// at once and their answers arrive in completion order.
pub struct InflatePumpActor {
    inflater: Arc<dyn ArchiveInflater>,
}

impl InflatePumpActor {
    pub fn new(inflater: Arc<dyn ArchiveInflater>) -> Self {
        Self { inflater }
    }
}

#[async_trait]
impl Actor<Message> for InflatePumpActor {
    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        match (message, sender) {
            (Message::Inflate(InflateMessage::InflateFile { path }), Some(requester)) => {
                let request = Message::from(InflateMessage::InflateFile { path: path.clone() });
                let inflater = Arc::clone(&self.inflater);
                ctx.reply_from_task(request, requester, async move {
                    let reply = match inflater.inflate(&path).await {
                        Ok(extracted) => {
                            debug!(archive = %path.display(), files = extracted.len(), "Inflated");
                            InflateMessage::InflateFileDone { path, extracted }
                        }
                        Err(e) => InflateMessage::InflateFileFailed {
                            path,
                            reason: e.to_string(),
                        },
                    };
                    Message::from(reply)
                });
            }
            (message, sender) => ctx.notify_marooned_message(sender.as_ref(), message),
        }
        Ok(())
    }
}
