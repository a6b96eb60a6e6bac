//! Packages one file per request through a [`FilePackager`].

use crate::collaborators::{FilePackager, PackagingRequest};
use crate::framework::{Actor, ActorContext, ActorFault, ActorRef};
use crate::protocol::{LogEvent, Message, PackagingMessage};
use async_trait::async_trait;
use std::sync::Arc;

pub struct FilePackagerActor {
    packager: Arc<dyn FilePackager>,
}

impl FilePackagerActor {
    pub fn new(packager: Arc<dyn FilePackager>) -> Self {
        Self { packager }
    }
}

#[async_trait]
impl Actor<Message> for FilePackagerActor {
    async fn receive(
        &mut self,
        message: Message,
        sender: Option<ActorRef<Message>>,
        ctx: &ActorContext<Message>,
    ) -> Result<(), ActorFault> {
        let original = message.clone();
        let (request, tracking, requester) = match (message, sender) {
            (
                Message::Packaging(PackagingMessage::PerformFilePackaging {
                    path,
                    metadata,
                    target_template,
                    tracking,
                }),
                Some(requester),
            ) => (
                PackagingRequest {
                    path,
                    metadata,
                    target_template,
                },
                tracking,
                requester,
            ),
            (message, sender) => {
                ctx.notify_marooned_message(sender.as_ref(), message);
                return Ok(());
            }
        };

        let packager = Arc::clone(&self.packager);
        let system = ctx.system().clone();
        let myself = ctx.myself().clone();
        ctx.reply_from_task(original, requester, async move {
            let reply = match packager.package(&request).await {
                Ok(destination) => {
                    system.log(
                        LogEvent::debug(
                            myself.id(),
                            request.path.display(),
                            format!("packaged to {}", destination.display()),
                        )
                        .into(),
                        Some(&myself),
                    );
                    PackagingMessage::FilePackagingFinished { destination, tracking }
                }
                Err(e) => PackagingMessage::FilePackagingFailure {
                    path: request.path,
                    reason: e.to_string(),
                    tracking,
                },
            };
            Message::from(reply)
        });
        Ok(())
    }
}
