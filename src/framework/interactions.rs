//! # Interaction Patterns
//!
//! Actors only `tell`. Code living outside the system (a binary's `main`, a test)
//! sometimes needs a single reply back, which is what [`ask`] provides: it spawns
//! a short-lived responder actor, sends the request with the responder as the
//! sender, and resolves with the first message the responder receives.

use crate::framework::actor::{Actor, ActorContext, ActorId, ActorRef};
use crate::framework::error::{ActorFault, RuntimeError};
use crate::framework::system::{ActorSystem, Protocol};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

struct Responder<M> {
    respond_to: Option<oneshot::Sender<M>>,
}

#[async_trait]
impl<M: Protocol> Actor<M> for Responder<M> {
    async fn receive(
        &mut self,
        message: M,
        sender: Option<ActorRef<M>>,
        ctx: &ActorContext<M>,
    ) -> Result<(), ActorFault> {
        match self.respond_to.take() {
            Some(respond_to) => {
                let _ = respond_to.send(message);
            }
            None => ctx.notify_marooned_message(sender.as_ref(), message),
        }
        Ok(())
    }
}

/// Sends `message` to `target` and waits up to `timeout` for the reply.
pub async fn ask<M: Protocol>(
    system: &ActorSystem<M>,
    target: &ActorRef<M>,
    message: M,
    timeout: Duration,
) -> Result<M, RuntimeError> {
    let (respond_to, response) = oneshot::channel();
    let responder_id = ActorId::new(format!("ask-{}", Uuid::new_v4()));
    let responder = system
        .spawn(
            responder_id.clone(),
            Responder {
                respond_to: Some(respond_to),
            },
        )
        .await?;

    debug!(target = %target.id(), responder = %responder_id, "Ask");
    if let Err(e) = target.tell(message, Some(&responder)) {
        system.stop(responder_id.as_str());
        return Err(e);
    }

    let outcome = tokio::time::timeout(timeout, response).await;
    system.stop(responder_id.as_str());
    match outcome {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(_)) => Err(RuntimeError::ResponderDropped),
        Err(_) => Err(RuntimeError::AskTimeout(target.id().clone())),
    }
}
