//! # Actors, References and Contexts
//!
//! This module defines the [`Actor`] trait, the [`ActorRef`] handle used to
//! address an actor, and the [`ActorContext`] every actor gets to interact with
//! the [`ActorSystem`].
//!
//! ## Concurrency Model
//!
//! Every actor owns an unbounded mailbox and runs in its own Tokio task. The
//! task pulls one envelope at a time and awaits `receive` before pulling the
//! next one, so an actor never processes two messages concurrently and its
//! state needs no locking. Messages from one sender to one receiver keep their
//! send order because they travel through the same channel.
//!
//! ## Explicit Context
//!
//! `receive` gets the sender and the context as arguments. There is no hidden
//! "current message" state on the actor: the context carries the actor's own
//! reference (`myself`) and its parent for the whole lifetime of the actor.

use crate::framework::error::{ActorFault, RuntimeError};
use crate::framework::system::{ActorSystem, Protocol};
use async_trait::async_trait;
use futures::FutureExt;
use std::borrow::Borrow;
use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Process-unique identifier of an actor inside an [`ActorSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the id of a child actor: `<self>/<name>`.
    pub fn child(&self, name: &str) -> ActorId {
        ActorId(format!("{}/{}", self.0, name))
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ActorId> for ActorId {
    fn from(id: &ActorId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for ActorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A message together with the reference of whoever sent it.
#[derive(Debug)]
pub struct Envelope<M: Protocol> {
    pub message: M,
    pub sender: Option<ActorRef<M>>,
}

/// What travels through a mailbox.
pub(crate) enum Mail<M: Protocol> {
    Deliver(Envelope<M>),
    Stop,
}

/// Handle used to send messages to an actor.
///
/// Cheap to clone: it holds only the id and the sending half of the mailbox.
pub struct ActorRef<M: Protocol> {
    id: ActorId,
    mailbox: mpsc::UnboundedSender<Mail<M>>,
}

impl<M: Protocol> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            mailbox: self.mailbox.clone(),
        }
    }
}

impl<M: Protocol> Debug for ActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActorRef").field(&self.id.as_str()).finish()
    }
}

impl<M: Protocol> ActorRef<M> {
    pub(crate) fn new(id: ActorId, mailbox: mpsc::UnboundedSender<Mail<M>>) -> Self {
        Self { id, mailbox }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Enqueues `message` without waiting for the receiver.
    ///
    /// Fails only when the receiving actor has already stopped.
    pub fn tell(&self, message: M, sender: Option<&ActorRef<M>>) -> Result<(), RuntimeError> {
        self.mailbox
            .send(Mail::Deliver(Envelope {
                message,
                sender: sender.cloned(),
            }))
            .map_err(|_| RuntimeError::ActorStopped(self.id.clone()))
    }

    /// Returns `false` once the actor's mailbox loop has exited.
    pub fn is_alive(&self) -> bool {
        !self.mailbox.is_closed()
    }

    pub(crate) fn stop(&self) {
        let _ = self.mailbox.send(Mail::Stop);
    }
}

/// Trait implemented by every actor.
///
/// # Lifecycle
///
/// 1. [`Actor::pre_setup`] runs once, before the first message. It is the place to
///    spawn children through [`ActorContext::spawn`].
/// 2. [`Actor::receive`] runs once per message, strictly sequentially.
/// 3. [`Actor::post_stop`] runs once after the mailbox is closed.
///
/// Actors are never restarted. A fault returned from (or a panic raised in)
/// `receive` is handled by the system and the actor keeps processing.
///
/// # Unhandled Messages
///
/// `receive` should match the protocols it understands and hand everything
/// else to [`ActorContext::notify_marooned_message`]. That is not a failure.
#[async_trait]
pub trait Actor<M: Protocol>: Send + 'static {
    async fn pre_setup(&mut self, _ctx: &ActorContext<M>) -> Result<(), ActorFault> {
        Ok(())
    }

    async fn receive(
        &mut self,
        message: M,
        sender: Option<ActorRef<M>>,
        ctx: &ActorContext<M>,
    ) -> Result<(), ActorFault>;

    async fn post_stop(&mut self, _ctx: &ActorContext<M>) {}
}

/// Per-actor handle into the system.
pub struct ActorContext<M: Protocol> {
    system: ActorSystem<M>,
    myself: ActorRef<M>,
    parent: Option<ActorRef<M>>,
}

impl<M: Protocol> ActorContext<M> {
    pub(crate) fn new(system: ActorSystem<M>, myself: ActorRef<M>, parent: Option<ActorRef<M>>) -> Self {
        Self {
            system,
            myself,
            parent,
        }
    }

    pub fn myself(&self) -> &ActorRef<M> {
        &self.myself
    }

    pub fn id(&self) -> &ActorId {
        self.myself.id()
    }

    pub fn parent(&self) -> Option<&ActorRef<M>> {
        self.parent.as_ref()
    }

    pub fn system(&self) -> &ActorSystem<M> {
        &self.system
    }

    /// Spawns a child actor whose parent is the current actor.
    pub async fn spawn<A: Actor<M>>(
        &self,
        id: impl Into<ActorId>,
        actor: A,
    ) -> Result<ActorRef<M>, RuntimeError> {
        self.system
            .spawn_supervised(id, actor, Some(self.myself.clone()))
            .await
    }

    /// Looks up a previously spawned actor (child or well-known sibling).
    pub fn get_by_id(&self, id: &str) -> Option<ActorRef<M>> {
        self.system.get_by_id(id)
    }

    /// Sends `message` to `target` with the current actor as sender.
    pub fn tell(&self, target: &ActorRef<M>, message: M) -> Result<(), RuntimeError> {
        target.tell(message, Some(&self.myself))
    }

    /// Sends `message` to the parent with the current actor as sender.
    pub fn tell_parent(&self, message: M) -> Result<(), RuntimeError> {
        match &self.parent {
            Some(parent) => parent.tell(message, Some(&self.myself)),
            None => Err(RuntimeError::NoParent(self.myself.id().clone())),
        }
    }

    /// Sends `message` to `target` keeping `sender` as the reply address.
    pub fn forward(
        &self,
        target: &ActorRef<M>,
        message: M,
        sender: Option<&ActorRef<M>>,
    ) -> Result<(), RuntimeError> {
        target.tell(message, sender)
    }

    /// Hands a log event to the system's log sink, if one is registered.
    pub fn log(&self, event: M) {
        self.system.log(event, Some(&self.myself));
    }

    /// Runs `work` on its own task and sends its result to `requester`.
    ///
    /// The task has the same fault boundary as `receive`: a panic inside `work`
    /// is answered with `request`'s failure reply, or recorded as marooned when
    /// the protocol has none.
    pub fn reply_from_task<F>(&self, request: M, requester: ActorRef<M>, work: F)
    where
        F: Future<Output = M> + Send + 'static,
    {
        let system = self.system.clone();
        let myself = self.myself.clone();
        tokio::spawn(async move {
            match AssertUnwindSafe(work).catch_unwind().await {
                Ok(reply) => {
                    if let Err(e) = requester.tell(reply, Some(&myself)) {
                        warn!(actor = %myself.id(), error = %e, "Requester is gone");
                    }
                }
                Err(panic) => {
                    let reason = panic_reason(panic.as_ref());
                    system.handle_fault(&myself, request, Some(&requester), &reason);
                }
            }
        });
    }

    /// Records a message this actor has no handler for.
    pub fn notify_marooned_message(&self, sender: Option<&ActorRef<M>>, message: M) {
        self.system
            .record_marooned(sender.map(|s| s.id().clone()), self.myself.id().clone(), message);
    }
}

/// Mailbox loop of a single actor.
pub(crate) async fn run_mailbox<M, A>(
    mut actor: A,
    ctx: ActorContext<M>,
    mut mailbox: mpsc::UnboundedReceiver<Mail<M>>,
) where
    M: Protocol,
    A: Actor<M>,
{
    let actor_id = ctx.id().clone();
    info!(actor = %actor_id, "Actor started");

    while let Some(mail) = mailbox.recv().await {
        let Envelope { message, sender } = match mail {
            Mail::Deliver(envelope) => envelope,
            Mail::Stop => break,
        };
        debug!(actor = %actor_id, ?message, "Receive");

        let request = message.clone();
        let outcome = AssertUnwindSafe(actor.receive(message, sender.clone(), &ctx))
            .catch_unwind()
            .await;

        let reason = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(fault)) => fault.to_string(),
            Err(panic) => panic_reason(panic.as_ref()),
        };
        ctx.system()
            .handle_fault(ctx.myself(), request, sender.as_ref(), &reason);
    }

    mailbox.close();
    actor.post_stop(&ctx).await;
    info!(actor = %actor_id, "Actor stopped");
}

fn panic_reason(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(reason) = panic.downcast_ref::<&str>() {
        format!("panic: {reason}")
    } else if let Some(reason) = panic.downcast_ref::<String>() {
        format!("panic: {reason}")
    } else {
        "panic".to_string()
    }
}
