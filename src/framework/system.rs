//! # Actor System
//!
//! The [`ActorSystem`] is the process-wide registry of running actors. It owns
//! the only state shared between actors:
//!
//! - the **registry** mapping [`ActorId`] to [`ActorRef`], used for `tell` by id
//!   and for `get_by_id` lookups;
//! - the **marooned messages** log, an append-only record of messages an actor
//!   received but had no handler for.
//!
//! Both are guarded by `parking_lot` locks and are safe to use from every actor
//! task at once. Everything else belongs to exactly one actor.
//!
//! ## Fault Handling
//!
//! When `receive` returns an [`ActorFault`](crate::framework::ActorFault) or panics,
//! the mailbox loop calls back into the system, which:
//!
//! 1. logs the fault with `tracing` and sends a [`Protocol::fault_event`] to the log sink actor;
//! 2. answers the sender with [`Protocol::failure_reply`] when the protocol has one;
//! 3. otherwise records the message as marooned.
//!
//! A supervisor waiting for a reply is therefore never left hanging by a crashed child.

use crate::framework::actor::{run_mailbox, Actor, ActorContext, ActorId, ActorRef};
use crate::framework::error::RuntimeError;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Contract every message type routed through an [`ActorSystem`] must satisfy.
///
/// Messages are immutable values, hence `Clone`.
pub trait Protocol: Clone + Debug + Send + 'static {
    /// The failure message answering this request when its handler faults.
    fn failure_reply(&self, _reason: &str) -> Option<Self> {
        None
    }

    /// The log event describing a fault raised by `origin`.
    fn fault_event(_origin: &ActorId, _reason: &str) -> Option<Self> {
        None
    }
}

/// A message no handler matched.
#[derive(Debug, Clone)]
pub struct MaroonedMessage<M> {
    pub sender: Option<ActorId>,
    pub receiver: ActorId,
    pub message: M,
}

struct SystemInner<M: Protocol> {
    name: String,
    registry: RwLock<HashMap<ActorId, ActorRef<M>>>,
    marooned: Mutex<Vec<MaroonedMessage<M>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    log_sink: RwLock<Option<ActorId>>,
}

/// Handle to the actor registry. Cloning shares the same system.
pub struct ActorSystem<M: Protocol> {
    inner: Arc<SystemInner<M>>,
}

impl<M: Protocol> Clone for ActorSystem<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Protocol> ActorSystem<M> {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        info!(system = %name, "Actor system created");
        Self {
            inner: Arc::new(SystemInner {
                name,
                registry: RwLock::new(HashMap::new()),
                marooned: Mutex::new(Vec::new()),
                handles: Mutex::new(Vec::new()),
                log_sink: RwLock::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registers `actor` under `id`, runs its `pre_setup` hook and starts its mailbox.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::DuplicateActorId`] if `id` is already registered.
    /// - [`RuntimeError::SetupFailed`] if `pre_setup` fails; the id is released again
    ///   and any children spawned before the failure are stopped.
    pub async fn spawn<A: Actor<M>>(
        &self,
        id: impl Into<ActorId>,
        actor: A,
    ) -> Result<ActorRef<M>, RuntimeError> {
        self.spawn_supervised(id, actor, None).await
    }

    /// Like [`ActorSystem::spawn`], but the actor is only built once the id is known to be free.
    pub async fn spawn_with<A, F>(&self, id: impl Into<ActorId>, factory: F) -> Result<ActorRef<M>, RuntimeError>
    where
        A: Actor<M>,
        F: FnOnce() -> A,
    {
        self.spawn_from(id.into(), factory, None).await
    }

    /// Spawns an actor with an explicit parent.
    pub async fn spawn_supervised<A: Actor<M>>(
        &self,
        id: impl Into<ActorId>,
        actor: A,
        parent: Option<ActorRef<M>>,
    ) -> Result<ActorRef<M>, RuntimeError> {
        self.spawn_from(id.into(), move || actor, parent).await
    }

    async fn spawn_from<A, F>(
        &self,
        id: ActorId,
        factory: F,
        parent: Option<ActorRef<M>>,
    ) -> Result<ActorRef<M>, RuntimeError>
    where
        A: Actor<M>,
        F: FnOnce() -> A,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let actor_ref = ActorRef::new(id.clone(), sender);
        {
            let mut registry = self.inner.registry.write();
            if registry.contains_key(&id) {
                warn!(actor = %id, "Duplicate actor id");
                return Err(RuntimeError::DuplicateActorId(id));
            }
            registry.insert(id.clone(), actor_ref.clone());
        }

        let mut actor = factory();
        let ctx = ActorContext::new(self.clone(), actor_ref.clone(), parent);
        if let Err(fault) = actor.pre_setup(&ctx).await {
            warn!(actor = %id, error = %fault, "pre_setup failed");
            self.inner.registry.write().remove(&id);
            self.stop_descendants(&id);
            return Err(RuntimeError::SetupFailed {
                id,
                reason: fault.to_string(),
            });
        }

        let handle = tokio::spawn(run_mailbox(actor, ctx, receiver));
        let mut handles = self.inner.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        debug!(actor = %id, size = self.inner.registry.read().len(), "Spawned");
        Ok(actor_ref)
    }

    pub fn get_by_id(&self, id: &str) -> Option<ActorRef<M>> {
        self.inner.registry.read().get(id).cloned()
    }

    /// Sends `message` to the actor registered at `target`.
    pub fn tell(&self, target: &str, message: M, sender: Option<&ActorRef<M>>) -> Result<(), RuntimeError> {
        match self.get_by_id(target) {
            Some(actor) => actor.tell(message, sender),
            None => Err(RuntimeError::ActorNotFound(ActorId::from(target))),
        }
    }

    /// Registers the actor that receives fault events and [`ActorContext::log`] output.
    pub fn set_log_sink(&self, id: impl Into<ActorId>) {
        *self.inner.log_sink.write() = Some(id.into());
    }

    pub fn log_sink(&self) -> Option<ActorRef<M>> {
        let id = self.inner.log_sink.read().clone()?;
        self.get_by_id(id.as_str())
    }

    pub(crate) fn log(&self, event: M, sender: Option<&ActorRef<M>>) {
        if let Some(sink) = self.log_sink() {
            let _ = sink.tell(event, sender);
        }
    }

    pub(crate) fn record_marooned(&self, sender: Option<ActorId>, receiver: ActorId, message: M) {
        warn!(actor = %receiver, ?sender, ?message, "Marooned message");
        self.inner.marooned.lock().push(MaroonedMessage {
            sender,
            receiver,
            message,
        });
    }

    pub fn marooned_messages(&self) -> Vec<MaroonedMessage<M>> {
        self.inner.marooned.lock().clone()
    }

    pub fn marooned_count(&self) -> usize {
        self.inner.marooned.lock().len()
    }

    pub(crate) fn handle_fault(
        &self,
        origin: &ActorRef<M>,
        request: M,
        sender: Option<&ActorRef<M>>,
        reason: &str,
    ) {
        error!(actor = %origin.id(), ?request, reason, "Fault while processing message");

        let replied = match (request.failure_reply(reason), sender) {
            (Some(reply), Some(sender)) => sender.tell(reply, Some(origin)).is_ok(),
            _ => false,
        };
        if !replied {
            self.record_marooned(sender.map(|s| s.id().clone()), origin.id().clone(), request);
        }

        // The sink never reports its own faults back to itself.
        if let Some(sink) = self.log_sink() {
            if sink.id() != origin.id() {
                if let Some(event) = M::fault_event(origin.id(), reason) {
                    let _ = sink.tell(event, Some(origin));
                }
            }
        }
    }

    /// Stops a single actor and releases its id.
    pub fn stop(&self, id: &str) {
        if let Some(actor) = self.inner.registry.write().remove(id) {
            debug!(actor = %id, "Stopping");
            actor.stop();
        }
    }

    /// Stops every actor registered below `id` (`<id>/...`).
    fn stop_descendants(&self, id: &ActorId) {
        let prefix = format!("{id}/");
        let descendants: Vec<ActorRef<M>> = {
            let mut registry = self.inner.registry.write();
            let ids: Vec<ActorId> = registry
                .keys()
                .filter(|key| key.as_str().starts_with(&prefix))
                .cloned()
                .collect();
            ids.iter().filter_map(|key| registry.remove(key)).collect()
        };
        for actor in descendants {
            debug!(actor = %actor.id(), parent = %id, "Stopping orphan");
            actor.stop();
        }
    }

    pub fn actor_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Stops every actor and waits for all mailbox loops to finish.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if every actor task ended cleanly
    /// - `Err(RuntimeError::TaskFailed)` if an actor task panicked outside `receive`
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        info!(system = %self.inner.name, "Shutting down actor system");
        let actors: Vec<ActorRef<M>> = self.inner.registry.write().drain().map(|(_, a)| a).collect();
        for actor in &actors {
            actor.stop();
        }

        let handles: Vec<JoinHandle<()>> = self.inner.handles.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(RuntimeError::TaskFailed(e.to_string()));
            }
        }

        info!(
            system = %self.inner.name,
            marooned = self.marooned_count(),
            "Actor system shutdown complete"
        );
        Ok(())
    }
}
