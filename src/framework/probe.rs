//! # Probe Actor & Testing Guide
//!
//! A [`Probe`] is a real actor that forwards every message it receives to the
//! test body. Use it wherever an actor under test expects a requester, a parent
//! or a collaborator you want to observe:
//!
//! ```rust,ignore
//! let system = ActorSystem::<Message>::new("test");
//! let mut parent = Probe::spawn(&system, "parent").await?;
//!
//! let conductor = system
//!     .spawn_supervised("conductor", FlowConductorSupervisor::new(..), Some(parent.actor_ref()))
//!     .await?;
//! conductor.tell(request, Some(&parent.actor_ref()))?;
//!
//! let report = parent.expect_message(Duration::from_secs(1)).await;
//! parent.expect_no_message(Duration::from_millis(100)).await;
//! ```
//!
//! | Pattern | What is real | What is a probe |
//! |---------|--------------|-----------------|
//! | Single actor | the actor under test | requester / parent |
//! | Supervisor | supervisor + its children | parent |
//! | Full system | every actor | the external caller (or use [`ask`](crate::framework::ask)) |
//!
//! The `expect_*` helpers panic on mismatch, the way assertions do.

use crate::framework::actor::{Actor, ActorContext, ActorId, ActorRef};
use crate::framework::error::{ActorFault, RuntimeError};
use crate::framework::system::{ActorSystem, Protocol};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// A received message and the id of whoever sent it.
#[derive(Debug, Clone)]
pub struct Received<M> {
    pub message: M,
    pub sender: Option<ActorId>,
}

struct ProbeActor<M> {
    forward_to: mpsc::UnboundedSender<Received<M>>,
}

#[async_trait]
impl<M: Protocol> Actor<M> for ProbeActor<M> {
    async fn receive(
        &mut self,
        message: M,
        sender: Option<ActorRef<M>>,
        _ctx: &ActorContext<M>,
    ) -> Result<(), ActorFault> {
        let _ = self.forward_to.send(Received {
            message,
            sender: sender.map(|s| s.id().clone()),
        });
        Ok(())
    }
}

/// Test-side handle of a probe actor.
pub struct Probe<M: Protocol> {
    actor: ActorRef<M>,
    received: mpsc::UnboundedReceiver<Received<M>>,
}

impl<M: Protocol> Probe<M> {
    pub async fn spawn(system: &ActorSystem<M>, id: impl Into<ActorId>) -> Result<Self, RuntimeError> {
        let (forward_to, received) = mpsc::unbounded_channel();
        let actor = system.spawn(id, ProbeActor { forward_to }).await?;
        Ok(Self { actor, received })
    }

    pub fn actor_ref(&self) -> ActorRef<M> {
        self.actor.clone()
    }

    pub fn id(&self) -> &ActorId {
        self.actor.id()
    }

    /// Next message with its sender, or `None` if nothing arrives within `within`.
    pub async fn recv_within(&mut self, within: Duration) -> Option<Received<M>> {
        tokio::time::timeout(within, self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next message; panics if nothing arrives within `within`.
    pub async fn expect_message(&mut self, within: Duration) -> M {
        match self.recv_within(within).await {
            Some(received) => received.message,
            None => panic!("probe {} received no message within {:?}", self.actor.id(), within),
        }
    }

    /// Collects exactly `count` messages; panics if fewer arrive in time.
    pub async fn expect_messages(&mut self, count: usize, within: Duration) -> Vec<M> {
        let mut messages = Vec::with_capacity(count);
        for _ in 0..count {
            messages.push(self.expect_message(within).await);
        }
        messages
    }

    /// Panics if any message arrives within `within`.
    pub async fn expect_no_message(&mut self, within: Duration) {
        if let Some(received) = self.recv_within(within).await {
            panic!(
                "probe {} received unexpected message {:?}",
                self.actor.id(),
                received.message
            );
        }
    }
}
