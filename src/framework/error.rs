//! # Framework Errors
//!
//! This module defines the error types used by the actor runtime itself.
//! Domain failures never travel as errors between actors: they are sent as
//! failure messages. These types only describe what can go wrong with the
//! plumbing (registration, delivery, setup) and with a single `receive` turn.

use crate::framework::ActorId;

/// Errors that can occur within the actor runtime.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum RuntimeError {
    #[error("Actor id already registered: {0}")]
    DuplicateActorId(ActorId),
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Actor stopped: {0}")]
    ActorStopped(ActorId),
    #[error("Actor {0} has no parent")]
    NoParent(ActorId),
    #[error("Actor {id} failed during setup: {reason}")]
    SetupFailed { id: ActorId, reason: String },
    #[error("No reply from {0} before the deadline")]
    AskTimeout(ActorId),
    #[error("Responder dropped before replying")]
    ResponderDropped,
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

/// A fault raised while an actor processes one message.
///
/// Faults are caught at the dispatch boundary and never reach other actors.
#[derive(Debug, thiserror::Error)]
pub enum ActorFault {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("{0}")]
    Failed(String),
}

impl ActorFault {
    pub fn failed(reason: impl Into<String>) -> Self {
        ActorFault::Failed(reason.into())
    }
}
