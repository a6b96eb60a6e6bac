//! Generic actor runtime.
//!
//! This module provides the building blocks every actor in the crate is made of:
//! addressable actors with private mailboxes, a registry to find them by id,
//! parent/child relationships, and diagnostics for messages nobody handled.
//!
//! # Main Components
//!
//! - [`Actor`] - Trait implemented by every actor (`pre_setup`, `receive`, `post_stop`)
//! - [`ActorSystem`] - Registry, `tell` by id, marooned-message log, shutdown
//! - [`ActorContext`] - Per-actor handle: spawn children, look up actors, reply
//! - [`ActorRef`] - Cloneable address of a running actor
//! - [`Protocol`] - Contract for the message type routed through a system
//! - [`RuntimeError`] / [`ActorFault`] - Runtime errors and per-message faults
//!
//! # Testing
//!
//! See the [`probe`] module for observing messages from tests, and [`ask`] for
//! request/response from outside the system.

pub mod actor;
pub mod error;
pub mod interactions;
pub mod probe;
pub mod system;

pub use actor::{Actor, ActorContext, ActorId, ActorRef, Envelope};
pub use error::{ActorFault, RuntimeError};
pub use interactions::ask;
pub use probe::{Probe, Received};
pub use system::{ActorSystem, MaroonedMessage, Protocol};
