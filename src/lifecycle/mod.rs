//! Runtime orchestration and lifecycle management.
//!
//! # Main Components
//!
//! - [`LongtangSystem`] - Starts the logger and the organizer, runs `organize`, shuts down
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod longtang_system;
pub mod tracing;

pub use self::longtang_system::*;
pub use self::tracing::*;
