#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Longtang
//!
//! > **A music library organizer driven by a small actor runtime.**
//!
//! Longtang walks a source directory, inflates the archives it finds, reads the
//! tags of every audio file and copies each file into a target library laid out
//! by artist, album and track. Every step runs in an actor; the actors only
//! talk through messages.
//!
//! ## 🏗️ Design
//!
//! ### Actors with explicit context
//! An actor implements [`Actor`](framework::Actor): `receive` gets the message,
//! the sender and an [`ActorContext`](framework::ActorContext). There is no
//! hidden "current message" state, and an actor never processes two messages
//! at once, so its fields need no locks.
//!
//! ### Failures are messages
//! No error crosses an actor boundary. A stage that fails answers with the
//! failure variant of its protocol; a fault or panic inside `receive` is caught
//! by the runtime, which sends that failure variant on the actor's behalf.
//! Messages nobody handles are recorded as *marooned* for diagnosis.
//!
//! ### Correlation by token
//! Every discovered file gets a [`TrackingToken`](model::TrackingToken) that
//! travels with each message of its pipeline, so answers arriving in any order
//! are attributed to the right file.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Registry, mailboxes, supervision, marooned messages, [`ask`](framework::ask)
//! and the [`Probe`](framework::Probe) test actor.
//!
//! ### 2. The Vocabulary ([`protocol`], [`model`])
//! One enum per protocol, summed up in [`Message`](protocol::Message), plus the
//! data they carry.
//!
//! ### 3. The Pipeline
//! - [`organizer_actor`] - root supervisor, one run per `Organize`
//! - [`poller_actor`] - directory walk and the join over pending archives
//! - [`flow_actor`] - per-file sequencing of tags and packaging
//! - [`id3_actor`], [`packaging_actor`] - the two sub-supervisors
//! - [`tracking_actor`] - per-file entries and the final summary
//! - [`logger_actor`] - sink for every log event
//!
//! ### 4. The Outside World ([`collaborators`], [`config`], [`lifecycle`])
//! Services the actors delegate I/O to, the TOML configuration, and
//! [`LongtangSystem`](lifecycle::LongtangSystem) which starts and stops it all.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- --source ~/Downloads --target ~/Music
//! ```

pub mod collaborators;
pub mod config;
pub mod flow_actor;
pub mod framework;
pub mod id3_actor;
pub mod lifecycle;
pub mod logger_actor;
pub mod model;
pub mod organizer_actor;
pub mod packaging_actor;
pub mod poller_actor;
pub mod protocol;
pub mod tracking_actor;
