//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide `tracing` subscriber. Two
//! streams of output end up there:
//!
//! - **runtime diagnostics** emitted with `tracing` macros by the actor system
//!   and the actors themselves (spawns, faults, marooned messages, joins);
//! - **pipeline events** sent as `LogEvent` messages to the logger actor, which
//!   re-emits them through `tracing` when it writes to the console.
//!
//! ## Log Levels
//!
//! `RUST_LOG` wins when set. Otherwise the level comes from the `[logging]`
//! section of the configuration.
//!
//! ```bash
//! # Pipeline events only
//! RUST_LOG=info longtang --source ~/Downloads --target ~/Music
//!
//! # Every message an actor receives, with its payload
//! RUST_LOG=debug longtang --source ~/Downloads --target ~/Music
//!
//! # Only the runtime
//! RUST_LOG=longtang::framework=debug longtang --source ~/Downloads --target ~/Music
//! ```
//!
//! With `RUST_LOG=debug` a single file shows up like this:
//!
//! ```text
//! DEBUG Receive actor=organizer/poller message=Polling(StartPolling { source: "/in" })
//! DEBUG organizer/poller /in/a.mp3: audio file found
//! DEBUG Receive actor=organizer/flow message=Flow(MediaFileAvailable { .. })
//! DEBUG organizer/flow/packaging/packager /in/a.mp3: packaged to /lib/Can/Tago Mago/01 - Paperhouse.mp3
//!  INFO organizer/flow 5f0c..: processed into /lib/Can/Tago Mago/01 - Paperhouse.mp3
//! ```
//!
//! The format is compact and hides the module path (`with_target(false)`); the
//! `actor` field already says where a line comes from.

use crate::protocol::Severity;
use tracing_subscriber::EnvFilter;

fn default_directive(level: Severity) -> &'static str {
    match level {
        Severity::Debug => "debug",
        Severity::Information => "info",
        Severity::Error => "error",
    }
}

pub fn setup_tracing(level: Severity) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
