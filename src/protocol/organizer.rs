//! Messages exchanged with the [`OrganizerSupervisor`](crate::organizer_actor::OrganizerSupervisor).

use crate::model::TrackingSummary;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum OrganizerMessage {
    Organize { source: PathBuf },
    OrganizeFinished { summary: TrackingSummary },
    /// A run was already in progress.
    OrganizeRejected { source: PathBuf },
}
