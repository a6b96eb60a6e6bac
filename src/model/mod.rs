//! Pure data structures shared by the actors: tracking tokens, media metadata,
//! tracking entries and file classification.

pub mod file_kind;
pub mod metadata;
pub mod tracking;
pub mod tracking_token;

pub use file_kind::*;
pub use metadata::*;
pub use tracking::*;
pub use tracking_token::*;
