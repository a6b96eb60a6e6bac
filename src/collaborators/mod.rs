//! # External Collaborators
//!
//! The pipeline actors do not decode archives, read tags or copy files
//! themselves. They delegate to the services defined here, injected at
//! construction time the same way clients are handed to actors as context:
//!
//! - [`SourceWalker`] - lists the files below a source ([`FsWalker`])
//! - [`ArchiveInflater`] - extracts an archive ([`CommandInflater`])
//! - [`MetadataReader`] - reads tags ([`Id3v1Reader`])
//! - [`FilePackager`] - places a file into the library ([`CopyPackager`])
//!
//! The [`mock`] module has scripted versions of all four for tests.
//!
//! Every service reports failure as a [`CollaboratorError`]; the actor calling
//! it turns that into the failure message of its protocol.

pub mod error;
pub mod inflater;
pub mod mock;
pub mod packager;
pub mod reader;
pub mod walker;

pub use error::CollaboratorError;
pub use inflater::{ArchiveInflater, CommandInflater};
pub use packager::{render_template, CopyPackager, FilePackager, PackagingRequest, DEFAULT_TEMPLATE};
pub use reader::{Id3v1Reader, MetadataReader};
pub use walker::{FsWalker, SourceWalker};

use std::sync::Arc;

/// The set of services a pipeline runs with.
#[derive(Clone)]
pub struct Services {
    pub walker: Arc<dyn SourceWalker>,
    pub inflater: Arc<dyn ArchiveInflater>,
    pub reader: Arc<dyn MetadataReader>,
    pub packager: Arc<dyn FilePackager>,
}

impl Services {
    /// The filesystem-backed services described by `config`.
    pub fn from_config(config: &crate::config::LongtangConfig) -> Self {
        Self {
            walker: Arc::new(FsWalker),
            inflater: Arc::new(CommandInflater::new(
                config.inflate.program.clone(),
                config.inflate_workdir(),
            )),
            reader: Arc::new(Id3v1Reader),
            packager: Arc::new(CopyPackager::new(
                config.packaging.target.clone(),
                config.packaging.cover_art,
            )),
        }
    }
}
