//! Platform implementations of the mapsheet collaborator traits.
//!
//! ## Available Implementations
//!
//! - [`FilesystemLayerSource`]: serves layer imagery from files under a base directory
//! - [`TempFileStorage`]: parks finished documents in temporary files
//!
//! ## Re-exports
//!
//! The in-memory variants live in mapsheet-traits and are re-exported here:
//! - [`InMemoryLayerSource`]
//! - [`InMemoryArtifactStorage`]

mod filesystem;
mod tempfile_storage;

pub use filesystem::FilesystemLayerSource;
pub use tempfile_storage::{TempFileStorage, ARTIFACT_PREFIX, ARTIFACT_SUFFIX};

pub use mapsheet_traits::{InMemoryArtifactStorage, InMemoryLayerSource};
