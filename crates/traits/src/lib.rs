pub mod layer;
pub mod storage;

pub use layer::{InMemoryLayerSource, LayerError, LayerSource, LayerSpec, SharedLayerData, TileRequest};
pub use storage::{Artifact, ArtifactStorage, InMemoryArtifactStorage, StorageError};
