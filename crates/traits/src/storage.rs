//! ArtifactStorage trait for temporary document artifacts.
//!
//! Finished documents are parked in temporary storage between generation and
//! delivery. The storage owns naming: every artifact it creates carries an
//! identifier that is unique among live artifacts of that storage.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Failed to create artifact: {0}")]
    Create(String),

    #[error("Artifact '{0}' does not exist")]
    Missing(String),

    #[error("I/O error on artifact '{artifact}': {message}")]
    Io { artifact: String, message: String },

    #[error("Failed to delete artifact '{artifact}': {message}")]
    Delete { artifact: String, message: String },
}

/// A handle to one temporary artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    id: String,
    location: String,
}

impl Artifact {
    pub fn new(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
        }
    }

    /// Short identifier derived from the storage handle.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Storage-specific location (a file path for file-backed storage).
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location)
    }
}

/// Temporary storage for finished documents.
///
/// # Implementations
///
/// - `InMemoryArtifactStorage`: keeps artifacts in a map (always available)
/// - `TempFileStorage` (mapsheet-resource): one temporary file per artifact
pub trait ArtifactStorage: Send + Sync + Debug {
    /// Create a new, empty, uniquely named artifact.
    fn create(&self) -> Result<Artifact, StorageError>;

    /// Replace the content of `artifact` with `data`.
    fn write(&self, artifact: &Artifact, data: &[u8]) -> Result<(), StorageError>;

    /// Stream the content of `artifact` into `out`, returning the byte count.
    fn copy_to(&self, artifact: &Artifact, out: &mut dyn Write) -> Result<u64, StorageError>;

    /// Remove `artifact` from storage.
    fn delete(&self, artifact: &Artifact) -> Result<(), StorageError>;

    /// Returns a human-readable name for this storage (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// Artifact storage kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStorage {
    artifacts: std::sync::RwLock<HashMap<String, Vec<u8>>>,
    counter: AtomicU64,
}

impl InMemoryArtifactStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live artifacts.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.artifacts.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(artifact: &str) -> StorageError {
        StorageError::Io {
            artifact: artifact.to_string(),
            message: "artifact store lock poisoned".to_string(),
        }
    }
}

impl ArtifactStorage for InMemoryArtifactStorage {
    fn create(&self) -> Result<Artifact, StorageError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let id = format!("{:08x}", n);
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| StorageError::Create("artifact store lock poisoned".to_string()))?;
        artifacts.insert(id.clone(), Vec::new());
        Ok(Artifact::new(id.clone(), format!("memory://{}", id)))
    }

    fn write(&self, artifact: &Artifact, data: &[u8]) -> Result<(), StorageError> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| Self::poisoned(artifact.id()))?;
        let slot = artifacts
            .get_mut(artifact.id())
            .ok_or_else(|| StorageError::Missing(artifact.id().to_string()))?;
        slot.clear();
        slot.extend_from_slice(data);
        Ok(())
    }

    fn copy_to(&self, artifact: &Artifact, out: &mut dyn Write) -> Result<u64, StorageError> {
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| Self::poisoned(artifact.id()))?;
        let data = artifacts
            .get(artifact.id())
            .ok_or_else(|| StorageError::Missing(artifact.id().to_string()))?;
        out.write_all(data).map_err(|e| StorageError::Io {
            artifact: artifact.id().to_string(),
            message: e.to_string(),
        })?;
        Ok(data.len() as u64)
    }

    fn delete(&self, artifact: &Artifact) -> Result<(), StorageError> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| Self::poisoned(artifact.id()))?;
        artifacts
            .remove(artifact.id())
            .map(|_| ())
            .ok_or_else(|| StorageError::Missing(artifact.id().to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryArtifactStorage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_storage_round_trip() {
        let storage = InMemoryArtifactStorage::new();
        let artifact = storage.create().unwrap();
        storage.write(&artifact, b"%PDF-1.5").unwrap();

        let mut out = Vec::new();
        let copied = storage.copy_to(&artifact, &mut out).unwrap();
        assert_eq!(copied, 8);
        assert_eq!(out, b"%PDF-1.5");
    }

    #[test]
    fn test_in_memory_storage_ids_are_unique() {
        let storage = InMemoryArtifactStorage::new();
        let a = storage.create().unwrap();
        let b = storage.create().unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_in_memory_storage_delete() {
        let storage = InMemoryArtifactStorage::new();
        let artifact = storage.create().unwrap();
        storage.delete(&artifact).unwrap();
        assert!(storage.is_empty());

        // Second delete reports the artifact as gone
        assert!(matches!(
            storage.delete(&artifact),
            Err(StorageError::Missing(_))
        ));
    }

    #[test]
    fn test_in_memory_storage_copy_missing() {
        let storage = InMemoryArtifactStorage::new();
        let ghost = Artifact::new("nope", "memory://nope");
        let mut out = Vec::new();
        assert!(matches!(
            storage.copy_to(&ghost, &mut out),
            Err(StorageError::Missing(_))
        ));
    }
}
