//! Artifact storage backed by one temporary file per document.

use log::debug;
use mapsheet_traits::{Artifact, ArtifactStorage, StorageError};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const ARTIFACT_PREFIX: &str = "mapsheet";
pub const ARTIFACT_SUFFIX: &str = ".pdf";

/// Stores artifacts as `mapsheet<random>.pdf` files in a directory.
///
/// The artifact id is the random middle part of the file name, so it is
/// unique for as long as the file exists.
#[derive(Debug, Clone)]
pub struct TempFileStorage {
    dir: PathBuf,
}

impl TempFileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Storage in the platform temporary directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn io_error(artifact: &Artifact, e: io::Error) -> StorageError {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::Missing(artifact.id().to_string())
        } else {
            StorageError::Io {
                artifact: artifact.id().to_string(),
                message: e.to_string(),
            }
        }
    }
}

impl Default for TempFileStorage {
    fn default() -> Self {
        Self::system()
    }
}

/// Strip the fixed prefix and suffix off a temporary file name.
fn artifact_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_prefix(ARTIFACT_PREFIX)?.strip_suffix(ARTIFACT_SUFFIX)?;
    Some(id.to_string())
}

impl ArtifactStorage for TempFileStorage {
    fn create(&self) -> Result<Artifact, StorageError> {
        let file = tempfile::Builder::new()
            .prefix(ARTIFACT_PREFIX)
            .suffix(ARTIFACT_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| StorageError::Create(format!("{}: {}", self.dir.display(), e)))?;
        // The file is removed on drop until it is kept
        let id = artifact_id(file.path())
            .ok_or_else(|| StorageError::Create(format!("unexpected file name {}", file.path().display())))?;
        let (_, path) = file
            .keep()
            .map_err(|e| StorageError::Create(e.to_string()))?;

        debug!("Created artifact {} at {}", id, path.display());
        Ok(Artifact::new(id, path.to_string_lossy()))
    }

    fn write(&self, artifact: &Artifact, data: &[u8]) -> Result<(), StorageError> {
        let mut file = File::create(artifact.location()).map_err(|e| Self::io_error(artifact, e))?;
        file.write_all(data)
            .and_then(|_| file.flush())
            .map_err(|e| Self::io_error(artifact, e))
    }

    fn copy_to(&self, artifact: &Artifact, out: &mut dyn Write) -> Result<u64, StorageError> {
        let mut file = File::open(artifact.location()).map_err(|e| Self::io_error(artifact, e))?;
        io::copy(&mut file, out).map_err(|e| Self::io_error(artifact, e))
    }

    fn delete(&self, artifact: &Artifact) -> Result<(), StorageError> {
        fs::remove_file(artifact.location()).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::Missing(artifact.id().to_string())
            } else {
                StorageError::Delete {
                    artifact: artifact.id().to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "TempFileStorage"
    }
}
