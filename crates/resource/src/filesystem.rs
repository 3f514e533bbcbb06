//! Filesystem-backed layer source for native platforms.
//!
//! Layer imagery is read from files below a base directory, one file per
//! layer locator. The source refuses locators that would resolve outside the
//! base directory (e.g. `../../../etc/passwd`).

use log::debug;
use mapsheet_traits::{LayerError, LayerSource, LayerSpec, SharedLayerData, TileRequest};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A layer source that reads pre-rendered imagery from the local filesystem.
///
/// The locator of each layer (its `source`, falling back to its name) is
/// resolved relative to the base path. The same file is returned for every
/// extent and resolution; it is scaled into the map region when drawn.
#[derive(Debug)]
pub struct FilesystemLayerSource {
    base_path: PathBuf,
    /// Canonicalized base path for containment checks
    canonical_base: Option<PathBuf>,
}

impl FilesystemLayerSource {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        // May fail if the directory doesn't exist yet
        let canonical = base.canonicalize().ok();
        Self {
            base_path: base,
            canonical_base: canonical,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Whether a file exists for `locator`.
    pub fn exists(&self, locator: &str) -> bool {
        self.resolve_path_safe(locator)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Returns `None` if `locator` would escape the base directory.
    fn resolve_path_safe(&self, locator: &str) -> Option<PathBuf> {
        if Path::new(locator).is_absolute() {
            return None;
        }

        let full_path = self.base_path.join(locator);

        if let Ok(canonical) = full_path.canonicalize()
            && let Some(ref base) = self.canonical_base
        {
            return canonical.starts_with(base).then_some(canonical);
        }

        // Not on disk yet: fall back to a lexical check
        if Path::new(locator)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }

        Some(full_path)
    }
}

impl LayerSource for FilesystemLayerSource {
    fn fetch(&self, layer: &LayerSpec, request: &TileRequest) -> Result<SharedLayerData, LayerError> {
        let locator = layer.locator();
        let full_path = self
            .resolve_path_safe(locator)
            .ok_or_else(|| LayerError::FetchFailed {
                layer: layer.name.clone(),
                message: format!("'{}' is outside of {}", locator, self.base_path.display()),
            })?;

        debug!(
            "Reading layer '{}' from {} for {}x{}px",
            layer.name,
            full_path.display(),
            request.pixel_width,
            request.pixel_height
        );
        std::fs::read(&full_path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LayerError::NotFound(layer.name.clone())
            } else {
                LayerError::FetchFailed {
                    layer: layer.name.clone(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "FilesystemLayerSource"
    }
}
