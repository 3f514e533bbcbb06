//! LayerSource trait for abstracting map imagery retrieval.
//!
//! A map region is composited from one or more layers. The core only knows
//! the geometry of the view; producing pixels for that view is the job of a
//! `LayerSource`, which may read tiles from a server, a cache or memory.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Error type for layer retrieval.
#[derive(Error, Debug, Clone)]
pub enum LayerError {
    #[error("Layer '{0}' is not available from this source")]
    NotFound(String),

    #[error("Failed to fetch layer '{layer}': {message}")]
    FetchFailed { layer: String, message: String },

    #[error("Layer '{layer}' returned unusable imagery: {message}")]
    InvalidImage { layer: String, message: String },
}

impl LayerError {
    /// The name of the layer that failed.
    pub fn layer(&self) -> &str {
        match self {
            LayerError::NotFound(layer) => layer,
            LayerError::FetchFailed { layer, .. } => layer,
            LayerError::InvalidImage { layer, .. } => layer,
        }
    }
}

/// Encoded image bytes (PNG, JPEG) as returned by a layer source.
pub type SharedLayerData = Arc<Vec<u8>>;

fn default_opacity() -> f32 {
    1.0
}

/// One entry of the request's `layers` array.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    /// Display name of the layer; also the lookup key when `source` is unset.
    pub name: String,
    /// Source-specific locator (a path, a URL, a cache key).
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Anything else the source understands (format, styles, ...).
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            opacity: 1.0,
            extra: HashMap::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The key a source should look the layer up by.
    pub fn locator(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}

/// The view a layer must be rendered for.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest {
    /// Ground bounding box `[min_x, min_y, max_x, max_y]` in `units`.
    pub bbox: [f64; 4],
    /// Raster size the imagery should have to match the requested DPI.
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub dpi: u32,
    pub scale: f64,
    pub units: String,
}

/// A trait for fetching map imagery for a given view.
///
/// # Implementations
///
/// - `InMemoryLayerSource`: serves pre-registered images (always available)
/// - `FilesystemLayerSource` (mapsheet-resource): serves images from a directory
pub trait LayerSource: Send + Sync + Debug {
    /// Fetch the imagery of `layer` covering `request`.
    ///
    /// The returned bytes are an encoded raster image; it is scaled into the
    /// target rectangle by the compositor.
    fn fetch(&self, layer: &LayerSpec, request: &TileRequest) -> Result<SharedLayerData, LayerError>;

    /// Returns a human-readable name for this source (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A layer source backed by images registered in memory, keyed by
/// `LayerSpec::locator`. The same image is served for every view.
#[derive(Debug, Default)]
pub struct InMemoryLayerSource {
    layers: std::sync::RwLock<HashMap<String, SharedLayerData>>,
}

impl InMemoryLayerSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded image bytes under `key`.
    ///
    /// # Errors
    ///
    /// Returns `LayerError::FetchFailed` if the internal lock is poisoned.
    pub fn add(&self, key: impl Into<String>, data: Vec<u8>) -> Result<(), LayerError> {
        let key = key.into();
        let mut layers = self.layers.write().map_err(|_| LayerError::FetchFailed {
            layer: key.clone(),
            message: "layer store lock poisoned".to_string(),
        })?;
        layers.insert(key, Arc::new(data));
        Ok(())
    }

    /// Get the number of registered layers.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.layers.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LayerSource for InMemoryLayerSource {
    fn fetch(&self, layer: &LayerSpec, _request: &TileRequest) -> Result<SharedLayerData, LayerError> {
        let layers = self.layers.read().map_err(|_| LayerError::FetchFailed {
            layer: layer.name.clone(),
            message: "layer store lock poisoned".to_string(),
        })?;
        layers
            .get(layer.locator())
            .cloned()
            .ok_or_else(|| LayerError::NotFound(layer.name.clone()))
    }

    fn name(&self) -> &'static str {
        "InMemoryLayerSource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TileRequest {
        TileRequest {
            bbox: [0.0, 0.0, 10.0, 10.0],
            pixel_width: 100,
            pixel_height: 100,
            dpi: 72,
            scale: 1000.0,
            units: "m".to_string(),
        }
    }

    #[test]
    fn test_in_memory_source_add_and_fetch() {
        let source = InMemoryLayerSource::new();
        source.add("roads", b"png-bytes".to_vec()).unwrap();

        let data = source.fetch(&LayerSpec::new("roads"), &request()).unwrap();
        assert_eq!(&*data, b"png-bytes");
    }

    #[test]
    fn test_in_memory_source_uses_locator_over_name() {
        let source = InMemoryLayerSource::new();
        source.add("tiles/base.png", b"base".to_vec()).unwrap();

        let layer = LayerSpec::new("Base map").with_source("tiles/base.png");
        assert_eq!(&*source.fetch(&layer, &request()).unwrap(), b"base");
    }

    #[test]
    fn test_in_memory_source_not_found_names_layer() {
        let source = InMemoryLayerSource::new();
        let err = source.fetch(&LayerSpec::new("missing"), &request()).unwrap_err();
        assert!(matches!(err, LayerError::NotFound(_)));
        assert_eq!(err.layer(), "missing");
    }

    #[test]
    fn test_layer_spec_deserializes_extra_fields() {
        let spec: LayerSpec = serde_json::from_str(
            r#"{"name": "ortho", "source": "ortho.png", "opacity": 0.5, "format": "image/png"}"#,
        )
        .unwrap();
        assert_eq!(spec.name, "ortho");
        assert_eq!(spec.locator(), "ortho.png");
        assert_eq!(spec.opacity, 0.5);
        assert_eq!(spec.extra.get("format").and_then(|v| v.as_str()), Some("image/png"));
    }

    #[test]
    fn test_layer_spec_defaults() {
        let spec: LayerSpec = serde_json::from_str(r#"{"name": "plain"}"#).unwrap();
        assert_eq!(spec.opacity, 1.0);
        assert!(spec.source.is_none());
        assert_eq!(spec.locator(), "plain");
    }

    #[test]
    fn test_layer_error_display() {
        let err = LayerError::FetchFailed {
            layer: "wms".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("wms"));
        assert!(err.to_string().contains("connection refused"));
    }
}
