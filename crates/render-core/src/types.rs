use mapsheet_traits::LayerError;

/// A decoded 8-bit RGB raster with an optional alpha plane.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triplets, `width * height * 3` bytes.
    pub rgb: Vec<u8>,
    /// Row-major alpha values, `width * height` bytes, when the source had any.
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    /// Decode the encoded imagery a layer source returned for `layer`.
    pub fn decode(layer: &str, bytes: &[u8]) -> Result<Self, LayerError> {
        let img = image::load_from_memory(bytes).map_err(|e| LayerError::InvalidImage {
            layer: layer.to_string(),
            message: e.to_string(),
        })?;

        let alpha = if img.color().has_alpha() {
            Some(img.to_rgba8().pixels().map(|p| p.0[3]).collect())
        } else {
            None
        };
        let rgb = img.to_rgb8();
        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            rgb: rgb.into_raw(),
            alpha,
        })
    }

    /// A single-color opaque raster, mostly useful in tests.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = (width * height) as usize;
        Self {
            width,
            height,
            rgb: rgb.iter().copied().cycle().take(pixels * 3).collect(),
            alpha: None,
        }
    }
}
