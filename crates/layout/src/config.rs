
/// Physical page setup, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Uniform margin applied on all four sides.
    pub margin: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// A4 portrait with half-inch margins.
    pub fn a4() -> Self {
        Self::new(595.0, 842.0, 36.0)
    }

    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(0.0)
    }

    pub fn content_height(&self) -> f32 {
        (self.height - 2.0 * self.margin).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
