//! Map view geometry.
//!
//! Converts a requested view (center, scale, DPI) and a paper rectangle into
//! the ground extent and raster size a layer source has to produce. Pure and
//! deterministic; nothing in here touches the network or the document.

use crate::error::PrintError;
use mapsheet_render_core::utils::{POINTS_PER_INCH, points_to_pixels};
use mapsheet_traits::TileRequest;
use mapsheet_types::Size;
use std::fmt;
use std::str::FromStr;

/// The ground unit system map coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Meters,
    Kilometers,
    Feet,
    Miles,
    Inches,
    Degrees,
}

impl UnitSystem {
    pub fn inches_per_unit(self) -> f64 {
        match self {
            UnitSystem::Meters => 39.37,
            UnitSystem::Kilometers => 39_370.0,
            UnitSystem::Feet => 12.0,
            UnitSystem::Miles => 63_360.0,
            UnitSystem::Inches => 1.0,
            UnitSystem::Degrees => 4_374_754.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Meters => "m",
            UnitSystem::Kilometers => "km",
            UnitSystem::Feet => "ft",
            UnitSystem::Miles => "mi",
            UnitSystem::Inches => "in",
            UnitSystem::Degrees => "degrees",
        }
    }
}

impl FromStr for UnitSystem {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" => Ok(UnitSystem::Meters),
            "km" => Ok(UnitSystem::Kilometers),
            "ft" => Ok(UnitSystem::Feet),
            "mi" => Ok(UnitSystem::Miles),
            "in" => Ok(UnitSystem::Inches),
            "degrees" | "dd" => Ok(UnitSystem::Degrees),
            _ => Err(PrintError::invalid("units", s)),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View parameters as they arrive with one map region of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRequest {
    pub center: Option<(f64, f64)>,
    pub scale: Option<f64>,
    pub dpi: Option<u32>,
}

/// Document-wide settings a view inherits.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub allowed_dpis: Vec<u32>,
    /// The request-level DPI, used when a region does not set its own.
    pub global_dpi: Option<u32>,
    pub units: UnitSystem,
}

/// The resolved geometry of one map region.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    center: (f64, f64),
    scale: f64,
    dpi: u32,
    units: UnitSystem,
    paper: Size,
    pixel_width: u32,
    pixel_height: u32,
    ground_width: f64,
    ground_height: f64,
}

impl Transform {
    /// Resolve `request` for a region `width` x `height` points large.
    ///
    /// # Errors
    ///
    /// - `MissingField("dpi")` when neither the region nor the document sets a DPI
    /// - `InvalidConfiguration { field: "dpi" }` when the resolved DPI is not allowed
    /// - `MissingField("center")` / `MissingField("scale")` when either is absent
    pub fn build(
        request: &ViewRequest,
        width: f32,
        height: f32,
        context: &DocumentContext,
    ) -> Result<Self, PrintError> {
        let dpi = request
            .dpi
            .or(context.global_dpi)
            .ok_or_else(|| PrintError::missing("dpi"))?;
        if !context.allowed_dpis.contains(&dpi) {
            return Err(PrintError::invalid("dpi", dpi));
        }
        let center = request.center.ok_or_else(|| PrintError::missing("center"))?;
        let scale = request.scale.ok_or_else(|| PrintError::missing("scale"))?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(PrintError::invalid("scale", scale));
        }

        Ok(Self::from_parts(center, scale, dpi, context.units, Size::new(width, height)))
    }

    fn from_parts(center: (f64, f64), scale: f64, dpi: u32, units: UnitSystem, paper: Size) -> Self {
        let to_ground = |points: f32| f64::from(points) / f64::from(POINTS_PER_INCH) * scale / units.inches_per_unit();
        Self {
            center,
            scale,
            dpi,
            units,
            paper,
            pixel_width: points_to_pixels(paper.width, dpi),
            pixel_height: points_to_pixels(paper.height, dpi),
            ground_width: to_ground(paper.width),
            ground_height: to_ground(paper.height),
        }
    }

    /// The same region at `factor` times the scale, for overview insets.
    pub fn zoom(&self, factor: f64) -> Self {
        Self::from_parts(self.center, self.scale * factor, self.dpi, self.units, self.paper)
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Target rectangle size in points.
    pub fn paper_size(&self) -> Size {
        self.paper
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    /// Ground extent in map units.
    pub fn ground_size(&self) -> (f64, f64) {
        (self.ground_width, self.ground_height)
    }

    /// `[min_x, min_y, max_x, max_y]` in map units.
    pub fn bbox(&self) -> [f64; 4] {
        let (cx, cy) = self.center;
        let (hw, hh) = (self.ground_width / 2.0, self.ground_height / 2.0);
        [cx - hw, cy - hh, cx + hw, cy + hh]
    }

    pub fn tile_request(&self) -> TileRequest {
        TileRequest {
            bbox: self.bbox(),
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
            dpi: self.dpi,
            scale: self.scale,
            units: self.units.as_str().to_string(),
        }
    }
}
