//! Print configuration: allowed DPIs and scales, default units and layouts.
//!
//! The configuration is a JSON document with camelCase keys:
//!
//! ```json
//! {
//!   "dpis": [72, 150, 300],
//!   "scales": [1000, 5000, 25000],
//!   "units": "m",
//!   "layouts": [{
//!     "name": "A4 portrait",
//!     "pageSize": [595, 842],
//!     "mainPage": { "items": [
//!       { "type": "text", "text": "${title}", "fontSize": 16, "align": "center" },
//!       { "type": "map", "width": 340, "height": 453, "spacingAfter": 10 }
//!     ]}
//!   }]
//! }
//! ```

use crate::blocks::{Block, MapBlock};
use crate::error::PrintError;
use crate::transform::UnitSystem;
use mapsheet_layout::PageGeometry;
use serde::Deserialize;
use std::fs;
use std::path::Path;

fn default_page_size() -> [f32; 2] {
    [595.0, 842.0]
}

fn default_margin() -> f32 {
    36.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintConfig {
    /// DPIs a request may ask for.
    pub dpis: Vec<u32>,
    /// Scales offered to clients.
    #[serde(default)]
    pub scales: Vec<f64>,
    /// Unit system used when a request does not name one.
    #[serde(default)]
    pub units: Option<String>,
    pub layouts: Vec<Layout>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub name: String,
    #[serde(default = "default_page_size")]
    pub page_size: [f32; 2],
    #[serde(default = "default_margin")]
    pub margin: f32,
    #[serde(default)]
    pub main_page: MainPage,
}

/// Blocks rendered, in order, for every page of a request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainPage {
    #[serde(default)]
    pub items: Vec<Block>,
}

impl PrintConfig {
    pub fn from_json(json: &str) -> Result<Self, PrintError> {
        let config: PrintConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PrintError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read configuration from '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), PrintError> {
        if self.dpis.is_empty() {
            return Err(PrintError::missing("dpis"));
        }
        if self.layouts.is_empty() {
            return Err(PrintError::missing("layouts"));
        }
        self.default_units()?;
        for layout in &self.layouts {
            let [width, height] = layout.page_size;
            if width <= 2.0 * layout.margin || height <= 2.0 * layout.margin {
                return Err(PrintError::invalid(
                    "pageSize",
                    format!("{}x{} with margin {} in layout '{}'", width, height, layout.margin, layout.name),
                ));
            }
            for map in layout.map_blocks() {
                if !(map.width.is_finite() && map.width > 0.0) {
                    return Err(PrintError::invalid("width", map.width));
                }
                if !(map.height.is_finite() && map.height > 0.0) {
                    return Err(PrintError::invalid("height", map.height));
                }
                // Used as a zoom divisor for the inset
                if let Some(factor) = map.overview_map
                    && !(factor.is_finite() && factor > 0.0)
                {
                    return Err(PrintError::invalid("overviewMap", factor));
                }
            }
        }
        Ok(())
    }

    pub fn default_units(&self) -> Result<Option<UnitSystem>, PrintError> {
        self.units.as_deref().map(str::parse::<UnitSystem>).transpose()
    }

    /// The layout called `name`, or the first layout when no name is given.
    pub fn layout(&self, name: Option<&str>) -> Result<&Layout, PrintError> {
        match name {
            Some(name) => self
                .layouts
                .iter()
                .find(|l| l.name == name)
                .ok_or_else(|| PrintError::invalid("layout", name)),
            None => self.layouts.first().ok_or_else(|| PrintError::missing("layouts")),
        }
    }
}

impl Layout {
    pub fn geometry(&self) -> PageGeometry {
        let [width, height] = self.page_size;
        PageGeometry::new(width, height, self.margin)
    }

    pub fn map_blocks(&self) -> impl Iterator<Item = &MapBlock> {
        self.main_page.items.iter().filter_map(|block| match block {
            Block::Map(map) => Some(map),
            Block::Text(_) => None,
        })
    }

    /// The map a client should size its preview after: the first one that is
    /// not an overview.
    pub fn main_map(&self) -> Option<&MapBlock> {
        self.map_blocks().find(|map| !map.is_overview())
    }
}
