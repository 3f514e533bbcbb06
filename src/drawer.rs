//! Compositing of map imagery into a resolved page rectangle.

use crate::transform::Transform;
use log::debug;
use mapsheet_render_core::{DrawSurface, RasterImage, RenderError};
use mapsheet_traits::{LayerSource, LayerSpec};
use mapsheet_types::{Color, Rect};
use std::sync::Arc;

const EXTENT_OUTLINE_WIDTH: f32 = 1.0;

/// Everything needed to draw one map region once its rectangle is known.
#[derive(Debug)]
pub struct MapDrawer {
    transform: Transform,
    layers: Vec<LayerSpec>,
    background: Option<Color>,
    /// Set for overview insets: the primary view whose extent is outlined.
    primary: Option<Transform>,
    source: Arc<dyn LayerSource>,
}

impl MapDrawer {
    pub fn new(transform: Transform, layers: Vec<LayerSpec>, source: Arc<dyn LayerSource>) -> Self {
        Self {
            transform,
            layers,
            background: None,
            primary: None,
            source,
        }
    }

    /// An inset showing `primary` zoomed out by `factor`, with the primary
    /// extent outlined.
    pub fn overview(
        primary: Transform,
        factor: f64,
        layers: Vec<LayerSpec>,
        source: Arc<dyn LayerSource>,
    ) -> Self {
        Self {
            transform: primary.zoom(factor),
            layers,
            background: None,
            primary: Some(primary),
            source,
        }
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    /// Draw the map clipped to `rect`.
    ///
    /// The graphics state is restored even when a layer fails; the error is
    /// returned afterwards.
    pub fn render(&self, rect: Rect, surface: &mut dyn DrawSurface) -> Result<(), RenderError> {
        surface.save_state();
        surface.clip(rect);
        let result = self.draw(rect, surface);
        surface.restore_state();
        result
    }

    fn draw(&self, rect: Rect, surface: &mut dyn DrawSurface) -> Result<(), RenderError> {
        if let Some(color) = self.background {
            surface.fill_rect(rect, color);
        }

        let request = self.transform.tile_request();
        debug!(
            "Drawing {} layer(s) at 1:{} into {:?}",
            self.layers.len(),
            self.transform.scale(),
            rect
        );
        for layer in &self.layers {
            let data = self.source.fetch(layer, &request)?;
            let image = RasterImage::decode(&layer.name, &data)?;
            surface.draw_image(rect, &image, layer.opacity)?;
        }

        if let Some(primary) = &self.primary {
            let extent = self.extent_of(primary, rect);
            surface.stroke_rect(extent, Color::RED, EXTENT_OUTLINE_WIDTH);
        }
        Ok(())
    }

    /// Where the ground extent of `other` falls inside `rect`.
    fn extent_of(&self, other: &Transform, rect: Rect) -> Rect {
        let [min_x, min_y, max_x, max_y] = self.transform.bbox();
        let [o_min_x, o_min_y, o_max_x, o_max_y] = other.bbox();
        let sx = f64::from(rect.width) / (max_x - min_x);
        let sy = f64::from(rect.height) / (max_y - min_y);
        Rect::from_corners(
            rect.x + ((o_min_x - min_x) * sx) as f32,
            rect.y + ((o_min_y - min_y) * sy) as f32,
            rect.x + ((o_max_x - min_x) * sx) as f32,
            rect.y + ((o_max_y - min_y) * sy) as f32,
        )
    }
}
