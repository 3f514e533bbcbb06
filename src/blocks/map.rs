use crate::blocks::RenderingContext;
use crate::deferred::{AbsoluteSlot, RenderCallback};
use crate::drawer::MapDrawer;
use crate::error::PrintError;
use crate::spec::PageParams;
use crate::transform::Transform;
use log::{debug, warn};
use mapsheet_render_core::ContentSink;
use mapsheet_types::{Alignment, Color, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A map region on the page.
///
/// Without absolute coordinates the map takes part in the content flow and
/// its position is resolved when the document is assembled. With both
/// `absoluteX` and `absoluteY` it is drawn over the page content with its top
/// left corner at that point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapBlock {
    pub width: f32,
    pub height: f32,
    pub spacing_after: f32,
    pub align: Alignment,
    pub absolute_x: Option<f32>,
    pub absolute_y: Option<f32>,
    /// Scale factor of an overview inset. Unset for the primary map.
    pub overview_map: Option<f64>,
    pub background_color: Option<Color>,
}

impl Default for MapBlock {
    fn default() -> Self {
        Self {
            width: 340.0,
            height: 453.0,
            spacing_after: 0.0,
            align: Alignment::Center,
            absolute_x: None,
            absolute_y: None,
            overview_map: None,
            background_color: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Flow {
        spacing_after: f32,
        alignment: Alignment,
    },
    /// `(x, y)` is the top-left corner in page coordinates.
    Absolute {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl Placement {
    /// The page rectangle of an absolute placement.
    pub fn rect(&self) -> Option<Rect> {
        match *self {
            Placement::Absolute { x, y, width, height } => Some(absolute_rect(x, y, width, height)),
            Placement::Flow { .. } => None,
        }
    }
}

// The anchor is the top-left corner; the box extends right and down.
fn absolute_rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect::from_corners(x, y - height, x + width, y)
}

/// What a client needs to reserve room for the map in its own preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapClientConfig {
    pub width: f32,
    pub height: f32,
}

impl MapBlock {
    pub fn is_overview(&self) -> bool {
        self.overview_map.is_some()
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute_x.is_some() && self.absolute_y.is_some()
    }

    pub fn placement(&self) -> Placement {
        match (self.absolute_x, self.absolute_y) {
            (Some(x), Some(y)) => Placement::Absolute {
                x,
                y,
                width: self.width,
                height: self.height,
            },
            (x, y) => {
                if x.is_some() || y.is_some() {
                    warn!(
                        "Map block has only one of absoluteX/absoluteY set ({:?}, {:?}); placing it in the flow",
                        x, y
                    );
                }
                Placement::Flow {
                    spacing_after: self.spacing_after,
                    alignment: self.align,
                }
            }
        }
    }

    pub fn client_config(&self) -> MapClientConfig {
        MapClientConfig {
            width: self.width,
            height: self.height,
        }
    }

    /// Resolve the view, then either reserve room in the flow or register an
    /// absolute slot on the current page.
    pub fn render(
        &self,
        params: &PageParams<'_>,
        target: &mut dyn ContentSink,
        context: &mut RenderingContext,
    ) -> Result<(), PrintError> {
        let transform = Transform::build(&params.view_request()?, self.width, self.height, &context.document)?;
        let paper = transform.paper_size();

        let layers = params.layers("layers")?;
        let drawer = match self.overview_map {
            Some(factor) => {
                let overview_layers = params.layers("overviewLayers")?;
                let layers = if overview_layers.is_empty() { layers } else { overview_layers };
                MapDrawer::overview(transform, factor, layers, Arc::clone(&context.layers))
            }
            None => MapDrawer::new(transform, layers, Arc::clone(&context.layers)),
        }
        .with_background(self.background_color);
        let callback: RenderCallback = Box::new(move |rect, surface| drawer.render(rect, surface));

        match self.placement() {
            Placement::Absolute { x, y, width, height } => {
                let page = target.current_page();
                let rect = absolute_rect(x, y, width, height);
                debug!("Map block placed absolutely on page {} at {:?}", page, rect);
                context.registry.reserve_absolute(AbsoluteSlot { page, rect }, callback);
            }
            Placement::Flow { spacing_after, alignment } => {
                let placeholder = target.reserve_placeholder(paper, alignment, spacing_after);
                debug!("Map block placed in the flow as {}", placeholder);
                context.registry.reserve_flow(placeholder, callback);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::PrintSpec;
    use crate::transform::{DocumentContext, UnitSystem};
    use mapsheet_layout::FlowLayout;
    use mapsheet_traits::InMemoryLayerSource;

    fn block(json: &str) -> MapBlock {
        serde_json::from_str(json).unwrap()
    }

    fn context() -> RenderingContext {
        RenderingContext::new(
            DocumentContext {
                allowed_dpis: vec![72, 150, 300],
                global_dpi: None,
                units: UnitSystem::Meters,
            },
            Arc::new(InMemoryLayerSource::new()),
        )
    }

    #[test]
    fn defaults_match_a_portrait_map() {
        let map = block("{}");
        assert_eq!((map.width, map.height, map.spacing_after), (340.0, 453.0, 0.0));
        assert_eq!(map.align, Alignment::Center);
        assert!(!map.is_overview());
        assert!(!map.is_absolute());
    }

    #[test]
    fn absolute_only_when_both_coordinates_are_set() {
        assert!(matches!(block("{}").placement(), Placement::Flow { .. }));
        assert!(matches!(block(r#"{"absoluteX": 100}"#).placement(), Placement::Flow { .. }));
        assert!(matches!(block(r#"{"absoluteY": 200}"#).placement(), Placement::Flow { .. }));
        assert!(matches!(
            block(r#"{"absoluteX": 100, "absoluteY": 200}"#).placement(),
            Placement::Absolute { .. }
        ));
    }

    #[test]
    fn absolute_rect_extends_down_and_right_from_anchor() {
        let map = block(r#"{"absoluteX": 100, "absoluteY": 200, "width": 50, "height": 80}"#);
        let rect = map.placement().rect().unwrap();
        assert_eq!(rect.corners(), (100.0, 120.0, 150.0, 200.0));
    }

    #[test]
    fn single_coordinate_keeps_flow_spacing_and_alignment() {
        let map = block(r#"{"absoluteX": 10, "spacingAfter": 12, "align": "left"}"#);
        assert_eq!(
            map.placement(),
            Placement::Flow {
                spacing_after: 12.0,
                alignment: Alignment::Left,
            }
        );
    }

    #[test]
    fn client_config_exposes_only_size() {
        let map = block(r#"{"width": 200, "height": 100, "overviewMap": 4, "absoluteX": 1, "absoluteY": 2}"#);
        let json = serde_json::to_value(map.client_config()).unwrap();
        assert_eq!(json, serde_json::json!({"width": 200.0, "height": 100.0}));
    }

    #[test]
    fn flow_render_reserves_placeholder_and_registers() {
        let spec = PrintSpec::parse(r#"{"center": [5, 10], "scale": 1000, "dpi": 72}"#).unwrap();
        let page = spec.pages().unwrap()[0];
        let mut layout = FlowLayout::default();
        let mut ctx = context();

        block(r#"{"spacingAfter": 5}"#).render(&page, &mut layout, &mut ctx).unwrap();

        assert_eq!(ctx.registry.pending(), 1);
        let doc = layout.finish();
        let (_, _, rect) = doc.placeholders().next().unwrap();
        assert_eq!((rect.width, rect.height), (340.0, 453.0));
    }

    #[test]
    fn absolute_render_does_not_touch_the_flow() {
        let spec = PrintSpec::parse(r#"{"center": [5, 10], "scale": 1000, "dpi": 72}"#).unwrap();
        let page = spec.pages().unwrap()[0];
        let mut layout = FlowLayout::default();
        let mut ctx = context();

        block(r#"{"absoluteX": 100, "absoluteY": 200, "width": 50, "height": 80}"#)
            .render(&page, &mut layout, &mut ctx)
            .unwrap();

        assert_eq!(ctx.registry.pending(), 1);
        assert_eq!(layout.finish().placeholders().count(), 0);
    }

    #[test]
    fn transform_errors_propagate_unchanged() {
        let spec = PrintSpec::parse(r#"{"center": [5, 10], "scale": 1000, "dpi": 96}"#).unwrap();
        let page = spec.pages().unwrap()[0];
        let mut layout = FlowLayout::default();
        let mut ctx = context();

        let err = block("{}").render(&page, &mut layout, &mut ctx).unwrap_err();
        assert!(matches!(err, PrintError::InvalidConfiguration { ref field, ref value } if field == "dpi" && value == "96"));
        assert!(ctx.registry.is_empty());
    }
}
