use crate::error::RenderError;
use crate::types::RasterImage;
use mapsheet_types::{Alignment, Color, PlaceholderId, Rect, Size};

/// A drawing target a map region is composited onto.
///
/// Coordinates are page points with the origin at the bottom-left corner.
pub trait DrawSurface {
    fn save_state(&mut self);

    fn restore_state(&mut self);

    /// Intersect the clipping path with `rect` until the matching restore.
    fn clip(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);

    /// Draw `image` scaled to fill `rect`.
    fn draw_image(&mut self, rect: Rect, image: &RasterImage, opacity: f32)
    -> Result<(), RenderError>;
}

/// The flowing-content side of the layout engine.
///
/// Blocks add text and reserve space here while the document is being built;
/// actual positions are only known once the engine finishes.
pub trait ContentSink {
    /// Append a paragraph of plain text to the flow.
    fn add_paragraph(&mut self, text: &str, font_size: f32, alignment: Alignment, spacing_after: f32);

    /// Reserve an empty box of `size` in the flow and return its handle.
    fn reserve_placeholder(
        &mut self,
        size: Size,
        alignment: Alignment,
        spacing_after: f32,
    ) -> PlaceholderId;

    /// Force subsequent content onto a fresh page.
    fn new_page(&mut self);

    /// Zero-based index of the page content is currently flowing into.
    fn current_page(&self) -> usize;
}

/// Callback a finalizer invokes for each placeholder as it is positioned.
pub type ResolvedFn<'a> =
    dyn FnMut(PlaceholderId, Rect, &mut dyn DrawSurface) -> Result<(), RenderError> + 'a;

/// The assembly side of the layout engine.
pub trait DocumentFinalizer {
    /// Emit the flowing content page by page, calling `on_resolved` for every
    /// placeholder in reading order with its final rectangle and the surface
    /// of the page it landed on.
    fn emit_flow(&mut self, on_resolved: &mut ResolvedFn<'_>) -> Result<(), RenderError>;

    /// The overlay surface of `page`, drawn above the flowing content.
    fn overlay(&mut self, page: usize) -> Result<&mut dyn DrawSurface, RenderError>;
}
