use crate::config::PageGeometry;
use crate::elements::{LaidOutDocument, LayoutElement, PositionedElement, TextLine};
use crate::text;
use log::{debug, warn};
use mapsheet_render_core::ContentSink;
use mapsheet_types::{Alignment, PlaceholderId, Rect, Size};

// Tolerance for floating point accumulation in the cursor
const EPSILON: f32 = 0.01;

/// A single-column flow layout.
///
/// `cursor` is the distance from the top of the content box to the next free
/// line. Elements are converted into PDF coordinates (bottom-left origin) as
/// they are placed.
#[derive(Debug)]
pub struct FlowLayout {
    geometry: PageGeometry,
    pages: Vec<Vec<PositionedElement>>,
    cursor: f32,
    next_placeholder: u32,
}

impl FlowLayout {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Vec::new()],
            cursor: 0.0,
            next_placeholder: 0,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Consume the engine and hand back every placed element.
    pub fn finish(self) -> LaidOutDocument {
        debug!(
            "Flow layout finished with {} page(s), {} placeholder(s)",
            self.pages.len(),
            self.next_placeholder
        );
        LaidOutDocument {
            geometry: self.geometry,
            pages: self.pages,
        }
    }

    fn remaining(&self) -> f32 {
        (self.geometry.content_height() - self.cursor).max(0.0)
    }

    fn page_is_empty(&self) -> bool {
        self.pages.last().is_none_or(|p| p.is_empty()) && self.cursor <= EPSILON
    }

    /// Break the page if an element of `height` would not fit, unless the
    /// page is still empty (a too-tall element goes at the top regardless).
    fn ensure_room(&mut self, height: f32) {
        if height > self.remaining() + EPSILON && !self.page_is_empty() {
            self.new_page();
        }
    }

    fn place(&mut self, element: LayoutElement, width: f32, height: f32, alignment: Alignment) -> Rect {
        let x = self.geometry.margin + alignment.offset(self.geometry.content_width(), width);
        let top = self.geometry.height - self.geometry.margin - self.cursor;
        let rect = Rect::new(x, top - height, width, height);
        self.cursor += height;
        if let Some(page) = self.pages.last_mut() {
            page.push(PositionedElement { element, rect });
        }
        rect
    }
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new(PageGeometry::default())
    }
}

impl ContentSink for FlowLayout {
    fn add_paragraph(&mut self, content: &str, font_size: f32, alignment: Alignment, spacing_after: f32) {
        let line_height = text::line_height(font_size);
        for line in text::wrap(content, font_size, self.geometry.content_width()) {
            self.ensure_room(line_height);
            let width = text::measure(&line, font_size).min(self.geometry.content_width());
            self.place(
                LayoutElement::Text(TextLine {
                    content: line,
                    font_size,
                }),
                width,
                line_height,
                alignment,
            );
        }
        self.cursor += spacing_after;
    }

    fn reserve_placeholder(&mut self, size: Size, alignment: Alignment, spacing_after: f32) -> PlaceholderId {
        let id = PlaceholderId::new(self.next_placeholder);
        self.next_placeholder += 1;

        if size.height > self.geometry.content_height() + EPSILON {
            warn!(
                "{} is {}pt tall but the page only has {}pt of content height; it will overflow",
                id,
                size.height,
                self.geometry.content_height()
            );
        }
        self.ensure_room(size.height);
        let rect = self.place(LayoutElement::Placeholder(id), size.width, size.height, alignment);
        debug!("Reserved {} on page {} at {:?}", id, self.current_page(), rect);
        self.cursor += spacing_after;
        id
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = 0.0;
    }

    fn current_page(&self) -> usize {
        self.pages.len() - 1
    }
}
