use crate::config::PageGeometry;
use mapsheet_types::{PlaceholderId, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub content: String,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    Text(TextLine),
    /// Reserved room whose content is drawn by a deferred callback.
    Placeholder(PlaceholderId),
}

/// An element with its final rectangle in PDF page space.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedElement {
    pub element: LayoutElement,
    pub rect: Rect,
}

/// The output of a finished flow layout: positioned elements grouped by page,
/// in reading order.
#[derive(Debug, Clone)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Vec<PositionedElement>>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Placeholders in reading order with the page they landed on.
    pub fn placeholders(&self) -> impl Iterator<Item = (usize, PlaceholderId, Rect)> + '_ {
        self.pages.iter().enumerate().flat_map(|(page, elements)| {
            elements.iter().filter_map(move |el| match el.element {
                LayoutElement::Placeholder(id) => Some((page, id, el.rect)),
                LayoutElement::Text(_) => None,
            })
        })
    }
}
