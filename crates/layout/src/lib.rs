//! Flow layout engine for mapsheet documents.
//!
//! Content is stacked top to bottom inside the page margins. Text paragraphs
//! are wrapped and positioned immediately; placeholders only reserve room and
//! are reported back to the registry when the document is assembled.

pub mod config;
mod elements;
mod engine;
pub mod text;

pub use self::config::PageGeometry;
pub use self::elements::{LaidOutDocument, LayoutElement, PositionedElement, TextLine};
pub use self::engine::FlowLayout;

// Re-export geometry types so engines share one definition
pub use mapsheet_types::{Alignment, PlaceholderId, Rect, Size};
