//! Core rendering abstractions for mapsheet.
//!
//! This crate provides the seams between the document builder and the engines
//! that lay out and write pages:
//! - `ContentSink` for adding flowing content and reserving placeholders
//! - `DocumentFinalizer` for reporting resolved placeholder positions
//! - `DrawSurface` for compositing map imagery
//! - Error types for rendering operations

mod error;
mod recording;
mod traits;
mod types;
pub mod utils;

pub use error::RenderError;
pub use recording::{DrawCommand, RecordingSurface};
pub use traits::{ContentSink, DocumentFinalizer, DrawSurface, ResolvedFn};
pub use types::RasterImage;
