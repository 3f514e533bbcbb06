//! PDF assembly using lopdf.
//!
//! [`PdfAssembler`] turns a finished flow layout into a `lopdf::Document`.
//! Every page gets two content streams: the flowing content, then an overlay
//! that absolutely positioned regions are drawn onto.

mod assembler;
mod canvas;

pub use assembler::PdfAssembler;
pub use canvas::PdfCanvas;
