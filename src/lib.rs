//! Map printing: PDF documents that embed map regions at a requested view.
//!
//! A [`MapPrinter`] lays out the blocks of a configured layout for every page
//! of a request. Map blocks do not know where they will end up when they are
//! laid out; they reserve space and register a drawing callback with the
//! [`DeferredBlockRegistry`], which fires once the PDF assembler reports the
//! final rectangles. Finished documents are delivered through the
//! [`DocumentTicketStore`], either streamed directly or parked under a
//! one-time ticket.
//!
//! # Example
//!
//! ```ignore
//! use mapsheet::{MapPrinter, PrintConfig};
//! use mapsheet_resource::FilesystemLayerSource;
//! use std::sync::Arc;
//!
//! let config = PrintConfig::from_file("print.json")?;
//! let printer = MapPrinter::new(config, Arc::new(FilesystemLayerSource::new("layers")))?;
//! let mut out = std::fs::File::create("map.pdf")?;
//! printer.print_json(r#"{"units": "m", "dpi": 150, "center": [5, 10], "scale": 1000}"#, &mut out)?;
//! ```

pub mod blocks;
pub mod config;
pub mod deferred;
pub mod drawer;
pub mod error;
pub mod printer;
pub mod spec;
pub mod tickets;
pub mod transform;

pub use blocks::{Block, MapBlock, MapClientConfig, Placement, RenderingContext, TextBlock};
pub use config::{Layout, PrintConfig};
pub use deferred::{AbsoluteSlot, DeferredBlockRegistry, RegistryEntry, RenderCallback, ResolutionReport};
pub use drawer::MapDrawer;
pub use error::PrintError;
pub use printer::{ClientInfo, LayoutInfo, MapPrinter};
pub use spec::{PageParams, PrintSpec};
pub use tickets::{DocumentTicket, DocumentTicketStore};
pub use transform::{DocumentContext, Transform, UnitSystem, ViewRequest};
