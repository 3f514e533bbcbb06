#![allow(dead_code)]

pub mod pdf_assertions;

use image::{ImageBuffer, ImageFormat, Rgb};
use lopdf::Document as LopdfDocument;
use mapsheet::{MapPrinter, PrintConfig};
use mapsheet_traits::InMemoryLayerSource;
use std::io::Cursor;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A4 layouts exercising every block kind.
pub const CONFIG: &str = r##"{
    "dpis": [72, 150, 300],
    "scales": [1000, 5000, 25000],
    "units": "m",
    "layouts": [
        {
            "name": "A4 portrait",
            "mainPage": { "items": [
                { "type": "text", "text": "${title}", "fontSize": 16, "align": "center", "spacingAfter": 8 },
                { "type": "map", "width": 340, "height": 453, "spacingAfter": 10 },
                { "type": "text", "text": "Scale 1:${scale}" }
            ]}
        },
        {
            "name": "With overview",
            "mainPage": { "items": [
                { "type": "map", "width": 400, "height": 400, "backgroundColor": "#ffffff" },
                { "type": "map", "width": 120, "height": 120, "overviewMap": 10, "absoluteX": 440, "absoluteY": 806 }
            ]}
        }
    ]
}"##;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

/// A small opaque PNG of one color.
pub fn png(rgb: [u8; 3]) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encoding a test PNG");
    out.into_inner()
}

/// A layer source serving `base`, `roads` and `overview`.
pub fn layers() -> Arc<InMemoryLayerSource> {
    let source = InMemoryLayerSource::new();
    for (name, color) in [("base", [200, 220, 200]), ("roads", [90, 90, 90]), ("overview", [10, 10, 200])] {
        source.add(name, png(color)).expect("registering a test layer");
    }
    Arc::new(source)
}

pub fn printer() -> MapPrinter {
    MapPrinter::new(
        PrintConfig::from_json(CONFIG).expect("valid test configuration"),
        layers(),
    )
    .expect("valid printer")
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
