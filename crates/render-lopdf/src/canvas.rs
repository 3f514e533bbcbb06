use lopdf::Object;
use lopdf::content::{Content, Operation};
use mapsheet_render_core::{DrawSurface, RasterImage, RenderError};
use mapsheet_types::{Color, Rect};

/// Collects the content stream operations and resources for one layer of
/// one page.
///
/// Resource names carry the canvas prefix so the flow and overlay canvases
/// of a page can share a single resource dictionary.
#[derive(Debug)]
pub struct PdfCanvas {
    prefix: &'static str,
    operations: Vec<Operation>,
    pub(crate) images: Vec<(String, RasterImage)>,
    pub(crate) opacities: Vec<(String, f32)>,
}

impl PdfCanvas {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            operations: Vec::new(),
            images: Vec::new(),
            opacities: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Write a single line of Helvetica text with its baseline at `y`.
    pub fn draw_text(&mut self, x: f32, y: f32, font_size: f32, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.push("BT", vec![]);
        self.push("Tf", vec!["F1".into(), font_size.into()]);
        self.push("rg", vec![0.into(), 0.into(), 0.into()]);
        self.push("Td", vec![x.into(), y.into()]);
        self.push("Tj", vec![Object::string_literal(to_win_ansi(text))]);
        self.push("ET", vec![]);
    }

    /// The encoded content stream, wrapped in its own save/restore pair.
    pub(crate) fn encode(&mut self) -> Result<Vec<u8>, RenderError> {
        if self.operations.is_empty() {
            return Ok(Vec::new());
        }
        let mut operations = Vec::with_capacity(self.operations.len() + 2);
        operations.push(Operation::new("q", vec![]));
        operations.append(&mut self.operations);
        operations.push(Operation::new("Q", vec![]));
        Content { operations }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn rect_path(&mut self, rect: Rect) {
        self.push(
            "re",
            vec![rect.x.into(), rect.y.into(), rect.width.into(), rect.height.into()],
        );
    }

    fn opacity_state(&mut self, opacity: f32) -> String {
        if let Some((name, _)) = self.opacities.iter().find(|(_, a)| *a == opacity) {
            return name.clone();
        }
        let name = format!("{}Gs{}", self.prefix, self.opacities.len());
        self.opacities.push((name.clone(), opacity));
        name
    }
}

impl DrawSurface for PdfCanvas {
    fn save_state(&mut self) {
        self.push("q", vec![]);
    }

    fn restore_state(&mut self) {
        self.push("Q", vec![]);
    }

    fn clip(&mut self, rect: Rect) {
        self.rect_path(rect);
        self.push("W", vec![]);
        self.push("n", vec![]);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let [r, g, b] = color.unit_rgb();
        self.push("rg", vec![r.into(), g.into(), b.into()]);
        self.rect_path(rect);
        self.push("f", vec![]);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let [r, g, b] = color.unit_rgb();
        self.push("RG", vec![r.into(), g.into(), b.into()]);
        self.push("w", vec![line_width.into()]);
        self.rect_path(rect);
        self.push("S", vec![]);
    }

    fn draw_image(
        &mut self,
        rect: Rect,
        image: &RasterImage,
        opacity: f32,
    ) -> Result<(), RenderError> {
        if image.width == 0 || image.height == 0 {
            return Err(RenderError::Other("cannot draw an empty raster".into()));
        }
        let name = format!("{}Im{}", self.prefix, self.images.len());
        self.images.push((name.clone(), image.clone()));

        self.push("q", vec![]);
        if opacity < 1.0 {
            let state = self.opacity_state(opacity.clamp(0.0, 1.0));
            self.push("gs", vec![Object::Name(state.into_bytes())]);
        }
        self.push(
            "cm",
            vec![
                rect.width.into(),
                0.into(),
                0.into(),
                rect.height.into(),
                rect.x.into(),
                rect.y.into(),
            ],
        );
        self.push("Do", vec![Object::Name(name.into_bytes())]);
        self.push("Q", vec![]);
        Ok(())
    }
}

/// Map text onto the single-byte encoding the base-14 fonts use.
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}
