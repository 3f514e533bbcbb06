use crate::error::RenderError;
use crate::traits::DrawSurface;
use crate::types::RasterImage;
use mapsheet_types::{Color, Rect};

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SaveState,
    RestoreState,
    Clip(Rect),
    Fill(Rect, Color),
    Stroke(Rect, Color, f32),
    Image {
        rect: Rect,
        width: u32,
        height: u32,
        opacity: f32,
    },
}

/// A surface that records what was drawn on it instead of drawing.
///
/// Lets compositing code be tested without a document backend.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
    }
}

impl DrawSurface for RecordingSurface {
    fn save_state(&mut self) {
        self.commands.push(DrawCommand::SaveState);
    }

    fn restore_state(&mut self) {
        self.commands.push(DrawCommand::RestoreState);
    }

    fn clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clip(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::Stroke(rect, color, line_width));
    }

    fn draw_image(
        &mut self,
        rect: Rect,
        image: &RasterImage,
        opacity: f32,
    ) -> Result<(), RenderError> {
        self.commands.push(DrawCommand::Image {
            rect,
            width: image.width,
            height: image.height,
            opacity,
        });
        Ok(())
    }
}
