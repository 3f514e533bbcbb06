use crate::spec::PageParams;
use mapsheet_render_core::ContentSink;
use mapsheet_types::Alignment;
use serde::Deserialize;

fn default_font_size() -> f32 {
    12.0
}

/// A paragraph of Helvetica text. `${name}` references are filled in from the
/// page parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default)]
    pub spacing_after: f32,
}

impl TextBlock {
    pub fn render(&self, params: &PageParams<'_>, target: &mut dyn ContentSink) {
        let content = params.substitute(&self.text);
        target.add_paragraph(&content, self.font_size, self.align, self.spacing_after);
    }
}
