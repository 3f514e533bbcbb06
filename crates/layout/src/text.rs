//! Approximate text measurement and greedy word wrapping.
//!
//! Only the base-14 Helvetica face is used for captions, so widths are
//! estimated from an average glyph advance rather than shaped.

/// Average Helvetica advance as a fraction of the font size.
pub const AVERAGE_ADVANCE: f32 = 0.5;

/// Baseline-to-baseline distance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

pub fn measure(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVERAGE_ADVANCE
}

pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_HEIGHT_FACTOR
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit newlines always break. A single word wider than the line is kept
/// whole on its own line.
pub fn wrap(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate_width = measure(&current, font_size) + measure(" ", font_size) + measure(word, font_size);
            if candidate_width > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                current.push(' ');
                current.push_str(word);
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
