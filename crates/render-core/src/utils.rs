/// Convert a distance measured down from the top of the page into a PDF Y
/// coordinate (origin at the bottom).
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// Points per inch; PDF user space is defined in 1/72 inch units.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Number of raster pixels needed to cover `points` at `dpi`.
pub fn points_to_pixels(points: f32, dpi: u32) -> u32 {
    (points * dpi as f32 / POINTS_PER_INCH).round().max(1.0) as u32
}
