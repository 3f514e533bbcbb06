pub mod color;
pub mod geometry;
pub mod ids;

pub use color::Color;
pub use geometry::{Alignment, Rect, Size};
pub use ids::PlaceholderId;
