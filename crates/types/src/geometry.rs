use serde::{Deserialize, Serialize};

/// A rectangle in page space, in points, with the origin at the bottom-left
/// corner of the page (PDF convention). `(x, y)` is the lower-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from its lower-left and upper-right corners.
    pub fn from_corners(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self {
            x: llx,
            y: lly,
            width: urx - llx,
            height: ury - lly,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn bottom(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// `(llx, lly, urx, ury)`
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        (self.left(), self.bottom(), self.right(), self.top())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Horizontal alignment of a flow element inside the content column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Returns the x offset of an element of `width` inside a column of
    /// `available` width.
    pub fn offset(self, available: f32, width: f32) -> f32 {
        let slack = (available - width).max(0.0);
        match self {
            Alignment::Left => 0.0,
            Alignment::Center => slack / 2.0,
            Alignment::Right => slack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_round_trips_edges() {
        let rect = Rect::from_corners(100.0, 120.0, 150.0, 200.0);
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.height, 80.0);
        assert_eq!(rect.corners(), (100.0, 120.0, 150.0, 200.0));
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(Alignment::Left.offset(500.0, 300.0), 0.0);
        assert_eq!(Alignment::Center.offset(500.0, 300.0), 100.0);
        assert_eq!(Alignment::Right.offset(500.0, 300.0), 200.0);
        // Wider than the column: never pushed left of the margin
        assert_eq!(Alignment::Center.offset(100.0, 300.0), 0.0);
    }
}
