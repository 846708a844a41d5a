use crate::util::range::NumRange;
use derive_more::{
    Add, AddAssign, Display, Div, DivAssign, From, Into, Mul, MulAssign, Neg,
    Sub, SubAssign, Sum,
};
use serde::{Deserialize, Serialize};
use std::ops;

/// A 2D point in screen space, measured in pixels. X grows to the right, Y
/// grows downward. This is also used for screen-space offsets (e.g. camera
/// pan), since the arithmetic is identical.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    PartialOrd,
    From,
    Into,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Sum,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {})", "self.x", "self.y")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance between two points, in pixels
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An RGB color. Values are stored as floats between 0 and 1 (inclusive).
/// This uses f32 because the extra precision from f64 is pointless. Colors are
/// opaque to all the projection math, they're just carried along so renderers
/// can paint tiles.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color3 {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color3 {
    /// The valid range of values for each component in RGB
    const COMPONENT_RANGE: NumRange<f32> = NumRange::new(0.0, 1.0);

    /// Create a new RGB color from integer components in the [0,255] range.
    pub const fn new_int(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
        }
    }

    /// Convert this number to a set of 3 bytes: `(red, green, blue)`
    pub fn to_ints(self) -> (u8, u8, u8) {
        (
            (self.red * 255.0).round() as u8,
            (self.green * 255.0).round() as u8,
            (self.blue * 255.0).round() as u8,
        )
    }

    /// Convert this color to an HTML color code: `#rrggbb`
    pub fn to_html(self) -> String {
        let (r, g, b) = self.to_ints();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

// Scale a color by a constant. Used to shade the side walls of a tile.
impl ops::Mul<f32> for Color3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        let red = Self::COMPONENT_RANGE.clamp(self.red * rhs);
        let green = Self::COMPONENT_RANGE.clamp(self.green * rhs);
        let blue = Self::COMPONENT_RANGE.clamp(self.blue * rhs);
        // It's safe to bypass the constructor here because we just clamped
        // all 3 components to the valid range
        Self { red, green, blue }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_point_distance() {
        let a = Point2::new(128.0, 125.0);
        let b = Point2::new(131.0, 129.0);
        assert_approx_eq!(a.distance_to(b), 5.0);
        assert_approx_eq!(b.distance_to(a), 5.0);
        assert_approx_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn test_point_arithmetic() {
        let anchor = Point2::new(128.0, 96.0);
        let pan = Point2::new(-4.0, 2.5);
        assert_eq!(anchor + pan, Point2::new(124.0, 98.5));
        assert_eq!(anchor - pan, Point2::new(132.0, 93.5));
        assert_eq!(pan * 2.0, Point2::new(-8.0, 5.0));
    }

    #[test]
    fn test_color_html() {
        assert_eq!(Color3::new_int(20, 77, 163).to_html(), "#144da3");
        assert_eq!(Color3::new_int(0, 0, 0).to_html(), "#000000");
        assert_eq!((Color3::new_int(255, 128, 0) * 0.5).to_html(), "#804000");
    }

    #[test]
    fn test_color_shade_clamps() {
        let color = Color3::new_int(200, 100, 0) * 2.0;
        assert_approx_eq!(color.red, 1.0);
        assert_approx_eq!(color.blue, 0.0);
        assert_eq!(color.to_html(), "#ffc800");
        let color = Color3::new_int(200, 100, 0) * -1.0;
        assert_eq!(color.to_html(), "#000000");
    }
}
