use crate::util::unit::Point2;
use serde::{Deserialize, Serialize};

/// Triangles whose (doubled) signed area is below this are considered
/// collapsed, and never contain any point.
const DEGENERATE_EPSILON: f64 = 1e-10;
/// Slack on the barycentric coordinates, so that points exactly on an edge
/// count as inside despite rounding.
const EDGE_EPSILON: f64 = 1e-9;

/// The screen-space outline of a single tile: a diamond roof plus the two
/// side walls that are visible from the front. Produced by
/// [IsometricProjector::tile_quad](crate::IsometricProjector::tile_quad).
///
/// ```text
///            top
///          /     \
///      left       right
///        | \     / |
///        |  bottom |
///  floor_left  |  floor_right
///          \   |   /
///        floor_bottom
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedQuad {
    pub top: Point2,
    pub left: Point2,
    pub right: Point2,
    pub bottom: Point2,
    pub floor_left: Point2,
    pub floor_bottom: Point2,
    pub floor_right: Point2,
}

impl ProjectedQuad {
    /// All seven vertices: the roof (top, left, right, bottom), then the
    /// floor (left, bottom, right)
    pub fn vertices(&self) -> [Point2; 7] {
        [
            self.top,
            self.left,
            self.right,
            self.bottom,
            self.floor_left,
            self.floor_bottom,
            self.floor_right,
        ]
    }

    /// Roof outline, clockwise from the top
    pub fn roof(&self) -> [Point2; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    /// Outline of the left-facing wall, clockwise from the roof's left corner
    pub fn left_wall(&self) -> [Point2; 4] {
        [self.left, self.bottom, self.floor_bottom, self.floor_left]
    }

    /// Outline of the right-facing wall, clockwise from the roof's bottom
    /// corner
    pub fn right_wall(&self) -> [Point2; 4] {
        [self.bottom, self.right, self.floor_right, self.floor_bottom]
    }

    /// Visual center of the roof
    pub fn roof_center(&self) -> Point2 {
        Point2::new(self.top.x, self.left.y)
    }

    pub fn roof_width(&self) -> f64 {
        self.right.x - self.left.x
    }

    pub fn roof_height(&self) -> f64 {
        self.bottom.y - self.top.y
    }

    /// How far the floor hangs below the roof
    pub fn wall_height(&self) -> f64 {
        self.floor_bottom.y - self.bottom.y
    }

    /// Does the roof diamond contain this point? The diamond is split along
    /// its vertical diagonal into two triangles. Points on the outline count
    /// as inside. A collapsed diamond contains nothing.
    pub fn contains_roof(&self, point: Point2) -> bool {
        point_in_triangle(point, self.top, self.left, self.bottom)
            || point_in_triangle(point, self.top, self.right, self.bottom)
    }
}

/// Barycentric point-in-triangle test. Works for either winding order.
pub fn point_in_triangle(p: Point2, a: Point2, b: Point2, c: Point2) -> bool {
    let denom = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if denom.abs() < DEGENERATE_EPSILON {
        return false;
    }

    let wa = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / denom;
    let wb = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / denom;
    let wc = 1.0 - wa - wb;

    wa >= -EDGE_EPSILON && wb >= -EDGE_EPSILON && wc >= -EDGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Roof 16 wide, 8 tall, anchored at (0, 0), with 3px walls
    fn quad() -> ProjectedQuad {
        ProjectedQuad {
            top: Point2::new(8.0, 0.0),
            left: Point2::new(0.0, 4.0),
            right: Point2::new(16.0, 4.0),
            bottom: Point2::new(8.0, 8.0),
            floor_left: Point2::new(0.0, 7.0),
            floor_bottom: Point2::new(8.0, 11.0),
            floor_right: Point2::new(16.0, 7.0),
        }
    }

    #[test]
    fn test_dimensions() {
        let quad = quad();
        assert_eq!(quad.roof_width(), 16.0);
        assert_eq!(quad.roof_height(), 8.0);
        assert_eq!(quad.wall_height(), 3.0);
        assert_eq!(quad.roof_center(), Point2::new(8.0, 4.0));
    }

    #[test]
    fn test_contains_roof() {
        let quad = quad();
        assert!(quad.contains_roof(Point2::new(8.0, 4.0)));
        assert!(quad.contains_roof(Point2::new(2.0, 4.0)));
        assert!(quad.contains_roof(Point2::new(14.0, 4.5)));
        // Vertices and edges are inside
        assert!(quad.contains_roof(quad.top));
        assert!(quad.contains_roof(Point2::new(4.0, 2.0)));

        // Bounding box corners are outside the diamond
        assert!(!quad.contains_roof(Point2::new(1.0, 1.0)));
        assert!(!quad.contains_roof(Point2::new(15.0, 7.0)));
        // Walls aren't part of the roof
        assert!(!quad.contains_roof(Point2::new(4.0, 8.0)));
    }

    #[test]
    fn test_degenerate_roof() {
        let point = Point2::new(3.0, 3.0);
        let collapsed = ProjectedQuad {
            top: point,
            left: point,
            right: point,
            bottom: point,
            floor_left: point,
            floor_bottom: point,
            floor_right: point,
        };
        assert!(!collapsed.contains_roof(point));
    }

    #[test]
    fn test_point_in_triangle_winding() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let c = Point2::new(0.0, 4.0);
        let inside = Point2::new(1.0, 1.0);
        let outside = Point2::new(3.0, 3.0);
        assert!(point_in_triangle(inside, a, b, c));
        assert!(point_in_triangle(inside, a, c, b));
        assert!(!point_in_triangle(outside, a, b, c));
        assert!(!point_in_triangle(outside, c, b, a));
    }
}
