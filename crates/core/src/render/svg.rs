use crate::{
    render::frame::{Frame, FrameTile},
    util::unit::{Color3, Point2},
};
use svg::{
    node::{element::{Group, Polygon}, Comment},
    Document,
};

/// Walls are darker than the roof. The left wall catches a bit more light.
const LEFT_WALL_SHADE: f32 = 0.7;
const RIGHT_WALL_SHADE: f32 = 0.5;
const OUTLINE_COLOR: Color3 = Color3::new_int(24, 24, 24);
/// Empty space around the tiles, in pixels
const MARGIN: f64 = 4.0;

/// Render a frame as an SVG. Tiles are drawn in paint order, so the document
/// looks exactly like the frame would on screen.
pub fn frame_to_svg(frame: &Frame) -> Document {
    // Fit the view box to the tiles. An empty frame gets an empty box at the
    // camera anchor.
    let anchor = frame.camera.anchor();
    let (min, max) = frame.screen_bounds().unwrap_or((anchor, anchor));

    let mut document = Document::new()
        .set(
            "viewBox",
            (
                // Top-left corner
                (min.x - MARGIN).floor(),
                (min.y - MARGIN).floor(),
                // Width and height
                (max.x - min.x + MARGIN * 2.0).ceil(),
                (max.y - min.y + MARGIN * 2.0).ceil(),
            ),
        )
        .add(Comment::new(format!(
            "\norigin: {}\n{:#?}\n",
            frame.origin, frame.camera
        )));

    for frame_tile in &frame.tiles {
        document = document.add(draw_tile(frame_tile));
    }

    document
}

/// Generate an SVG group for a single tile: both walls, then the roof on top
fn draw_tile(frame_tile: &FrameTile) -> Group {
    let color = frame_tile.tile.color;
    let mut group = Group::new().add(Comment::new(format!(
        "{} (backing {})",
        frame_tile.point, frame_tile.backing
    )));

    // Flat tiles have no visible walls
    if frame_tile.quad.wall_height() > 0.0 {
        group = group
            .add(polygon(&frame_tile.quad.left_wall(), color * LEFT_WALL_SHADE))
            .add(polygon(
                &frame_tile.quad.right_wall(),
                color * RIGHT_WALL_SHADE,
            ));
    }
    group.add(polygon(&frame_tile.quad.roof(), color))
}

fn polygon(points: &[Point2], fill: Color3) -> Polygon {
    Polygon::new()
        .set(
            "points",
            points
                .iter()
                .map(|point| (point.x, point.y))
                .collect::<Vec<_>>(),
        )
        .set("fill", fill.to_html())
        .set("stroke", OUTLINE_COLOR.to_html())
        .set("stroke-width", 0.25)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ViewConfig,
        grid::{GroundType, TileGrid},
        render::{cache::ProjectionCache, IsometricProjector},
        viewport::ViewportWindow,
        CameraState,
    };

    #[test]
    fn test_frame_to_svg() {
        let config = ViewConfig::default();
        let projector = IsometricProjector::new(config).unwrap();
        let mut window = ViewportWindow::new(
            TileGrid::uniform(16, 16, 2, GroundType::Fire),
            config.viewport,
        )
        .unwrap();
        let frame = Frame::build(
            &projector,
            &CameraState::default(),
            &window.current_slice(),
            &mut ProjectionCache::new(0),
        );

        let rendered = frame_to_svg(&frame).to_string();
        assert!(rendered.starts_with("<svg"));
        // Roof plus two walls per tile
        assert_eq!(rendered.matches("<polygon").count(), 256 * 3);
        assert!(rendered.contains(&GroundType::Fire.color().to_html()));
    }
}
