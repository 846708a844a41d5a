use crate::{
    camera::CameraState,
    grid::{GridPoint, Tile},
    render::{
        cache::ProjectionCache, depth::sort_by_depth, quad::ProjectedQuad,
        IsometricProjector,
    },
    timed,
    util::unit::Point2,
    viewport::TileSlice,
};
use serde::{Deserialize, Serialize};

/// Everything needed to paint one tile
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameTile {
    /// Window-local position
    pub point: GridPoint,
    /// Backing-grid position
    pub backing: GridPoint,
    pub tile: Tile,
    /// Projected anchor, the top-left of the roof's bounding box
    pub anchor: Point2,
    pub quad: ProjectedQuad,
    pub depth: f64,
}

/// A fully projected and ordered frame, ready to be painted. Renderers paint
/// [Self::tiles] front to back of the vec, which is back to front on screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub camera: CameraState,
    /// Backing-grid position of the window when the frame was built
    pub origin: GridPoint,
    /// Present tiles, in paint order
    pub tiles: Vec<FrameTile>,
    /// Window-local points that have no tile, in row-major order. These are
    /// never painted or hit.
    pub empty: Vec<GridPoint>,
}

impl Frame {
    /// Project every tile in a slice and sort the result into paint order
    pub fn build(
        projector: &IsometricProjector,
        camera: &CameraState,
        slice: &TileSlice,
        cache: &mut ProjectionCache,
    ) -> Self {
        timed!("Frame build", log::Level::Trace, {
            let scaled_cell_size = projector.scaled_cell_size(camera.zoom());
            let mut tiles = Vec::new();
            let mut empty = Vec::new();

            for (point, tile) in slice.cells() {
                let tile = match tile {
                    Some(tile) => *tile,
                    None => {
                        empty.push(point);
                        continue;
                    }
                };
                let anchor = cache.project(projector, point, tile.height, camera);
                tiles.push(FrameTile {
                    point,
                    backing: slice.to_backing(point),
                    tile,
                    anchor,
                    quad: projector.tile_quad(
                        anchor,
                        scaled_cell_size,
                        tile.height,
                        camera.zoom(),
                    ),
                    depth: projector.depth(point, tile.height, camera),
                });
            }

            sort_by_depth(&mut tiles, |frame_tile| frame_tile.depth);
            Self {
                camera: *camera,
                origin: slice.origin(),
                tiles,
                empty,
            }
        })
    }

    /// Window-local points in paint order
    pub fn paint_order(&self) -> Vec<GridPoint> {
        self.tiles.iter().map(|frame_tile| frame_tile.point).collect()
    }

    /// Smallest screen-space rectangle that contains every painted tile, as
    /// `(top_left, bottom_right)`. `None` for an empty frame.
    pub fn screen_bounds(&self) -> Option<(Point2, Point2)> {
        let mut vertices = self
            .tiles
            .iter()
            .flat_map(|frame_tile| frame_tile.quad.vertices());
        let first = vertices.next()?;
        Some(vertices.fold((first, first), |(min, max), vertex| {
            (
                Point2::new(min.x.min(vertex.x), min.y.min(vertex.y)),
                Point2::new(max.x.max(vertex.x), max.y.max(vertex.y)),
            )
        }))
    }

    /// Serialize this frame to pretty-printed JSON
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render this frame as an SVG document. See
    /// [frame_to_svg](crate::frame_to_svg).
    #[cfg(feature = "svg")]
    pub fn to_svg(&self) -> ::svg::Document {
        crate::render::svg::frame_to_svg(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ViewConfig,
        grid::{GroundType, TileGrid},
        viewport::ViewportWindow,
    };

    #[test]
    fn test_build() {
        let config = ViewConfig::default();
        let projector = IsometricProjector::new(config).unwrap();
        let mut window = ViewportWindow::new(
            TileGrid::uniform(16, 16, 0, GroundType::Water),
            config.viewport,
        )
        .unwrap();
        let camera = CameraState::default();
        let mut cache = ProjectionCache::new(1024);

        let slice = window.current_slice();
        let frame = Frame::build(&projector, &camera, &slice, &mut cache);
        assert_eq!(frame.tiles.len(), 256);
        assert!(frame.empty.is_empty());
        // Far corner first, near corner last
        assert_eq!(frame.tiles.first().unwrap().point, GridPoint::new(0, 0));
        assert_eq!(frame.tiles.last().unwrap().point, GridPoint::new(15, 15));
        assert!(frame
            .tiles
            .windows(2)
            .all(|pair| pair[0].depth <= pair[1].depth));

        // Second build is served entirely from the projection cache
        let again = Frame::build(&projector, &camera, &slice, &mut cache);
        assert_eq!(frame, again);
        assert_eq!(cache.stats().hits, 256);
    }

    #[test]
    fn test_screen_bounds() {
        let frame = Frame {
            camera: CameraState::default(),
            origin: GridPoint::ORIGIN,
            tiles: Vec::new(),
            empty: Vec::new(),
        };
        assert_eq!(frame.screen_bounds(), None);
    }
}
