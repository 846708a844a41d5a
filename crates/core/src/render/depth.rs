use crate::{camera::CameraState, grid::GridPoint, render::IsometricProjector};
use serde::{Deserialize, Serialize};

/// One tile's position in the paint order
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthEntry {
    pub point: GridPoint,
    pub height: u16,
    /// See [IsometricProjector::depth]
    pub depth: f64,
}

/// Orders tiles back-to-front for the painter's algorithm: paint in the
/// returned order and nearer tiles correctly cover further ones.
#[derive(Copy, Clone, Debug)]
pub struct DepthSorter<'a> {
    projector: &'a IsometricProjector,
}

impl<'a> DepthSorter<'a> {
    pub fn new(projector: &'a IsometricProjector) -> Self {
        Self { projector }
    }

    /// Compute the depth of every tile and sort ascending, so the first entry
    /// is painted first. Ties keep the order the tiles were given in, so
    /// passing tiles in row-major order makes the result fully deterministic.
    pub fn order(
        &self,
        tiles: impl IntoIterator<Item = (GridPoint, u16)>,
        camera: &CameraState,
    ) -> Vec<DepthEntry> {
        let mut entries: Vec<DepthEntry> = tiles
            .into_iter()
            .map(|(point, height)| DepthEntry {
                point,
                height,
                depth: self.projector.depth(point, height, camera),
            })
            .collect();
        sort_by_depth(&mut entries, |entry| entry.depth);
        entries
    }

    /// Same as [Self::order], but just the points
    pub fn order_for_paint(
        &self,
        tiles: impl IntoIterator<Item = (GridPoint, u16)>,
        camera: &CameraState,
    ) -> Vec<GridPoint> {
        self.order(tiles, camera)
            .into_iter()
            .map(|entry| entry.point)
            .collect()
    }
}

/// Stable ascending sort on a precomputed depth. Every paint order in the crate
/// goes through here, which is what keeps drawing and hit testing in agreement
/// about which tile is on top.
pub fn sort_by_depth<T>(items: &mut [T], depth: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| depth(a).total_cmp(&depth(b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ViewConfig, util::unit::Point2};

    fn camera(rotation: f64) -> CameraState {
        CameraState::builder()
            .rotation(rotation)
            .anchor(Point2::new(128.0, 128.0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_order_is_back_to_front() {
        let projector = IsometricProjector::new(ViewConfig::default()).unwrap();
        let sorter = DepthSorter::new(&projector);
        let tiles = vec![
            (GridPoint::new(9, 9), 0),
            (GridPoint::new(8, 8), 0),
            (GridPoint::new(7, 7), 0),
        ];

        assert_eq!(
            sorter.order_for_paint(tiles.clone(), &camera(0.0)),
            vec![GridPoint::new(7, 7), GridPoint::new(8, 8), GridPoint::new(9, 9)]
        );
        // Half a turn flips which corner is at the back
        assert_eq!(
            sorter.order_for_paint(tiles, &camera(180.0)),
            vec![GridPoint::new(9, 9), GridPoint::new(8, 8), GridPoint::new(7, 7)]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let projector = IsometricProjector::new(ViewConfig::default()).unwrap();
        let sorter = DepthSorter::new(&projector);
        // All on the same anti-diagonal, so all have depth 0
        let tiles = vec![
            (GridPoint::new(10, 6), 0),
            (GridPoint::new(8, 8), 0),
            (GridPoint::new(6, 10), 0),
        ];
        let order = sorter.order(tiles, &camera(0.0));
        assert!(order.iter().all(|entry| entry.depth == 0.0));
        assert_eq!(
            order.iter().map(|entry| entry.point).collect::<Vec<_>>(),
            vec![GridPoint::new(10, 6), GridPoint::new(8, 8), GridPoint::new(6, 10)]
        );
    }

    #[test]
    fn test_height_pulls_tiles_back() {
        let projector = IsometricProjector::new(ViewConfig::default()).unwrap();
        let sorter = DepthSorter::new(&projector);
        let tiles = vec![(GridPoint::new(8, 8), 0), (GridPoint::new(9, 7), 3)];
        assert_eq!(
            sorter.order_for_paint(tiles, &camera(0.0)),
            vec![GridPoint::new(9, 7), GridPoint::new(8, 8)]
        );
    }
}
