use crate::{
    camera::{CameraKey, CameraState},
    config::HitConfig,
    grid::GridPoint,
    render::{depth::sort_by_depth, IsometricProjector},
    util::{
        lru::{CacheStats, LruCache},
        unit::Point2,
    },
    viewport::TileSlice,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

/// The tile under the pointer
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// Window-local position
    pub point: GridPoint,
    /// Backing-grid position
    pub backing: GridPoint,
    pub height: u16,
    /// Paint depth of the tile, see
    /// [IsometricProjector::depth](crate::IsometricProjector::depth)
    pub depth: f64,
    /// Screen distance from the pointer to the visual center of the roof
    pub distance_from_center: f64,
}

/// Hit testing statistics, accumulated over the life of a [HitTester]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    /// Total number of hit tests run, including ones answered from the cache
    pub hit_tests: u64,
    /// Number of hit tests that found a tile
    pub successful_hits: u64,
    pub cache: CacheStats,
}

impl HitStats {
    /// Fraction of hit tests that found a tile. Zero if nothing was tested.
    pub fn success_ratio(&self) -> f64 {
        if self.hit_tests == 0 {
            0.0
        } else {
            self.successful_hits as f64 / self.hit_tests as f64
        }
    }
}

struct Candidate {
    point: GridPoint,
    height: u16,
    depth: f64,
}

/// Finds which tile is under a screen point.
///
/// The pointer is first inverse-projected onto the ground plane to get an
/// estimate of which cell it's over. Tall tiles are drawn further up the
/// screen than their cell, so every tile close enough to the estimate to
/// possibly reach the pointer is tested against its roof diamond. Of the
/// tiles whose roof contains the pointer, the one that gets painted last wins,
/// since that's the one that's visible.
///
/// Results are memoized per pointer position. The memo is only valid for one
/// camera and one window position, and is dropped automatically as soon as
/// either changes.
#[derive(Clone, Debug)]
pub struct HitTester {
    config: HitConfig,
    cache: LruCache<(u64, u64), Option<HitResult>>,
    /// Camera and window origin that the cached results were computed under
    cache_context: Option<(CameraKey, GridPoint)>,
    hit_tests: u64,
    successful_hits: u64,
}

impl HitTester {
    pub fn new(config: HitConfig) -> Self {
        Self {
            config,
            cache: LruCache::new(config.cache_capacity),
            cache_context: None,
            hit_tests: 0,
            successful_hits: 0,
        }
    }

    /// Find the visible tile under a screen point, or `None` if the pointer
    /// isn't over any tile in the slice.
    pub fn hit_test(
        &mut self,
        projector: &IsometricProjector,
        camera: &CameraState,
        slice: &TileSlice,
        pointer: Point2,
    ) -> Option<HitResult> {
        let context = (camera.cache_key(), slice.origin());
        if self.cache_context != Some(context) {
            if !self.cache.is_empty() {
                debug!("Camera or window moved, dropping cached hit results");
            }
            self.cache.clear();
            self.cache_context = Some(context);
        }

        self.hit_tests += 1;
        let key = (pointer.x.to_bits(), pointer.y.to_bits());
        let result = match self.cache.get(&key) {
            Some(result) => *result,
            None => {
                let result = self.resolve(projector, camera, slice, pointer);
                self.cache.insert(key, result);
                result
            }
        };

        if result.is_some() {
            self.successful_hits += 1;
        }
        result
    }

    fn resolve(
        &self,
        projector: &IsometricProjector,
        camera: &CameraState,
        slice: &TileSlice,
        pointer: Point2,
    ) -> Option<HitResult> {
        let (estimate_x, estimate_y) = projector.tile_estimate(pointer, camera);
        let radius = self.candidate_radius(projector, slice.max_height());

        // Everything within the radius of the estimate, clipped to the window
        let last = i32::from(slice.size()) - 1;
        let axis_span = |estimate: f64| {
            let lo = ((estimate - radius).floor() as i32).max(0);
            let hi = ((estimate + radius).ceil() as i32).min(last);
            lo..=hi
        };
        let x_span = axis_span(estimate_x);
        let y_span = axis_span(estimate_y);

        let mut candidates = Vec::new();
        for y in y_span {
            for x in x_span.clone() {
                let point = GridPoint::new(x, y);
                if let Some(tile) = slice.get(point) {
                    candidates.push(Candidate {
                        point,
                        height: tile.height,
                        depth: projector.depth(point, tile.height, camera),
                    });
                }
            }
        }
        // Same order the tiles get painted in, so the last match is the one
        // on top
        sort_by_depth(&mut candidates, |candidate| candidate.depth);

        let tested = candidates.len();
        let hit = candidates.into_iter().rev().find_map(|candidate| {
            let quad =
                projector.project_quad(candidate.point, candidate.height, camera);
            if quad.contains_roof(pointer) {
                Some(HitResult {
                    point: candidate.point,
                    backing: slice.to_backing(candidate.point),
                    height: candidate.height,
                    depth: candidate.depth,
                    distance_from_center: pointer
                        .distance_to(quad.roof_center()),
                })
            } else {
                None
            }
        });

        match &hit {
            Some(hit) => debug!(
                "Pointer {} hit {} (estimate ({:.2}, {:.2}), {} candidates)",
                pointer, hit.point, estimate_x, estimate_y, tested
            ),
            None => trace!(
                "Pointer {} missed (estimate ({:.2}, {:.2}), {} candidates)",
                pointer,
                estimate_x,
                estimate_y,
                tested
            ),
        }
        hit
    }

    /// How far from the ground-level estimate (in grid cells, per axis) a
    /// tile can be and still have its roof under the pointer.
    ///
    /// In rotated space a roof covers a unit square, so a flat tile reaches
    /// `1/√2` from its center. Raising a tile by `h` height units shifts its
    /// roof diagonally by `h * height_unit / (cell_size / 2)` cells along each
    /// rotated axis, and rotation can turn that onto a single grid axis.
    pub fn candidate_radius(
        &self,
        projector: &IsometricProjector,
        max_height: u16,
    ) -> f64 {
        let projection = projector.projection_config();
        let shift = f64::from(max_height) * projection.height_unit
            / (projection.cell_size / 2.0);
        let reach = FRAC_1_SQRT_2 + SQRT_2 * shift;
        reach.max(f64::from(self.config.min_candidate_radius))
    }

    /// Drop all memoized results. Hit counts are kept.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.cache_context = None;
    }

    pub fn stats(&self) -> HitStats {
        HitStats {
            hit_tests: self.hit_tests,
            successful_hits: self.successful_hits,
            cache: self.cache.stats(),
        }
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
    use assert_approx_eq::assert_approx_eq;

    fn setup() -> (IsometricProjector, TileSlice) {
        let mut config = ViewConfig::default();
        config.projection.height_unit = 3.0;
        let projector = IsometricProjector::new(config).unwrap();
        let mut window = ViewportWindow::new(
            TileGrid::uniform(16, 16, 0, GroundType::Earth),
            config.viewport,
        )
        .unwrap();
        let slice = (*window.current_slice()).clone();
        (projector, slice)
    }

    #[test]
    fn test_candidate_radius() {
        let (projector, _) = setup();
        let tester = HitTester::new(HitConfig::default());
        // Flat and short grids use the minimum
        assert_approx_eq!(tester.candidate_radius(&projector, 0), 2.0);
        assert_approx_eq!(tester.candidate_radius(&projector, 2), 2.0);
        // 8 units * 3px / 8px = 3 cells of shift
        assert_approx_eq!(
            tester.candidate_radius(&projector, 8),
            FRAC_1_SQRT_2 + 3.0 * SQRT_2
        );
    }

    #[test]
    fn test_hit_and_miss() {
        let (projector, slice) = setup();
        let camera = CameraState::default();
        let mut tester = HitTester::new(HitConfig::default());

        let point = GridPoint::new(5, 9);
        let center = projector.project_quad(point, 0, &camera).roof_center();
        let hit = tester.hit_test(&projector, &camera, &slice, center).unwrap();
        assert_eq!(hit.point, point);
        assert_eq!(hit.backing, point);
        assert_approx_eq!(hit.distance_from_center, 0.0);

        // Way off the grid
        assert_eq!(
            tester.hit_test(&projector, &camera, &slice, Point2::new(-500.0, -500.0)),
            None
        );

        let stats = tester.stats();
        assert_eq!(stats.hit_tests, 2);
        assert_eq!(stats.successful_hits, 1);
        assert_approx_eq!(stats.success_ratio(), 0.5);
    }

    #[test]
    fn test_cache_follows_camera() {
        let (projector, slice) = setup();
        let camera = CameraState::default();
        let mut tester = HitTester::new(HitConfig::default());
        let pointer = projector
            .project_quad(GridPoint::new(8, 8), 0, &camera)
            .roof_center();

        tester.hit_test(&projector, &camera, &slice, pointer);
        tester.hit_test(&projector, &camera, &slice, pointer);
        assert_eq!(tester.stats().cache.hits, 1);

        // Same pointer, different camera: recomputed against the new view
        let panned = camera.with_pan(Point2::new(16.0, 0.0)).unwrap();
        let hit = tester.hit_test(&projector, &panned, &slice, pointer).unwrap();
        assert_eq!(hit.point, GridPoint::new(7, 9));
        assert_eq!(tester.stats().cache.hits, 0);
        assert_eq!(tester.stats().cache.len, 1);
    }
}
