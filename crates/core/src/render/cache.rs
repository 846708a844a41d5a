use crate::{
    camera::{CameraKey, CameraState},
    grid::GridPoint,
    render::IsometricProjector,
    util::{
        lru::{CacheStats, LruCache},
        unit::Point2,
    },
};

type ProjectionKey = (GridPoint, u16, CameraKey);

/// Memoizes [IsometricProjector::project]. The key includes every input of
/// the projection, so a cached value can never be stale: changing the camera
/// just means new keys, and old ones age out of the LRU.
#[derive(Clone, Debug)]
pub struct ProjectionCache {
    entries: LruCache<ProjectionKey, Point2>,
}

impl ProjectionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Project a point, reusing a previous result if there is one. Always
    /// returns exactly what [IsometricProjector::project] would.
    pub fn project(
        &mut self,
        projector: &IsometricProjector,
        point: GridPoint,
        height: u16,
        camera: &CameraState,
    ) -> Point2 {
        self.entries
            .get_or_insert_with((point, height, camera.cache_key()), || {
                projector.project(point, height, camera)
            })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}
