use crate::{
    config::ViewportConfig,
    grid::{GridPoint, Tile, TileSource},
    util::{
        lru::{CacheStats, LruCache},
        range::NumRange,
    },
};
use anyhow::{ensure, Context};
use log::debug;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use validator::Validate;

/// A square `size × size` copy of part of the backing grid, as seen through a
/// [ViewportWindow] at one position. Cells are addressed by window-local
/// coordinates. A cell is `None` if the backing grid had no tile there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSlice {
    /// Backing-grid position of local `(0, 0)`
    origin: GridPoint,
    size: u16,
    /// Row-major, `size * size` long
    cells: Vec<Option<Tile>>,
}

impl TileSlice {
    pub fn origin(&self) -> GridPoint {
        self.origin
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    /// Get the tile at a window-local point. `None` for absent tiles and for
    /// points outside the window.
    pub fn get(&self, local: GridPoint) -> Option<&Tile> {
        let size = u32::from(self.size);
        if local.is_within(size, size) {
            let index = local.y as usize * self.size as usize + local.x as usize;
            self.cells[index].as_ref()
        } else {
            None
        }
    }

    /// Iterate over every cell in row-major order, including empty ones
    pub fn cells(&self) -> impl Iterator<Item = (GridPoint, Option<&Tile>)> {
        let size = self.size as usize;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let point = GridPoint::new((i % size) as i32, (i / size) as i32);
            (point, cell.as_ref())
        })
    }

    /// Iterate over the tiles that are actually present, in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (GridPoint, &Tile)> {
        self.cells()
            .filter_map(|(point, tile)| tile.map(|tile| (point, tile)))
    }

    /// Height of the tallest tile in the slice, or 0 if it's empty
    pub fn max_height(&self) -> u16 {
        self.tiles().map(|(_, tile)| tile.height).max().unwrap_or(0)
    }

    /// Convert a window-local point into backing-grid coordinates
    pub fn to_backing(&self, local: GridPoint) -> GridPoint {
        self.origin + local
    }
}

/// Key for the slice cache: top-left corner and side length
type SliceKey = (i32, i32, u16);

/// Usage statistics for both of a window's caches
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportCacheStats {
    pub tiles: CacheStats,
    pub slices: CacheStats,
}

/// A movable square window onto a larger backing grid. The window always lies
/// fully inside the grid, so every window-local cell maps to a real backing
/// cell.
///
/// Reads go through two LRU caches: one of individual tiles, and one of whole
/// slices. The backing grid is assumed not to change while it's cached. If it
/// does, call [Self::clear_cache] or stale tiles will keep being served.
#[derive(Clone, Debug)]
pub struct ViewportWindow<S: TileSource> {
    source: S,
    size: u16,
    position: GridPoint,
    tile_cache: LruCache<GridPoint, Tile>,
    slice_cache: LruCache<SliceKey, Rc<TileSlice>>,
}

impl<S: TileSource> ViewportWindow<S> {
    /// Open a window onto a grid, starting centered on it. Fails if the config
    /// is invalid, or if the window doesn't fit in the grid.
    pub fn new(source: S, config: ViewportConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid viewport config")?;
        let size = config.size;
        ensure!(
            u32::from(size) <= source.width()
                && u32::from(size) <= source.height(),
            "viewport of size {} doesn't fit in a {}x{} grid",
            size,
            source.width(),
            source.height()
        );

        let mut window = Self {
            source,
            size,
            position: GridPoint::ORIGIN,
            tile_cache: LruCache::new(config.tile_cache_capacity),
            slice_cache: LruCache::new(config.slice_cache_capacity),
        };
        window.position = window.center_position();
        debug!(
            "Opened {}x{} viewport at {} on a {}x{} grid",
            size,
            size,
            window.position,
            window.source.width(),
            window.source.height()
        );
        Ok(window)
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    /// Backing-grid position of the window's top-left cell
    pub fn position(&self) -> GridPoint {
        self.position
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the backing grid. Caches are not invalidated
    /// automatically, call [Self::clear_cache] after changing any tiles.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The largest valid position on each axis
    fn max_position(&self) -> GridPoint {
        let size = i64::from(self.size);
        let max_x = i64::from(self.source.width()) - size;
        let max_y = i64::from(self.source.height()) - size;
        GridPoint::new(clamp_to_i32(max_x), clamp_to_i32(max_y))
    }

    fn center_position(&self) -> GridPoint {
        let max = self.max_position();
        GridPoint::new(max.x / 2, max.y / 2)
    }

    /// Move the window so its top-left cell is at the given backing-grid
    /// position. The position is clamped so the window stays inside the grid.
    /// Returns whether the window actually moved.
    pub fn set_position(&mut self, x: i32, y: i32) -> bool {
        let max = self.max_position();
        let new_position = GridPoint::new(
            NumRange::new(0, max.x).clamp(x),
            NumRange::new(0, max.y).clamp(y),
        );
        if new_position == self.position {
            return false;
        }
        debug!("Viewport moved {} -> {}", self.position, new_position);
        self.position = new_position;
        true
    }

    /// Shift the window by a relative offset, clamped like [Self::set_position]
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        self.set_position(
            self.position.x.saturating_add(dx),
            self.position.y.saturating_add(dy),
        )
    }

    /// Move back to the center of the backing grid
    pub fn reset_to_center(&mut self) -> bool {
        let center = self.center_position();
        self.set_position(center.x, center.y)
    }

    /// Get the contents of the window at its current position. Successive
    /// calls at the same position return the same slice until the cache is
    /// cleared.
    pub fn current_slice(&mut self) -> Rc<TileSlice> {
        self.slice_at(self.position)
    }

    fn slice_at(&mut self, origin: GridPoint) -> Rc<TileSlice> {
        let key = (origin.x, origin.y, self.size);
        if let Some(slice) = self.slice_cache.get(&key) {
            return Rc::clone(slice);
        }

        let size = i32::from(self.size);
        let mut cells = Vec::with_capacity(self.size as usize * self.size as usize);
        for y in 0..size {
            for x in 0..size {
                cells.push(self.cached_tile(origin + GridPoint::new(x, y)));
            }
        }
        let slice = Rc::new(TileSlice {
            origin,
            size: self.size,
            cells,
        });
        self.slice_cache.insert(key, Rc::clone(&slice));
        slice
    }

    fn cached_tile(&mut self, backing: GridPoint) -> Option<Tile> {
        if let Some(tile) = self.tile_cache.get(&backing) {
            return Some(*tile);
        }
        let tile = self.source.get_tile(backing)?;
        self.tile_cache.insert(backing, tile);
        Some(tile)
    }

    /// Get a single tile by window-local coordinates. `None` if the point is
    /// outside the window or the backing grid has no tile there.
    pub fn tile_at(&mut self, local: GridPoint) -> Option<Tile> {
        let size = u32::from(self.size);
        if !local.is_within(size, size) {
            return None;
        }
        self.cached_tile(self.to_backing(local))
    }

    /// Convert a window-local point into backing-grid coordinates
    pub fn to_backing(&self, local: GridPoint) -> GridPoint {
        self.position + local
    }

    /// Convert a backing-grid point into window-local coordinates, or `None`
    /// if the window doesn't currently cover it
    pub fn from_backing(&self, backing: GridPoint) -> Option<GridPoint> {
        let local = backing - self.position;
        let size = u32::from(self.size);
        if local.is_within(size, size) {
            Some(local)
        } else {
            None
        }
    }

    /// Backing-grid corners of the window, both inclusive
    pub fn bounds(&self) -> (GridPoint, GridPoint) {
        let last = i32::from(self.size) - 1;
        (self.position, self.position + GridPoint::new(last, last))
    }

    /// Does the window currently cover this backing-grid point?
    pub fn contains_backing(&self, backing: GridPoint) -> bool {
        self.from_backing(backing).is_some()
    }

    /// Warm the slice cache for the window-sized blocks around the current
    /// one, up to `radius` blocks away on each axis, so that paging the window
    /// by its own size is smooth. Blocks that would fall off the grid are
    /// skipped.
    pub fn preload_surrounding(&mut self, radius: u16) {
        let max = self.max_position();
        let radius = i32::from(radius);
        let step = i32::from(self.size);
        let mut loaded = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let origin = GridPoint::new(
                    self.position.x.saturating_add(dx.saturating_mul(step)),
                    self.position.y.saturating_add(dy.saturating_mul(step)),
                );
                let in_range = NumRange::new(0, max.x).contains(origin.x)
                    && NumRange::new(0, max.y).contains(origin.y);
                let key = (origin.x, origin.y, self.size);
                if in_range && !self.slice_cache.contains_key(&key) {
                    self.slice_at(origin);
                    loaded += 1;
                }
            }
        }
        debug!("Preloaded {} slices around {}", loaded, self.position);
    }

    /// Drop everything from both caches
    pub fn clear_cache(&mut self) {
        self.tile_cache.clear();
        self.slice_cache.clear();
        debug!("Viewport caches cleared");
    }

    pub fn cache_stats(&self) -> ViewportCacheStats {
        ViewportCacheStats {
            tiles: self.tile_cache.stats(),
            slices: self.slice_cache.stats(),
        }
    }
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(0, i64::from(i32::MAX)) as i32
}
