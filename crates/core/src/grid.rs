//! Grid-side types: integer tile coordinates, the tile record, and the
//! interface through which tiles are provided to the viewer.

use crate::util::unit::Color3;
use derive_more::{Add, AddAssign, Display, Sub};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// An integer coordinate on a tile grid. The same type is used for
/// window-local coordinates (always within `[0, window_size)`) and for
/// coordinates on the larger backing grid; which one a value is should be
/// clear from context.
///
/// Coordinates are signed so that candidate neighborhoods and relative moves
/// can step past the edge of a grid before being filtered or clamped.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    Add,
    AddAssign,
    Sub,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {})", x, y)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Is this point inside a `width × height` grid anchored at the origin?
    pub fn is_within(self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && (self.x as i64) < width as i64
            && (self.y as i64) < height as i64
    }
}

/// The kind of ground a tile is made of. Purely descriptive, nothing in the
/// projection math looks at it.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    StrumDisplay,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroundType {
    Fire,
    Water,
    Earth,
    Wind,
}

impl GroundType {
    /// The default paint color for this ground type
    pub fn color(self) -> Color3 {
        match self {
            Self::Fire => Color3::new_int(214, 84, 52),
            Self::Water => Color3::new_int(32, 120, 200),
            Self::Earth => Color3::new_int(150, 110, 60),
            Self::Wind => Color3::new_int(180, 220, 200),
        }
    }
}

/// A single tile, as supplied by a grid provider. Tiles are plain values: the
/// viewer copies them into its caches and never writes them back.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Opaque identifier, only meaningful to whoever supplied the tile
    pub id: u32,
    /// Elevation in height units. The roof of the tile is drawn this many
    /// height units above the ground plane.
    pub height: u16,
    pub ground: GroundType,
    /// Color used to paint the roof. Walls are shaded from it.
    pub color: Color3,
}

impl Tile {
    /// A tile of the given ground type, painted in that ground's default color
    pub fn new(id: u32, height: u16, ground: GroundType) -> Self {
        Self {
            id,
            height,
            ground,
            color: ground.color(),
        }
    }
}

/// Anything that can supply tiles for a bounded rectangular grid. This is the
/// seam between the viewer and whatever owns the map data.
///
/// Lookups outside `[0, width) × [0, height)` must return `None`; they must
/// never invent a placeholder tile.
pub trait TileSource {
    /// Number of columns in the grid
    fn width(&self) -> u32;

    /// Number of rows in the grid
    fn height(&self) -> u32;

    /// Get the tile at a position, or `None` if there isn't one
    fn get_tile(&self, point: GridPoint) -> Option<Tile>;
}

/// A simple dense, in-memory [TileSource]. Tiles are stored row-major in a
/// flat vector.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Initialize a new grid with the given dimensions.
    ///
    /// ## Arguments
    ///
    /// - `width`/`height`: Number of columns/rows
    /// - `initializer`: Function called to initialize each tile in the grid,
    ///   based on its position
    pub fn new(
        width: u32,
        height: u32,
        initializer: impl Fn(GridPoint) -> Tile,
    ) -> Self {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(initializer(GridPoint::new(x, y)));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// A grid where every tile has the same height and ground type. Tile IDs
    /// are the row-major index of each tile.
    pub fn uniform(
        width: u32,
        height: u32,
        tile_height: u16,
        ground: GroundType,
    ) -> Self {
        Self::new(width, height, |point| {
            let id = point.y as u32 * width + point.x as u32;
            Tile::new(id, tile_height, ground)
        })
    }

    fn index(&self, point: GridPoint) -> Option<usize> {
        if point.is_within(self.width, self.height) {
            Some(point.y as usize * self.width as usize + point.x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, point: GridPoint) -> Option<&Tile> {
        self.index(point).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, point: GridPoint) -> Option<&mut Tile> {
        let index = self.index(point)?;
        Some(&mut self.tiles[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Get the number of tiles in the grid
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileSource for TileGrid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_tile(&self, point: GridPoint) -> Option<Tile> {
        self.get(point).copied()
    }
}
