//! Isoview turns a square window onto a tile grid into an isometric picture,
//! and turns pointer positions on that picture back into tiles. This crate
//! contains the projection math, paint ordering, hit testing and the caches
//! around them. Actually putting pixels on a screen is left to the caller.
//!
//! ```
//! use isoview::{
//!     CameraState, Frame, GridPoint, GroundType, HitTester, IsometricProjector,
//!     ProjectionCache, TileGrid, ViewConfig, ViewportWindow,
//! };
//!
//! let config = ViewConfig::default();
//! let projector = IsometricProjector::new(config).unwrap();
//! let mut window = ViewportWindow::new(
//!     TileGrid::uniform(64, 64, 1, GroundType::Earth),
//!     config.viewport,
//! )
//! .unwrap();
//! let camera = CameraState::default();
//!
//! // Paint these in order
//! let slice = window.current_slice();
//! let mut cache = ProjectionCache::new(config.projection.projection_cache_capacity);
//! let frame = Frame::build(&projector, &camera, &slice, &mut cache);
//! assert_eq!(frame.tiles.len(), 256);
//!
//! // Find out what's under the pointer
//! let mut hit_tester = HitTester::new(config.hit);
//! let pointer = projector
//!     .project_quad(GridPoint::new(3, 4), 1, &camera)
//!     .roof_center();
//! let hit = hit_tester.hit_test(&projector, &camera, &slice, pointer);
//! assert_eq!(hit.unwrap().point, GridPoint::new(3, 4));
//! ```
//!
//! See [ViewConfig] for everything that can be customized.

mod camera;
mod config;
mod grid;
mod hit;
mod render;
mod util;
mod viewport;

pub use crate::{
    camera::{CameraBuilder, CameraController, CameraKey, CameraState},
    config::{CameraConfig, HitConfig, ProjectionConfig, ViewConfig, ViewportConfig},
    grid::{GridPoint, GroundType, Tile, TileGrid, TileSource},
    hit::{HitResult, HitStats, HitTester},
    render::{
        cache::ProjectionCache,
        depth::{sort_by_depth, DepthEntry, DepthSorter},
        frame::{Frame, FrameTile},
        quad::{point_in_triangle, ProjectedQuad},
        IsometricProjector,
    },
    util::{
        lru::{CacheStats, LruCache},
        range::NumRange,
        unit::{Color3, Point2},
    },
    viewport::{TileSlice, ViewportCacheStats, ViewportWindow},
};

#[cfg(feature = "svg")]
pub use crate::render::svg::frame_to_svg;
