use crate::util::range::NumRange;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Configuration for the whole view pipeline: projection constants, camera
/// control limits, viewport window size and the capacities of every cache.
///
/// Two projectors built from the same config will always produce identical
/// screen coordinates for identical inputs.
///
/// All fields have defaults, so a config file only needs to list the values
/// it wants to change.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ViewConfig {
    /// Constants that define the shape of the isometric projection
    #[validate]
    pub projection: ProjectionConfig,

    /// Limits and step sizes for the camera controls
    #[validate]
    pub camera: CameraConfig,

    /// Size of the viewport window and its cache capacities
    #[validate]
    pub viewport: ViewportConfig,

    /// Pointer hit testing parameters
    #[validate]
    pub hit: HitConfig,
}

/// Constants that define the shape of the isometric projection.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Width of a tile's roof diamond in pixels, at zoom 1. The diamond is
    /// always half as tall as it is wide (the standard 2:1 isometric
    /// diamond).
    #[validate(range(min = 1.0))]
    pub cell_size: f64,

    /// Pixels that one step of tile height lifts the roof of a tile, at
    /// zoom 1. This is also how far the side walls drop below the roof per
    /// step.
    #[validate(range(min = 0.0))]
    pub height_unit: f64,

    /// How much one step of height pulls a tile towards the back of the paint
    /// order. This should stay well below 1, otherwise tall tiles would be
    /// painted before the tiles directly behind them.
    #[validate(range(min = 0.0, max = 0.5))]
    pub depth_height_factor: f64,

    /// Maximum number of memoized projections kept by a
    /// [ProjectionCache](crate::ProjectionCache). 0 disables memoization.
    pub projection_cache_capacity: usize,
}

/// Limits and step sizes for the camera controls. See
/// [CameraController](crate::CameraController).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_zoom_bounds"))]
pub struct CameraConfig {
    /// The smallest zoom factor the controls will allow. Must be positive.
    #[validate(range(min = 0.01))]
    pub zoom_min: f64,

    /// The largest zoom factor the controls will allow
    pub zoom_max: f64,

    /// How much a single zoom in/out step changes the zoom factor
    #[validate(range(min = 0.0))]
    pub zoom_step: f64,

    /// Degrees that a single rotate step turns the camera. 360 should be a
    /// multiple of this, otherwise the last step before wrapping around will
    /// be shorter than the rest.
    #[validate(range(min = 1.0, max = 360.0))]
    pub rotation_step: f64,
}

/// Size of the viewport window and its cache capacities. See
/// [ViewportWindow](crate::ViewportWindow).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ViewportConfig {
    /// Number of tiles along each side of the (square) viewport window
    #[validate(range(min = 1, max = 1024))]
    pub size: u16,

    /// Maximum number of individual tile lookups cached by the window
    pub tile_cache_capacity: usize,

    /// Maximum number of full window slices cached by the window
    pub slice_cache_capacity: usize,
}

/// Pointer hit testing parameters. See [HitTester](crate::HitTester).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HitConfig {
    /// Maximum number of memoized pointer positions
    pub cache_capacity: usize,

    /// The smallest candidate neighborhood radius (in tiles) around the
    /// inverse-projected pointer position. The actual radius grows with the
    /// tallest tile in view; this is just the floor. 2 means at least a 5x5
    /// neighborhood is checked.
    #[validate(range(max = 64))]
    pub min_candidate_radius: u16,
}

impl CameraConfig {
    /// The allowed zoom range, as a [NumRange]
    pub fn zoom_range(&self) -> NumRange<f64> {
        NumRange::new(self.zoom_min, self.zoom_max)
    }

    /// Number of distinct rotation steps in a full turn. E.g. a step of 15
    /// degrees gives 24 steps.
    pub fn rotation_steps(&self) -> u32 {
        (360.0 / self.rotation_step).ceil() as u32
    }
}

fn validate_zoom_bounds(config: &CameraConfig) -> Result<(), ValidationError> {
    if config.zoom_min <= config.zoom_max {
        Ok(())
    } else {
        Err(ValidationError::new("zoom_min_exceeds_zoom_max"))
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            cell_size: 16.0,
            height_unit: 5.0,
            depth_height_factor: 0.1,
            projection_cache_capacity: 4096,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.3,
            zoom_max: 3.0,
            zoom_step: 0.1,
            rotation_step: 15.0,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            size: 16,
            tile_cache_capacity: 100,
            slice_cache_capacity: 20,
        }
    }
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 50,
            min_candidate_radius: 2,
        }
    }
}
