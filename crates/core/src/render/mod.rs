pub mod cache;
pub mod depth;
pub mod frame;
pub mod quad;
#[cfg(feature = "svg")]
pub mod svg;

use crate::{
    camera::CameraState,
    config::{ProjectionConfig, ViewConfig},
    grid::GridPoint,
    render::quad::ProjectedQuad,
    util::unit::Point2,
};
use anyhow::{anyhow, Context};
use nalgebra::{Matrix2, Rotation2, Vector2};
use validator::Validate;

/// Converts grid coordinates into screen coordinates, and back. A projector
/// is created from a particular [ViewConfig], and from there can project any
/// number of points under any number of cameras.
///
/// Every method is a pure function of its arguments and the config. The same
/// inputs always produce bit-for-bit identical outputs, which is what lets
/// drawing, memoization and hit testing all agree with each other.
///
/// ## Coordinate spaces
/// - **Grid space**: integer tile coordinates inside the viewport window,
///   `[0, size)` on each axis
/// - **Rotated space**: grid coordinates relative to the center of the
///   window, rotated by the camera angle
/// - **Iso space**: rotated space run through the 2:1 isometric transform, in
///   unzoomed pixels
/// - **Screen space**: iso space zoomed around the camera anchor, then panned
///
/// Config options cannot be changed after creating a projector, but projectors
/// are very cheap to create so if you need to change the config, just create
/// a new one.
#[derive(Clone, Debug)]
pub struct IsometricProjector {
    projection: ProjectionConfig,
    viewport_size: u16,
    /// Inverse of the rotated → iso matrix, precomputed for unprojection
    iso_inverse: Matrix2<f64>,
}

impl IsometricProjector {
    /// Initialize a new projector with the given config. Returns an error if
    /// the config is invalid.
    pub fn new(config: ViewConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid view config")?;

        let iso = Self::iso_matrix(&config.projection);
        let iso_inverse = iso.try_inverse().ok_or_else(|| {
            anyhow!(
                "isometric transform is not invertible for cell size {}",
                config.projection.cell_size
            )
        })?;

        Ok(Self {
            projection: config.projection,
            viewport_size: config.viewport.size,
            iso_inverse,
        })
    }

    /// The linear part of the rotated → iso transform:
    /// `iso_x = (rx - ry) * cell/2`, `iso_y = (rx + ry) * cell/4`
    fn iso_matrix(projection: &ProjectionConfig) -> Matrix2<f64> {
        let half = projection.cell_size / 2.0;
        let quarter = projection.cell_size / 4.0;
        Matrix2::new(half, -half, quarter, quarter)
    }

    /// Get a reference to the projection constants this projector uses
    pub fn projection_config(&self) -> &ProjectionConfig {
        &self.projection
    }

    pub fn viewport_size(&self) -> u16 {
        self.viewport_size
    }

    /// The point that rotation happens around, in grid space. For a 16x16
    /// window this is `(8, 8)`.
    pub fn viewport_center(&self) -> f64 {
        f64::from(self.viewport_size) / 2.0
    }

    /// Width of a tile's roof diamond on screen at the given zoom
    pub fn scaled_cell_size(&self, zoom: f64) -> f64 {
        self.projection.cell_size * zoom
    }

    /// Position of a grid point relative to the window center, after camera
    /// rotation. This is the `(rx, ry)` pair that both projection and depth
    /// are computed from.
    pub fn rotated_relative(
        &self,
        point: GridPoint,
        camera: &CameraState,
    ) -> (f64, f64) {
        let center = self.viewport_center();
        let relative = Vector2::new(
            f64::from(point.x) - center,
            f64::from(point.y) - center,
        );
        let rotated = match camera_rotation(camera) {
            Some(rotation) => rotation * relative,
            None => relative,
        };
        (rotated.x, rotated.y)
    }

    /// Project a grid point, lifted by `height` height units, onto the
    /// screen. The result is the top-left corner of the bounding box of the
    /// tile's roof diamond; see [Self::tile_quad] for how the rest of the
    /// tile hangs off of it.
    pub fn project(
        &self,
        point: GridPoint,
        height: u16,
        camera: &CameraState,
    ) -> Point2 {
        let (rx, ry) = self.rotated_relative(point, camera);
        let half = self.projection.cell_size / 2.0;
        let quarter = self.projection.cell_size / 4.0;

        let iso_x = (rx - ry) * half;
        let iso_y =
            (rx + ry) * quarter - f64::from(height) * self.projection.height_unit;

        let anchor = camera.anchor();
        let pan = camera.pan();
        let zoom = camera.zoom();
        Point2::new(
            anchor.x + iso_x * zoom + pan.x,
            anchor.y + iso_y * zoom + pan.y,
        )
    }

    /// Invert [Self::project] for a known height. Returns the (fractional)
    /// grid coordinates that would project onto `screen_point` if the tile
    /// there had the given height.
    pub fn unproject(
        &self,
        screen_point: Point2,
        height: u16,
        camera: &CameraState,
    ) -> (f64, f64) {
        let anchor = camera.anchor();
        let pan = camera.pan();
        let zoom = camera.zoom();

        // Undo zoom and pan, then put the height back
        let iso = Vector2::new(
            (screen_point.x - anchor.x - pan.x) / zoom,
            (screen_point.y - anchor.y - pan.y) / zoom
                + f64::from(height) * self.projection.height_unit,
        );
        let rotated = self.iso_inverse * iso;
        let relative = match camera_rotation(camera) {
            Some(rotation) => rotation.inverse() * rotated,
            None => rotated,
        };

        let center = self.viewport_center();
        (relative.x + center, relative.y + center)
    }

    /// Estimate which grid cell a screen point falls in, ignoring tile
    /// heights. The estimate is the fractional grid position of the ground
    /// level tile whose roof would be centered on the point.
    pub fn tile_estimate(
        &self,
        screen_point: Point2,
        camera: &CameraState,
    ) -> (f64, f64) {
        let offset = self.roof_center_offset(camera.zoom());
        self.unproject(screen_point - offset, 0, camera)
    }

    /// Expand a projected anchor point into the full tile geometry: the four
    /// corners of the roof diamond, plus the bottoms of the left, bottom and
    /// right edges, dropped by the tile's height. The roof is `scaled_cell_size`
    /// wide and half that tall.
    pub fn tile_quad(
        &self,
        anchor_point: Point2,
        scaled_cell_size: f64,
        height: u16,
        zoom: f64,
    ) -> ProjectedQuad {
        let half = scaled_cell_size / 2.0;
        let quarter = scaled_cell_size / 4.0;
        let wall_height =
            f64::from(height) * self.projection.height_unit * zoom;

        let top = Point2::new(anchor_point.x + half, anchor_point.y);
        let left = Point2::new(anchor_point.x, anchor_point.y + quarter);
        let right =
            Point2::new(anchor_point.x + scaled_cell_size, anchor_point.y + quarter);
        let bottom = Point2::new(anchor_point.x + half, anchor_point.y + half);
        let drop = Point2::new(0.0, wall_height);

        ProjectedQuad {
            top,
            left,
            right,
            bottom,
            floor_left: left + drop,
            floor_bottom: bottom + drop,
            floor_right: right + drop,
        }
    }

    /// Project a tile and expand it into its quad in one go
    pub fn project_quad(
        &self,
        point: GridPoint,
        height: u16,
        camera: &CameraState,
    ) -> ProjectedQuad {
        let anchor_point = self.project(point, height, camera);
        self.tile_quad(
            anchor_point,
            self.scaled_cell_size(camera.zoom()),
            height,
            camera.zoom(),
        )
    }

    /// Offset from a projected anchor point to the visual center of the roof
    /// diamond
    fn roof_center_offset(&self, zoom: f64) -> Point2 {
        let scaled = self.scaled_cell_size(zoom);
        Point2::new(scaled / 2.0, scaled / 4.0)
    }

    /// Visual center of the roof diamond that hangs off a projected anchor
    /// point
    pub fn roof_center(&self, anchor_point: Point2, zoom: f64) -> Point2 {
        anchor_point + self.roof_center_offset(zoom)
    }

    /// Sort key for painting: smaller values are further from the viewer and
    /// get painted first.
    ///
    /// The key has to follow the projection's own vertical term, `rx + ry`.
    /// Using only one rotated axis (e.g. `ry`) matches screen order at some
    /// angles and inverts it at others (e.g. 180 degrees), which breaks the
    /// painter's algorithm. Height pulls a tile slightly towards the back so
    /// that among tiles on the same screen row, taller ones are painted first
    /// and their walls get covered by their shorter neighbors.
    pub fn depth(
        &self,
        point: GridPoint,
        height: u16,
        camera: &CameraState,
    ) -> f64 {
        let (rx, ry) = self.rotated_relative(point, camera);
        rx + ry - f64::from(height) * self.projection.depth_height_factor
    }
}

/// Get the rotation for a camera, or `None` if the camera isn't rotated. The
/// four quadrant angles use exact sine/cosine values so that quarter turns
/// don't pick up floating point drift.
fn camera_rotation(camera: &CameraState) -> Option<Rotation2<f64>> {
    let degrees = camera.rotation();
    let (sin, cos) = if degrees == 0.0 {
        return None;
    } else if degrees == 90.0 {
        (1.0, 0.0)
    } else if degrees == 180.0 {
        (0.0, -1.0)
    } else if degrees == 270.0 {
        (-1.0, 0.0)
    } else {
        degrees.to_radians().sin_cos()
    };
    Some(Rotation2::from_matrix_unchecked(Matrix2::new(
        cos, -sin, sin, cos,
    )))
}
