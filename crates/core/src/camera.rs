use crate::{config::CameraConfig, util::unit::Point2};
use anyhow::{bail, ensure, Context};
use log::trace;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Everything about how the grid is looked at for a single frame: rotation,
/// zoom, pan and the screen point the view is anchored to. A camera state is
/// a plain value; changing the camera means making a new one, either through
/// the `with_*` methods or a [CameraController].
///
/// Invariants, enforced at construction:
/// - `rotation` is in `[0, 360)` degrees
/// - `zoom` is finite and strictly positive
/// - `pan` and `anchor` are finite
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    rotation: f64,
    zoom: f64,
    pan: Point2,
    anchor: Point2,
}

impl CameraState {
    /// Start building a camera. Unset fields take the values from
    /// [CameraState::default].
    pub fn builder() -> CameraBuilder {
        CameraBuilder::default()
    }

    /// Rotation in degrees, canonicalized to `[0, 360)`
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Screen-space offset applied after zoom
    pub fn pan(&self) -> Point2 {
        self.pan
    }

    /// Screen point that the center of the viewport window projects onto
    /// (before panning). Typically the center of the window.
    pub fn anchor(&self) -> Point2 {
        self.anchor
    }

    /// Copy of this camera with a different rotation. Any angle is accepted,
    /// it's wrapped into `[0, 360)`.
    pub fn with_rotation(self, degrees: f64) -> Self {
        Self {
            rotation: canonical_rotation(degrees),
            ..self
        }
    }

    /// Copy of this camera with a different zoom. Fails if the zoom isn't a
    /// positive finite number.
    pub fn with_zoom(self, zoom: f64) -> anyhow::Result<Self> {
        check_zoom(zoom)?;
        Ok(Self { zoom, ..self })
    }

    /// Copy of this camera with a different pan. Fails if either component
    /// isn't finite.
    pub fn with_pan(self, pan: Point2) -> anyhow::Result<Self> {
        ensure!(pan.is_finite(), "pan must be finite, got {}", pan);
        Ok(Self { pan, ..self })
    }

    /// Copy of this camera with a different anchor. Fails if either component
    /// isn't finite.
    pub fn with_anchor(self, anchor: Point2) -> anyhow::Result<Self> {
        ensure!(anchor.is_finite(), "anchor must be finite, got {}", anchor);
        Ok(Self { anchor, ..self })
    }

    /// A hashable fingerprint of this camera. Two cameras have the same key
    /// if and only if all their fields are bit-for-bit identical, which is
    /// exactly when they project every point identically.
    pub fn cache_key(&self) -> CameraKey {
        CameraKey([
            self.rotation.to_bits(),
            self.zoom.to_bits(),
            self.pan.x.to_bits(),
            self.pan.y.to_bits(),
            self.anchor.x.to_bits(),
            self.anchor.y.to_bits(),
        ])
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            zoom: 1.0,
            pan: Point2::ORIGIN,
            anchor: Point2::new(128.0, 96.0),
        }
    }
}

/// See [CameraState::cache_key]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CameraKey([u64; 6]);

/// Validated builder for [CameraState]
#[derive(Copy, Clone, Debug, Default)]
pub struct CameraBuilder {
    rotation: Option<f64>,
    zoom: Option<f64>,
    pan: Option<Point2>,
    anchor: Option<Point2>,
}

impl CameraBuilder {
    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn pan(mut self, pan: Point2) -> Self {
        self.pan = Some(pan);
        self
    }

    pub fn anchor(mut self, anchor: Point2) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn build(self) -> anyhow::Result<CameraState> {
        let default = CameraState::default();
        let rotation = self.rotation.unwrap_or(default.rotation);
        let zoom = self.zoom.unwrap_or(default.zoom);
        let pan = self.pan.unwrap_or(default.pan);
        let anchor = self.anchor.unwrap_or(default.anchor);

        ensure!(rotation.is_finite(), "rotation must be finite, got {}", rotation);
        check_zoom(zoom)?;
        ensure!(pan.is_finite(), "pan must be finite, got {}", pan);
        ensure!(anchor.is_finite(), "anchor must be finite, got {}", anchor);

        Ok(CameraState {
            rotation: canonical_rotation(rotation),
            zoom,
            pan,
            anchor,
        })
    }
}

fn check_zoom(zoom: f64) -> anyhow::Result<()> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        bail!("zoom must be positive and finite, got {}", zoom)
    }
}

/// Wrap an angle in degrees into `[0, 360)`
fn canonical_rotation(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Applies discrete camera controls: rotate by fixed steps, zoom by fixed
/// steps within bounds, pan, and reset to where we started. Input handling
/// lives elsewhere; it just calls these methods and hands [Self::camera] to
/// the rest of the pipeline each frame.
#[derive(Clone, Debug)]
pub struct CameraController {
    config: CameraConfig,
    initial: CameraState,
    current: CameraState,
    /// Which rotation step we're on, in `[0, config.rotation_steps())`
    rotation_index: u32,
}

impl CameraController {
    /// Create a controller starting from the given camera. The camera's
    /// rotation is snapped to the nearest rotation step and its zoom clamped
    /// into the configured range, so that the controls stay in lockstep with
    /// the state. Fails if the config is invalid.
    pub fn new(
        config: CameraConfig,
        initial: CameraState,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid camera config")?;
        let steps = config.rotation_steps();
        let rotation_index =
            (initial.rotation() / config.rotation_step).round() as u32 % steps;
        let zoom = config.zoom_range().clamp(initial.zoom());
        let initial = initial
            .with_rotation(rotation_index as f64 * config.rotation_step)
            .with_zoom(zoom)?;
        Ok(Self {
            config,
            initial,
            current: initial,
            rotation_index,
        })
    }

    /// The camera state to use for the current frame
    pub fn camera(&self) -> CameraState {
        self.current
    }

    pub fn rotation_index(&self) -> u32 {
        self.rotation_index
    }

    /// Turn one rotation step forward, wrapping around after a full turn
    pub fn rotate_clockwise(&mut self) {
        let steps = self.config.rotation_steps();
        self.set_rotation_index((self.rotation_index + 1) % steps);
    }

    /// Turn one rotation step backward, wrapping around after a full turn
    pub fn rotate_counterclockwise(&mut self) {
        let steps = self.config.rotation_steps();
        self.set_rotation_index((self.rotation_index + steps - 1) % steps);
    }

    fn set_rotation_index(&mut self, index: u32) {
        self.rotation_index = index;
        self.current = self
            .current
            .with_rotation(index as f64 * self.config.rotation_step);
        trace!(
            "Rotation step {} ({} degrees)",
            index,
            self.current.rotation()
        );
    }

    /// Zoom in by one step. Returns whether the zoom actually changed, i.e.
    /// false if we were already at the maximum.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.zoom_step)
    }

    /// Zoom out by one step. Returns whether the zoom actually changed, i.e.
    /// false if we were already at the minimum.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(-self.config.zoom_step)
    }

    fn zoom_by(&mut self, delta: f64) -> bool {
        let old_zoom = self.current.zoom();
        let new_zoom = self.config.zoom_range().clamp(old_zoom + delta);
        if new_zoom == old_zoom {
            return false;
        }
        // The range is validated to be positive, so this can't fail
        match self.current.with_zoom(new_zoom) {
            Ok(camera) => {
                self.current = camera;
                trace!("Zoom {} -> {}", old_zoom, new_zoom);
                true
            }
            Err(_) => false,
        }
    }

    /// Shift the view by a screen-space offset. Fails, leaving the camera
    /// untouched, if the resulting pan isn't finite.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> anyhow::Result<()> {
        self.current = self
            .current
            .with_pan(self.current.pan() + Point2::new(dx, dy))?;
        Ok(())
    }

    /// Move the screen anchor, e.g. after the window is resized. Fails,
    /// leaving the camera untouched, if the anchor isn't finite.
    pub fn set_anchor(&mut self, anchor: Point2) -> anyhow::Result<()> {
        let current = self.current.with_anchor(anchor)?;
        self.initial = self.initial.with_anchor(anchor)?;
        self.current = current;
        Ok(())
    }

    /// Go back to the camera this controller was created with. The anchor
    /// keeps its latest value.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.rotation_index = (self.initial.rotation()
            / self.config.rotation_step)
            .round() as u32
            % self.config.rotation_steps();
        trace!("Camera reset");
    }
}
