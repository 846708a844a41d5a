use assert_approx_eq::assert_approx_eq;
use isoview::{CameraState, GridPoint, IsometricProjector, Point2, ViewConfig};

/// 16px cells, 3px per height unit, anchored at (128, 128)
fn setup() -> (IsometricProjector, CameraState) {
    let mut config = ViewConfig::default();
    config.projection.cell_size = 16.0;
    config.projection.height_unit = 3.0;
    let projector = IsometricProjector::new(config).unwrap();
    let camera = CameraState::builder()
        .anchor(Point2::new(128.0, 128.0))
        .build()
        .unwrap();
    (projector, camera)
}

/// The center tile of a 16x16 window, one unit tall, with no rotation/zoom/pan
#[test]
fn test_center_tile_scenario() {
    let (projector, camera) = setup();
    let point = GridPoint::new(8, 8);

    let anchor = projector.project(point, 1, &camera);
    assert_eq!(anchor, Point2::new(128.0, 125.0));

    let quad = projector.tile_quad(anchor, 16.0, 1, camera.zoom());
    assert_eq!(quad.top, Point2::new(136.0, 125.0));
    assert_eq!(quad.left, Point2::new(128.0, 129.0));
    assert_eq!(quad.right, Point2::new(144.0, 129.0));
    assert_eq!(quad.bottom, Point2::new(136.0, 133.0));
    assert_eq!(quad.floor_left, Point2::new(128.0, 132.0));
    assert_eq!(quad.floor_bottom, Point2::new(136.0, 136.0));
    assert_eq!(quad.floor_right, Point2::new(144.0, 132.0));

    assert_eq!(quad.roof_width(), 16.0);
    assert_eq!(quad.roof_height(), 8.0);
    assert_eq!(quad.wall_height(), 3.0);
    assert_eq!(
        projector.roof_center(anchor, camera.zoom()),
        quad.roof_center()
    );
}

#[test]
fn test_zoom_scales_everything() {
    let (projector, camera) = setup();
    let camera = camera.with_zoom(2.0).unwrap();
    let quad = projector.project_quad(GridPoint::new(8, 8), 1, &camera);

    // The center tile stays put, only lifted twice as far
    assert_eq!(quad.left, Point2::new(128.0, 122.0 + 8.0));
    assert_eq!(quad.roof_width(), 32.0);
    assert_eq!(quad.roof_height(), 16.0);
    assert_eq!(quad.wall_height(), 6.0);
}

#[test]
fn test_neighbors_tile_the_plane() {
    let (projector, camera) = setup();
    let center = projector.project_quad(GridPoint::new(8, 8), 0, &camera);
    let east = projector.project_quad(GridPoint::new(9, 8), 0, &camera);
    let south = projector.project_quad(GridPoint::new(8, 9), 0, &camera);

    // Adjacent roofs share an edge
    assert_eq!(center.right, east.top);
    assert_eq!(center.bottom, east.left);
    assert_eq!(center.left, south.top);
    assert_eq!(center.bottom, south.right);
}

#[test]
fn test_round_trip_through_unproject() {
    let (projector, camera) = setup();
    let camera = camera
        .with_rotation(105.0)
        .with_zoom(0.75)
        .unwrap()
        .with_pan(Point2::new(20.0, -3.0))
        .unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let height = ((x * y) % 5) as u16;
            let screen = projector.project(GridPoint::new(x, y), height, &camera);
            let (gx, gy) = projector.unproject(screen, height, &camera);
            assert_approx_eq!(gx, f64::from(x), 1e-9);
            assert_approx_eq!(gy, f64::from(y), 1e-9);
        }
    }
}
