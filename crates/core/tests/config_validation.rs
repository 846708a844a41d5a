use isoview::{
    CameraConfig, GroundType, HitConfig, IsometricProjector, ProjectionConfig,
    TileGrid, ViewConfig, ViewportConfig, ViewportWindow,
};
use validator::ValidationErrors;

#[test]
fn test_config_validation() {
    let config = ViewConfig {
        projection: ProjectionConfig {
            cell_size: 0.5,               // invalid (too small)
            height_unit: 5.0,             // valid
            depth_height_factor: 2.0,     // invalid
            projection_cache_capacity: 0, // valid (disables caching)
        },
        camera: CameraConfig {
            zoom_min: 0.0,       // invalid
            zoom_max: 3.0,       // valid
            zoom_step: 0.1,      // valid
            rotation_step: 15.0, // valid
        },
        viewport: ViewportConfig {
            size: 16,                // valid
            tile_cache_capacity: 0,  // valid
            slice_cache_capacity: 0, // valid
        },
        hit: HitConfig {
            cache_capacity: 50,         // valid
            min_candidate_radius: 1000, // invalid
        },
    };

    // This is a bit of a lazy check but it works well enough
    let err = IsometricProjector::new(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let mut error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    error_fields.sort_unstable();
    assert_eq!(
        error_fields,
        vec!["camera", "hit", "projection"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}

#[test]
fn test_viewport_config_validation() {
    let grid = TileGrid::uniform(32, 32, 0, GroundType::Water);
    let config = ViewportConfig {
        size: 0,
        ..Default::default()
    };
    let err = ViewportWindow::new(grid, config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    assert!(
        validation_errors.errors().contains_key("size"),
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}

/// Config files usually only list a few fields, everything else should fall
/// back to the defaults
#[test]
fn test_partial_config() {
    let config: ViewConfig = serde_json::from_str(
        r#"{"projection": {"height_unit": 3.0}, "viewport": {"size": 8}}"#,
    )
    .unwrap();
    assert_eq!(config.projection.height_unit, 3.0);
    assert_eq!(config.projection.cell_size, 16.0);
    assert_eq!(config.viewport.size, 8);
    assert_eq!(config.viewport.tile_cache_capacity, 100);
    assert_eq!(config.camera, CameraConfig::default());
    assert_eq!(config.hit, HitConfig::default());
}
