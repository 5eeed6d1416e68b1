//! Configuration loading and validation tests

use std::io::Write;
use virtual_office_core::orchestrator::config_hash;
use virtual_office_core::{ConfigError, OfficeConfig, OfficeEngine, Point, SimulationError};

#[test]
fn test_empty_json_gives_defaults() {
    let config = OfficeConfig::from_json_str("{}").unwrap();
    assert_eq!(config, OfficeConfig::default());
    assert_eq!(config.rally_point(), Point::new(1500.0, 1000.0));
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = OfficeConfig::from_json_str(
        r#"{
            "viewport": { "max_zoom": 3.0 },
            "meeting": { "rally_point": { "x": 800.0, "y": 600.0 } }
        }"#,
    )
    .unwrap();

    assert_eq!(config.viewport.max_zoom, 3.0);
    assert_eq!(config.viewport.min_zoom, 0.3);
    assert_eq!(config.rally_point(), Point::new(800.0, 600.0));
    assert!(config.validate().is_empty());
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = OfficeConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = OfficeConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("office-config-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "rng_seed": 9, "motion": {{ "lerp_rate": 0.5 }} }}"#).unwrap();
    }
    let config = OfficeConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.rng_seed, 9);
    assert_eq!(config.motion.lerp_rate, 0.5);
}

#[test]
fn test_validation_collects_every_problem() {
    let mut config = OfficeConfig::default();
    config.viewport.default_zoom = 5.0;
    config.motion.lerp_rate = 0.0;
    config.meeting.trigger_category = "  ".to_string();

    let errors = config.validate();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::ZoomOutOfRange {
            field: "viewport.default_zoom",
            ..
        }
    )));
    assert!(errors.iter().any(|e| matches!(e, ConfigError::InvalidMotion(_))));
    assert!(errors.iter().any(|e| matches!(e, ConfigError::InvalidMeeting(_))));
}

#[test]
fn test_margins_must_leave_walkable_floor() {
    let mut config = OfficeConfig::default();
    config.map.margin_x = 1500.0;
    assert!(matches!(
        config.validate_or_err(),
        Err(ConfigError::InvalidFloor(_))
    ));
}

#[test]
fn test_rally_point_off_floor_rejected() {
    let mut config = OfficeConfig::default();
    config.meeting.rally_point = Some(Point::new(-10.0, 500.0));
    assert!(matches!(
        config.validate_or_err(),
        Err(ConfigError::InvalidMeeting(_))
    ));
}

#[test]
fn test_engine_refuses_invalid_config() {
    let mut config = OfficeConfig::default();
    config.motion.wander_min_ms = 9000;
    let err = OfficeEngine::new(config).unwrap_err();
    match err {
        SimulationError::InvalidConfig(msg) => assert!(msg.contains("wander interval")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_config_hash_ignores_key_order() {
    let a = OfficeConfig::from_json_str(r#"{ "rng_seed": 3, "map": { "floor_width": 4000.0 } }"#).unwrap();
    let b = OfficeConfig::from_json_str(r#"{ "map": { "floor_width": 4000.0 }, "rng_seed": 3 }"#).unwrap();
    assert_eq!(config_hash(&a).unwrap(), config_hash(&b).unwrap());
}
