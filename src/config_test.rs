#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn default_matches_constants() {
    let c = EngineConfig::default();
    assert_eq!(c.handle_radius_px, HANDLE_RADIUS_PX);
    assert_eq!(c.min_draw_px, MIN_DRAW_PX);
    assert_eq!(c.history_limit, HISTORY_LIMIT);
    assert_eq!(c.default_style, ShapeStyle::default());
    assert!(c.validate().is_ok());
}

#[test]
fn from_json_empty_object_is_default() {
    assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
}

#[test]
fn from_json_partial_overrides_only_named_keys() {
    let c = EngineConfig::from_json(r#"{ "hitSlopPx": 10.0, "pasteOffset": 0 }"#).unwrap();
    assert_eq!(c.hit_slop_px, 10.0);
    assert_eq!(c.paste_offset, 0.0);
    assert_eq!(c.handle_radius_px, HANDLE_RADIUS_PX);
}

#[test]
fn from_json_partial_default_style() {
    let c = EngineConfig::from_json(r##"{ "defaultStyle": { "stroke": "#000000" } }"##).unwrap();
    assert_eq!(c.default_style.stroke, "#000000");
    assert_eq!(c.default_style.stroke_width, ShapeStyle::default().stroke_width);
}

#[test]
fn from_json_rejects_malformed() {
    assert!(matches!(EngineConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
    assert!(matches!(EngineConfig::from_json(r#"{ "hitSlopPx": "wide" }"#), Err(ConfigError::Parse(_))));
}

#[test]
fn from_json_rejects_non_positive_tunable() {
    let err = EngineConfig::from_json(r#"{ "minShapeSize": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::NotPositive { field: "minShapeSize", .. }));
    assert_eq!(err.to_string(), "minShapeSize must be positive and finite, got 0");
}

#[test]
fn from_json_rejects_zero_history() {
    assert!(matches!(EngineConfig::from_json(r#"{ "historyLimit": 0 }"#), Err(ConfigError::EmptyHistory)));
}

#[test]
fn validate_rejects_bad_style() {
    let mut c = EngineConfig::default();
    c.default_style.opacity = 1.5;
    assert!(matches!(c.validate(), Err(ConfigError::Opacity(_))));

    let mut c = EngineConfig::default();
    c.default_style.stroke_width = -1.0;
    assert!(matches!(c.validate(), Err(ConfigError::OutOfRange { .. })));
}

#[test]
fn validate_rejects_infinite_paste_offset() {
    let c = EngineConfig { paste_offset: f64::INFINITY, ..EngineConfig::default() };
    assert!(matches!(c.validate(), Err(ConfigError::OutOfRange { field: "pasteOffset", .. })));
}
