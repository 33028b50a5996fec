use super::*;
use crate::canvas::model::{BackgroundLayer, FitMode};
use crate::foundation::core::{Point, Size};

#[test]
fn default_configuration_is_valid() {
    let report = CanvasConfiguration::default().validate();
    assert_eq!(report, ValidationReport {
        is_valid: true,
        errors: vec![],
    });
    assert!(report.into_result().is_ok());
}

#[test]
fn qr_exceeding_canvas_is_out_of_bounds() {
    let mut c = CanvasConfiguration::default();
    c.qr.position = Point::new(700.0, 50.0);
    let report = c.validate();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("out of bounds"));
}

#[test]
fn quality_boundaries() {
    let mut c = CanvasConfiguration::default();
    for q in [0.0, 1.0] {
        c.export.quality = q;
        assert!(c.validate().is_valid, "quality {q} should be valid");
    }
    for q in [1.5, -0.1, 2.0, f64::NAN] {
        c.export.quality = q;
        let report = c.validate();
        assert!(!report.is_valid, "quality {q} should be invalid");
        assert!(report.errors.iter().any(|e| e.contains("quality")));
    }
}

#[test]
fn violations_accumulate_in_check_order() {
    let mut c = CanvasConfiguration::default();
    c.qr.content = "   ".to_string();
    c.export.quality = 3.0;
    c.backgrounds.push(BackgroundLayer {
        id: "bg-1".to_string(),
        src: String::new(),
        position: Point::ZERO,
        size: Size::new(0.0, 10.0),
        mode: FitMode::Contain,
        z_index: 0,
        opacity: 1.5,
    });

    let report = c.validate();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 5);
    assert!(report.errors[0].contains("content"));
    assert!(report.errors[1].contains("quality"));
    assert!(report.errors[2].contains("bg-1") && report.errors[2].contains("source"));
    assert!(report.errors[3].contains("positive size"));
    assert!(report.errors[4].contains("opacity"));

    let err = report.into_result().unwrap_err();
    assert!(matches!(err, CanvasError::Validation(_)));
}

#[test]
fn zero_canvas_and_negative_position_are_reported() {
    let mut c = CanvasConfiguration::default();
    c.export.width = 0;
    c.qr.position = Point::new(-1.0, 0.0);
    let report = c.validate();
    assert!(report.errors.iter().any(|e| e.contains("canvas width/height")));
    assert!(report.errors.iter().any(|e| e.contains("negative")));
}

#[test]
fn validate_is_idempotent() {
    let mut c = CanvasConfiguration::default();
    c.qr.size = -5.0;
    assert_eq!(c.validate(), c.validate());
}
