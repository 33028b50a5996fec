use super::*;
use crate::assets::store::PreparedImage;
use crate::canvas::model::LayerKind;
use crate::compile::plan::{NodeContent, NodeKind, VisualNode};
use crate::foundation::core::Rect;

fn filled_tree(width: u32, height: u32) -> VisualTree {
    let image = PreparedImage::new(1, 1, vec![10, 20, 30, 255]).unwrap();
    VisualTree {
        width,
        height,
        nodes: vec![VisualNode {
            id: "bg".to_string(),
            kind: NodeKind::Layer(LayerKind::Background),
            opacity: 1.0,
            content: NodeContent::Image {
                image,
                src: Rect::new(0.0, 0.0, 1.0, 1.0),
                dst: Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
            },
        }],
        warnings: Vec::new(),
    }
}

fn spec(width: u32, height: u32) -> ExportSpec {
    ExportSpec {
        width,
        height,
        ..ExportSpec::default()
    }
}

fn decode(img: &EncodedImage) -> image::RgbaImage {
    image::load_from_memory(&img.bytes).unwrap().to_rgba8()
}

#[test]
fn default_scale_doubles_dimensions() {
    let out = Exporter::new()
        .export(&filled_tree(40, 30), &spec(40, 30), &ExportOptions::default())
        .unwrap();
    assert_eq!((out.width, out.height), (80, 60));
    assert_eq!(out.format, OutputFormat::Png);
    let png = decode(&out);
    assert_eq!(png.dimensions(), (80, 60));
    assert_eq!(png.get_pixel(40, 30).0, [10, 20, 30, 255]);
}

#[test]
fn quality_bounds_are_inclusive_and_fail_fast_outside() {
    let tree = filled_tree(10, 10);
    let ex = Exporter::new();
    for q in [0.0, 1.0] {
        let opts = ExportOptions {
            quality: Some(q),
            ..Default::default()
        };
        assert!(ex.export(&tree, &spec(10, 10), &opts).is_ok(), "q = {q}");
    }
    for q in [1.5, -0.1, 2.0] {
        let opts = ExportOptions {
            quality: Some(q),
            ..Default::default()
        };
        assert!(matches!(
            ex.export(&tree, &spec(10, 10), &opts),
            Err(CanvasError::Validation(_))
        ));
    }
}

#[test]
fn spec_quality_is_checked_when_not_overridden() {
    let mut s = spec(10, 10);
    s.quality = 2.0;
    let err = Exporter::new()
        .export(&filled_tree(10, 10), &s, &ExportOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("quality"));
}

#[test]
fn rounded_corners_clear_the_corner_pixels() {
    let opts = ExportOptions {
        scale: Some(1.0),
        corner_radius: Some(500.0),
        ..Default::default()
    };
    let out = Exporter::new()
        .export(&filled_tree(40, 30), &spec(40, 30), &opts)
        .unwrap();
    let png = decode(&out);
    assert_eq!(png.get_pixel(0, 0).0[3], 0);
    assert_eq!(png.get_pixel(39, 29).0[3], 0);
    assert_eq!(png.get_pixel(20, 15).0[3], 255);
}

#[test]
fn jpeg_override_flattens_and_does_not_touch_spec() {
    let s = spec(16, 16);
    let opts = ExportOptions {
        format: Some(OutputFormat::Jpg),
        scale: Some(1.0),
        ..Default::default()
    };
    let out = Exporter::new().export(&filled_tree(16, 16), &s, &opts).unwrap();
    assert_eq!(out.mime(), "image/jpeg");
    assert!(out.data_uri().starts_with("data:image/jpeg;base64,"));
    assert_eq!(s.format, OutputFormat::Png);
}

#[test]
fn estimate_scales_with_area() {
    let tree = filled_tree(32, 32);
    let ex = Exporter::new();
    let s = spec(32, 32);
    let one = estimate_file_size(&ex, &tree, &s, &ExportOptions::default().with_scale(1.0));
    let two = estimate_file_size(&ex, &tree, &s, &ExportOptions::default().with_scale(2.0));
    assert!(one > 0);
    assert_eq!(two, one * 4);
}

#[test]
fn estimate_falls_back_when_encoding_fails() {
    let tree = filled_tree(0, 10);
    let est = estimate_file_size(
        &Exporter::new(),
        &tree,
        &spec(0, 10),
        &ExportOptions::default().with_scale(2.0),
    );
    assert_eq!(est, 0);
    let tree = filled_tree(10, 10);
    let mut s = spec(10, 10);
    s.quality = 5.0;
    let est = estimate_file_size(&Exporter::new(), &tree, &s, &ExportOptions::default());
    assert_eq!(est, 200);
}
