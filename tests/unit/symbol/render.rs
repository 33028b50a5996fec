use super::*;
use crate::canvas::model::{ColorStop, LogoSpec};

fn default_request() -> SymbolRequest {
    SymbolRequest::from_spec(&QrSpec::default())
}

fn pixel(rgba: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
}

#[test]
fn default_symbol_is_sized_exactly() {
    let sym = QrcodeRenderer.render(&default_request()).unwrap();
    assert_eq!(sym.size, 200.0);
    assert!(sym.modules >= 21 && (sym.modules - 17) % 4 == 0);
    assert_eq!(sym.tree.size().width(), 200.0);
    assert_eq!(sym.tree.size().height(), 200.0);
    assert!(sym.logo_box.is_none());
}

#[test]
fn rasterized_symbol_has_quiet_zone_and_finder() {
    let sym = QrcodeRenderer.render(&default_request()).unwrap();
    let px = svg_raster::rasterize_svg_to_premul_rgba8(&sym.tree, 200, 200).unwrap();
    assert_eq!(pixel(&px, 200, 1, 1), [255, 255, 255, 255]);
    // 25 modules of 7px centred in 200px: the top-left finder ring starts at 12.5.
    assert_eq!(pixel(&px, 200, 14, 14), [0, 0, 255, 255]);
}

#[test]
fn empty_content_is_a_generation_error() {
    let mut req = default_request();
    req.content.clear();
    let err = QrcodeRenderer.render(&req).unwrap_err();
    assert!(matches!(err, CanvasError::SymbolGeneration(_)));
}

#[test]
fn capacity_overflow_is_a_generation_error() {
    let mut req = default_request();
    req.content = "x".repeat(3000);
    req.error_correction = ErrorCorrectionLevel::H;
    assert!(matches!(
        QrcodeRenderer.render(&req),
        Err(CanvasError::SymbolGeneration(_))
    ));

    let mut req = default_request();
    req.type_number = 1;
    req.content = "x".repeat(100);
    assert!(QrcodeRenderer.render(&req).is_err());

    req.type_number = 41;
    req.content = "x".to_string();
    assert!(QrcodeRenderer.render(&req).is_err());
}

#[test]
fn fixed_type_number_sets_module_count() {
    let mut req = default_request();
    req.type_number = 5;
    assert_eq!(QrcodeRenderer.render(&req).unwrap().modules, 37);
}

#[test]
fn margin_larger_than_symbol_fails() {
    let mut req = default_request();
    req.margin = 150.0;
    assert!(matches!(
        QrcodeRenderer.render(&req),
        Err(CanvasError::SymbolGeneration(_))
    ));
}

#[test]
fn logo_reserves_centre_and_hides_dots() {
    let mut qr = QrSpec::default();
    qr.qr_options.error_correction_level = ErrorCorrectionLevel::H;
    qr.logo = Some(LogoSpec {
        src: "logo.png".to_string(),
        size: 60.0,
    });
    let req = SymbolRequest::from_spec(&qr);
    let logo = req.logo.clone().unwrap();
    assert_eq!(logo.size_fraction, 0.3);
    assert!(logo.hide_background_dots);
    assert_eq!(logo.margin, 5.0);

    let with_logo = QrcodeRenderer.render(&req).unwrap();
    let without = QrcodeRenderer.render(&req.without_logo()).unwrap();
    let b = with_logo.logo_box.unwrap();
    assert!((b.center().x - 100.0).abs() < 1e-9);
    assert!(with_logo.svg.len() < without.svg.len());
}

#[test]
fn gradients_are_emitted_as_defs() {
    let mut req = default_request();
    req.dots.gradient = Some(Gradient {
        kind: GradientKind::Linear,
        rotation: std::f64::consts::FRAC_PI_2,
        color_stops: vec![
            ColorStop {
                offset: 0.0,
                color: "#ff0000".to_string(),
            },
            ColorStop {
                offset: 1.0,
                color: "#00ff00".to_string(),
            },
        ],
    });
    req.background.gradient = Some(Gradient {
        kind: GradientKind::Radial,
        rotation: 0.0,
        color_stops: vec![ColorStop {
            offset: 0.5,
            color: "white".to_string(),
        }],
    });
    let sym = QrcodeRenderer.render(&req).unwrap();
    assert!(sym.svg.contains(r#"<linearGradient id="qr-dots""#));
    assert!(sym.svg.contains(r#"<radialGradient id="qr-background""#));
    assert!(sym.svg.contains("url(#qr-dots)"));
}

#[test]
fn invalid_colour_is_a_generation_error() {
    let mut req = default_request();
    req.corners_dot.color = "not-a-colour".to_string();
    assert!(matches!(
        QrcodeRenderer.render(&req),
        Err(CanvasError::SymbolGeneration(_))
    ));
}

#[test]
fn every_dot_shape_renders() {
    for shape in [
        DotShape::Square,
        DotShape::Dots,
        DotShape::Rounded,
        DotShape::ExtraRounded,
        DotShape::Classy,
        DotShape::ClassyRounded,
    ] {
        let mut req = default_request();
        req.dots.shape = shape;
        req.corners_square.shape = CornerSquareShape::ExtraRounded;
        req.corners_dot.shape = CornerDotShape::Dot;
        assert!(QrcodeRenderer.render(&req).is_ok(), "{shape:?}");
    }
}
