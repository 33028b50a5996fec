use super::*;

fn frame(px: [u8; 4], w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: (0..w * h).flat_map(|_| px).collect(),
    }
}

#[test]
fn png_roundtrips_dimensions_and_alpha() {
    let enc = encode_frame(&frame([64, 0, 0, 128], 3, 2), OutputFormat::Png, 0.9, Color::WHITE)
        .unwrap();
    assert_eq!((enc.width, enc.height), (3, 2));
    let decoded = image::load_from_memory(&enc.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (3, 2));
    let p = decoded.get_pixel(0, 0).0;
    assert_eq!(p[3], 128);
    assert!((i16::from(p[0]) - 128).abs() <= 1);
}

#[test]
fn jpeg_is_flattened_onto_background() {
    let enc = encode_frame(&frame([0, 0, 0, 0], 8, 8), OutputFormat::Jpg, 1.0, Color::WHITE)
        .unwrap();
    assert_eq!(enc.mime(), "image/jpeg");
    let decoded = image::load_from_memory(&enc.bytes).unwrap().to_rgb8();
    let p = decoded.get_pixel(4, 4).0;
    assert!(p.iter().all(|c| *c > 245), "{p:?}");
}

#[test]
fn flatten_keeps_opaque_pixels() {
    let out = flatten_premul_onto(&[10, 20, 30, 255, 0, 0, 0, 0], Color::rgba(0.0, 1.0, 0.0, 1.0));
    assert_eq!(out, vec![10, 20, 30, 0, 255, 0]);
}

#[test]
fn quality_maps_to_jpeg_scale() {
    assert_eq!(jpeg_quality(0.9), 90);
    assert_eq!(jpeg_quality(0.0), 1);
    assert_eq!(jpeg_quality(1.0), 100);
}

#[test]
fn data_uri_carries_mime() {
    let enc = encode_frame(&frame([0, 0, 0, 255], 1, 1), OutputFormat::Png, 0.5, Color::WHITE)
        .unwrap();
    assert!(enc.data_uri().starts_with("data:image/png;base64,"));
}

#[test]
fn zero_area_frame_is_a_raster_error() {
    let err = encode_frame(&frame([0; 4], 0, 4), OutputFormat::Png, 1.0, Color::WHITE).unwrap_err();
    assert!(matches!(err, CanvasError::Rasterization(_)));
}
