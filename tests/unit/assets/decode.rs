use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    use image::ImageEncoder as _;
    let raw: Vec<u8> = (0..w * h).flat_map(|_| px).collect();
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(&raw, w, h, image::ExtendedColorType::Rgba8)
        .unwrap();
    out
}

#[test]
fn decodes_png_into_premultiplied_pixels() {
    let img = decode_image(&png_bytes(2, 1, [200, 100, 0, 128])).unwrap();
    assert_eq!((img.width, img.height), (2, 1));
    assert_eq!(&img.rgba8_premul[..4], &[100, 50, 0, 128]);
    assert_eq!(sniff_mime(&png_bytes(1, 1, [0, 0, 0, 255])), "image/png");
}

#[test]
fn decodes_svg_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"><rect width="4" height="2" fill="#ff0000"/></svg>"##;
    let img = decode_image(svg).unwrap();
    assert_eq!((img.width, img.height), (4, 2));
    assert_eq!(&img.rgba8_premul[..4], &[255, 0, 0, 255]);
    assert_eq!(sniff_mime(svg), "image/svg+xml");
}

#[test]
fn garbage_is_an_asset_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CanvasError::AssetResolution(_)));
    assert_eq!(sniff_mime(b"??"), "application/octet-stream");
}
