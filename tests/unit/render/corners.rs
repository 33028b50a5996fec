use super::*;

fn opaque(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![255; (w * h * 4) as usize],
    }
}

fn alpha_at(frame: &FrameRGBA, x: u32, y: u32) -> u8 {
    frame.data[((y * frame.width + x) * 4 + 3) as usize]
}

#[test]
fn radius_is_clamped_to_half_the_shorter_side() {
    assert_eq!(clamp_corner_radius(500.0, 1.0, 400, 300), 150.0);
    assert_eq!(clamp_corner_radius(500.0, 2.0, 800, 600), 300.0);
    assert_eq!(clamp_corner_radius(20.0, 2.0, 800, 600), 40.0);
}

#[test]
fn non_positive_radius_clamps_to_zero() {
    assert_eq!(clamp_corner_radius(0.0, 2.0, 10, 10), 0.0);
    assert_eq!(clamp_corner_radius(-4.0, 2.0, 10, 10), 0.0);
    assert_eq!(clamp_corner_radius(f64::NAN, 2.0, 10, 10), 0.0);
}

#[test]
fn zero_radius_is_identity() {
    let mut f = opaque(4, 4);
    let before = f.data.clone();
    apply_rounded_corners(&mut f, 0.0).unwrap();
    apply_rounded_corners(&mut f, -1.0).unwrap();
    assert_eq!(f.data, before);
}

#[test]
fn corners_become_transparent_and_centre_stays_opaque() {
    let mut f = opaque(40, 30);
    apply_rounded_corners(&mut f, 10.0).unwrap();
    assert_eq!(alpha_at(&f, 0, 0), 0);
    assert_eq!(alpha_at(&f, 39, 0), 0);
    assert_eq!(alpha_at(&f, 0, 29), 0);
    assert_eq!(alpha_at(&f, 39, 29), 0);
    assert_eq!(alpha_at(&f, 20, 15), 255);
    assert_eq!(alpha_at(&f, 20, 0), 255);
}

#[test]
fn clamped_radius_yields_pill_without_inverted_geometry() {
    let mut f = opaque(40, 20);
    let r = clamp_corner_radius(500.0, 1.0, 40, 20);
    apply_rounded_corners(&mut f, r).unwrap();
    assert_eq!(alpha_at(&f, 0, 0), 0);
    assert_eq!(alpha_at(&f, 20, 10), 255);
    assert_eq!(alpha_at(&f, 20, 0), 255);
}

#[test]
fn mask_scales_premultiplied_channels() {
    let mut px = vec![200, 100, 50, 200];
    mask_apply_alpha(&mut px, &[0, 0, 0, 128]);
    assert_eq!(px, vec![100, 50, 25, 100]);
}
