use super::*;

fn buffer(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    px.repeat((w * h) as usize)
}

fn all_pixels(w: u32, h: u32) -> PixelRect {
    PixelRect::new(0, 0, w, h)
}

#[test]
fn filter_names_parse_and_unknown_names_fail() {
    assert_eq!("none".parse::<FilterKind>().unwrap(), FilterKind::None);
    assert_eq!(
        " Grayscale ".parse::<FilterKind>().unwrap(),
        FilterKind::Grayscale
    );
    assert_eq!(
        "smoothing".parse::<FilterKind>().unwrap(),
        FilterKind::Smoothing
    );
    let err = "sepia".parse::<FilterKind>().unwrap_err();
    assert!(matches!(err, StripError::UnknownFilter(name) if name == "sepia"));

    let from_json: Result<FilterKind, _> = serde_json::from_str("\"vintage\"");
    assert!(from_json.is_err());
}

#[test]
fn none_is_a_no_op() {
    let mut px = vec![1, 2, 3, 4, 200, 100, 50, 255];
    let before = px.clone();
    apply_filter(&mut px, 2, all_pixels(2, 1), FilterKind::None).unwrap();
    assert_eq!(px, before);
}

#[test]
fn grayscale_uses_weighted_luma_and_keeps_alpha() {
    let mut px = vec![255, 0, 0, 255, 0, 255, 0, 128, 0, 0, 255, 7, 10, 20, 30, 255];
    apply_filter(&mut px, 4, all_pixels(4, 1), FilterKind::Grayscale).unwrap();
    assert_eq!(&px[0..4], &[77, 77, 77, 255]);
    assert_eq!(&px[4..8], &[150, 150, 150, 128]);
    assert_eq!(&px[8..12], &[28, 28, 28, 7]);
    // 3 + 11.8 + 3.3 = 18.1
    assert_eq!(&px[12..16], &[18, 18, 18, 255]);
}

#[test]
fn grayscale_is_idempotent_over_every_grey_level() {
    let mut px: Vec<u8> = (0..=255u8)
        .flat_map(|v| [v, v.wrapping_mul(7), v.wrapping_mul(13), 255])
        .collect();
    apply_filter(&mut px, 256, all_pixels(256, 1), FilterKind::Grayscale).unwrap();
    let once = px.clone();
    apply_filter(&mut px, 256, all_pixels(256, 1), FilterKind::Grayscale).unwrap();
    assert_eq!(px, once);
}

#[test]
fn smoothing_stays_in_range_for_every_input() {
    let mut px: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, v, 255]).collect();
    apply_filter(&mut px, 256, all_pixels(256, 1), FilterKind::Smoothing).unwrap();
    // (0-128)*0.9+153 = 37.8, (255-128)*0.9+153 = 267.3 -> clamped
    assert_eq!(&px[0..4], &[38, 38, 38, 255]);
    assert_eq!(&px[255 * 4..256 * 4], &[255, 255, 255, 255]);
    assert_eq!(&px[128 * 4..128 * 4 + 4], &[153, 153, 153, 255]);
    for w in px.chunks_exact(4).collect::<Vec<_>>().windows(2) {
        assert!(w[0][0] <= w[1][0]);
    }
}

#[test]
fn only_the_region_is_touched() {
    let (w, h) = (6u32, 4u32);
    let mut px = buffer(w, h, [255, 0, 0, 255]);
    let region = PixelRect::new(1, 1, 3, 2);
    apply_filter(&mut px, w, region, FilterKind::Grayscale).unwrap();
    for y in 0..h {
        for x in 0..w {
            let i = ((y * w + x) * 4) as usize;
            if region.contains(x, y) {
                assert_eq!(&px[i..i + 4], &[77, 77, 77, 255], "({x},{y})");
            } else {
                assert_eq!(&px[i..i + 4], &[255, 0, 0, 255], "({x},{y})");
            }
        }
    }
}

#[test]
fn region_outside_the_buffer_is_clamped() {
    let mut px = buffer(2, 2, [0, 0, 0, 255]);
    apply_filter(&mut px, 2, PixelRect::new(1, 1, 50, 50), FilterKind::Smoothing).unwrap();
    assert_eq!(&px[12..16], &[38, 38, 38, 255]);
    assert_eq!(&px[0..4], &[0, 0, 0, 255]);
}

#[test]
fn ragged_buffers_are_rejected() {
    let mut px = vec![0u8; 10];
    assert!(apply_filter(&mut px, 2, all_pixels(2, 1), FilterKind::Grayscale).is_err());
    let mut px = vec![0u8; 12];
    assert!(apply_filter(&mut px, 2, all_pixels(2, 1), FilterKind::Grayscale).is_err());
}
