use super::*;

#[test]
fn rgb_parses_long_and_short_hex() {
    assert_eq!("#ff0000".parse::<Rgb8>().unwrap(), Rgb8::new(255, 0, 0));
    assert_eq!("0a0b0c".parse::<Rgb8>().unwrap(), Rgb8::new(10, 11, 12));
    assert_eq!("#fff".parse::<Rgb8>().unwrap(), Rgb8::WHITE);
    assert!("#ff00".parse::<Rgb8>().is_err());
    assert!("#gg0000".parse::<Rgb8>().is_err());
}

#[test]
fn rgb_serde_uses_hex_strings() {
    let c: Rgb8 = serde_json::from_str("\"#336699\"").unwrap();
    assert_eq!(c, Rgb8::new(0x33, 0x66, 0x99));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#336699\"");
}

#[test]
fn pixel_rect_covering_rounds_outward_and_clamps() {
    let r = PixelRect::covering(Rect::new(10.2, 20.0, 30.5, 40.0), 2.0);
    assert_eq!(
        r,
        PixelRect {
            x0: 20,
            y0: 40,
            x1: 61,
            y1: 80
        }
    );
    let c = r.clamp_to(50, 60);
    assert_eq!((c.width(), c.height()), (30, 20));
    assert!(PixelRect::new(5, 5, 0, 3).is_empty());
}
