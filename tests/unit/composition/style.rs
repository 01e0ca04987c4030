use std::collections::HashMap;
use std::io::Cursor;

use super::*;

struct MapAssets(HashMap<String, Vec<u8>>);

impl AssetResolver for MapAssets {
    fn resolve(&self, id: &str) -> StripResult<Vec<u8>> {
        self.0
            .get(id)
            .cloned()
            .ok_or_else(|| StripError::asset_load(format!("no asset '{id}'")))
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn footer_prefers_logo_over_caption() {
    let f = FooterContent::from_parts(Some(vec![1, 2]), Some("hi".into()));
    assert!(matches!(f, FooterContent::Logo(_)));
    let f = FooterContent::from_parts(None, Some("hi".into()));
    assert_eq!(f, FooterContent::Caption("hi".into()));
    assert_eq!(
        FooterContent::from_parts(None, Some("  ".into())),
        FooterContent::None
    );
}

#[test]
fn style_spec_parses_and_resolves() {
    let spec = StyleSpec::from_json_str(
        r##"{
            "design": "3x1",
            "background": "#ffeedd",
            "filter": "grayscale",
            "sticker": { "image": "star.png" },
            "pattern": "Happy Sunday",
            "caption": "ignored because a pattern is set"
        }"##,
    )
    .unwrap();

    let mut map = HashMap::new();
    map.insert("star.png".to_string(), png_bytes());
    map.insert("Happy Sunday".to_string(), vec![9, 9, 9]);
    let style = spec.resolve(&MapAssets(map)).unwrap();

    assert_eq!(style.panel_count, 3);
    assert_eq!(style.background, Rgb8::new(0xff, 0xee, 0xdd));
    assert_eq!(style.filter, FilterKind::Grayscale);
    assert!(matches!(style.sticker, Some(Sticker::Image(ref i)) if i.width == 4));
    assert_eq!(style.footer, FooterContent::Logo(Arc::new(vec![9, 9, 9])));
}

#[test]
fn missing_assets_fall_back_without_failing() {
    let spec = StyleSpec::from_json_str(
        r#"{ "design": "2x1", "sticker": { "image": "nope.png" }, "pattern": "nope" }"#,
    )
    .unwrap();
    let style = spec.resolve(&MapAssets(HashMap::new())).unwrap();
    assert_eq!(style.footer, FooterContent::None);
    assert_eq!(style.sticker, None);
    assert_eq!(style.background, Rgb8::WHITE);
    assert_eq!(style.filter, FilterKind::None);
}

#[test]
fn bad_design_and_unknown_filter_are_rejected() {
    let bad_design = StyleSpec::from_json_str(r#"{ "design": "fourxone" }"#).unwrap();
    assert!(matches!(
        bad_design.resolve(&MapAssets(HashMap::new())),
        Err(StripError::InvalidConfig(_))
    ));

    let unknown = StyleSpec::from_json_str(r#"{ "design": "2x1", "filter": "sepia" }"#);
    assert!(matches!(unknown, Err(StripError::UnknownFilter(ref f)) if f == "sepia"));

    let built = StyleSpec {
        filter: Some("Sepia".into()),
        ..StyleSpec::from_json_str(r#"{ "design": "2x1" }"#).unwrap()
    };
    assert!(matches!(
        built.resolve(&MapAssets(HashMap::new())),
        Err(StripError::UnknownFilter(_))
    ));
    assert!(StyleSpec::from_json_str(r##"{ "design": "2x1", "colour": "#fff" }"##).is_err());
}

#[test]
fn caption_is_used_when_no_pattern() {
    let spec = StyleSpec::from_json_str(
        r#"{ "design": "4x1", "caption": "Joy!", "sticker": { "glyph": "*" } }"#,
    )
    .unwrap();
    let style = spec.resolve(&MapAssets(HashMap::new())).unwrap();
    assert_eq!(style.footer, FooterContent::Caption("Joy!".into()));
    assert_eq!(style.sticker, Some(Sticker::Glyph("*".into())));
}

#[test]
fn style_builders_validate_panel_count() {
    assert!(StyleConfig::new(0).is_err());
    let s = StyleConfig::new(2)
        .unwrap()
        .with_filter(FilterKind::Smoothing)
        .with_background(Rgb8::new(1, 2, 3));
    assert_eq!(s.filter, FilterKind::Smoothing);
    assert_eq!(s.background, Rgb8::new(1, 2, 3));
    let d = StyleConfig::for_design("4x1".parse().unwrap());
    assert_eq!(d.panel_count, 4);
}

#[test]
fn download_names_follow_design_and_pattern() {
    assert_eq!(
        download_filename(Some("4x1"), Some("Saved by Grace"), OutputFormat::default()),
        "4x1-Saved_by_Grace-photo.jpg"
    );
    assert_eq!(
        download_filename(None, None, OutputFormat::Png),
        "photo-default-photo.png"
    );
}
