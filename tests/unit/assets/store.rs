use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn builtin_catalog_maps_names_case_insensitively() {
    let cat = PatternCatalog::builtin();
    assert_eq!(cat.entries().len(), 3);
    assert_eq!(
        cat.source_for("happy sunday"),
        Some("patterns/pattern-2.png")
    );
    assert_eq!(cat.source_for("Unknown"), None);
}

#[test]
fn dir_resolver_reads_catalog_and_raw_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    std::fs::create_dir_all(dir.join("patterns")).unwrap();
    std::fs::write(dir.join("patterns").join("pattern-1.png"), b"p1").unwrap();
    std::fs::write(dir.join("logo.png"), b"logo").unwrap();

    let resolver = DirAssetResolver::new(dir);
    assert_eq!(resolver.resolve("Saved by Grace").unwrap(), b"p1");
    assert_eq!(resolver.resolve("logo.png").unwrap(), b"logo");

    let err = resolver.resolve("missing.png").unwrap_err();
    assert!(matches!(err, StripError::AssetLoad(_)));
    assert!(resolver.resolve("../escape.png").is_err());
}

#[test]
fn text_layout_rejects_bad_size_and_font() {
    let mut engine = TextLayoutEngine::new();
    let brush = TextBrushRgba8::default();
    assert!(
        engine
            .layout_single_line_bold("hi", b"not a font", 0.0, brush)
            .is_err()
    );
    assert!(
        engine
            .layout_single_line_bold("hi", b"not a font", 12.0, brush)
            .is_err()
    );
}
