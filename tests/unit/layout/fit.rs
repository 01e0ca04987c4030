use super::*;

const EPS: f64 = 1e-9;

fn panel() -> Rect {
    Rect::new(20.0, 20.0, 660.0, 500.0)
}

#[test]
fn cover_fit_wider_source_scales_by_height_and_centres_x() {
    let p = cover_fit(1920.0, 1080.0, panel());
    assert!((p.height - 480.0).abs() < EPS);
    assert!(p.width > 640.0);
    assert!((p.origin.y - 20.0).abs() < EPS);
    let centre_x = p.origin.x + p.width * 0.5;
    assert!((centre_x - 340.0).abs() < EPS);
    assert!(((p.width / p.height) - 1920.0 / 1080.0).abs() < EPS);
}

#[test]
fn cover_fit_taller_source_scales_by_width_and_centres_y() {
    let p = cover_fit(480.0, 640.0, panel());
    assert!((p.width - 640.0).abs() < EPS);
    assert!(p.height > 480.0);
    assert!((p.origin.x - 20.0).abs() < EPS);
    let centre_y = p.origin.y + p.height * 0.5;
    assert!((centre_y - 260.0).abs() < EPS);
    assert!(((p.width / p.height) - 0.75).abs() < EPS);
}

#[test]
fn cover_fit_always_covers_target() {
    for (w, h) in [(640.0, 480.0), (100.0, 1000.0), (1000.0, 100.0), (3.0, 3.0)] {
        let r = cover_fit(w, h, panel()).rect();
        assert!(r.x0 <= panel().x0 + EPS && r.x1 >= panel().x1 - EPS);
        assert!(r.y0 <= panel().y0 + EPS && r.y1 >= panel().y1 - EPS);
    }
}

#[test]
fn fit_within_never_overflows_or_upscales() {
    let footer = Rect::new(20.0, 1020.0, 660.0, 1180.0);

    let big = fit_within(2000.0, 500.0, footer).rect();
    assert!(big.x0 >= footer.x0 - EPS && big.x1 <= footer.x1 + EPS);
    assert!(big.y0 >= footer.y0 - EPS && big.y1 <= footer.y1 + EPS);

    let tall = fit_within(300.0, 900.0, footer);
    assert!((tall.height - 160.0).abs() < EPS);
    assert!(((tall.width / tall.height) - 300.0 / 900.0).abs() < EPS);

    let small = fit_within(50.0, 20.0, footer);
    assert_eq!(small.scale, 1.0);
    assert!((small.origin.x - (20.0 + 295.0)).abs() < EPS);
    assert!((small.origin.y - (1020.0 + 70.0)).abs() < EPS);
}

#[test]
fn placement_affine_maps_source_corners() {
    let p = cover_fit(320.0, 240.0, panel());
    let a = p.to_affine();
    let tl = a * kurbo::Point::new(0.0, 0.0);
    let br = a * kurbo::Point::new(320.0, 240.0);
    assert!((tl.x - 20.0).abs() < EPS && (tl.y - 20.0).abs() < EPS);
    assert!((br.x - 660.0).abs() < EPS && (br.y - 500.0).abs() < EPS);
}
