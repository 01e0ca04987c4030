use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn params(n: usize) -> LayoutParams {
    LayoutParams {
        panel_count: n,
        panel_width: 640.0,
        aspect_ratio: 4.0 / 3.0,
        spacing: 20.0,
        horizontal_padding: 30.0,
        footer_height: 150.0,
    }
}

#[test]
fn two_panel_golden_geometry() {
    let l = compute_layout(params(2)).unwrap();
    assert!(approx(l.panel_height, 480.0));
    assert!(approx(l.total_width, 700.0));
    assert!(approx(l.total_height, 2.0 * 500.0 + 150.0 + 20.0));
    assert_eq!(l.panel_origins.len(), 2);
    assert!(approx(l.panel_origins[0].x, 30.0) && approx(l.panel_origins[0].y, 20.0));
    assert!(approx(l.panel_origins[1].x, 30.0) && approx(l.panel_origins[1].y, 520.0));
    assert!(approx(l.footer_origin.y, 1020.0));
    let footer = l.footer_rect();
    assert!(approx(footer.x1, 670.0) && approx(footer.height(), 150.0));
    assert!(approx(footer.y1, l.total_height));
}

#[test]
fn canvas_height_formula_and_monotonic_in_panel_count() {
    let mut prev = 0.0;
    for n in 1..=4usize {
        let l = compute_layout(params(n)).unwrap();
        let expected = (n as f64) * (l.panel_height + l.spacing) + l.footer_height + l.spacing;
        assert!(approx(l.total_height, expected));
        assert!(l.total_height > prev);
        assert_eq!(l.panel_count(), n);
        prev = l.total_height;
    }
}

#[test]
fn panels_do_not_overlap_and_keep_spacing() {
    let l = compute_layout(params(4)).unwrap();
    let rects: Vec<Rect> = l.panel_rects().collect();
    for w in rects.windows(2) {
        assert!(approx(w[1].y0 - w[0].y1, l.spacing));
    }
    assert!(approx(l.footer_rect().y0 - rects[3].y1, l.spacing));
    assert!(l.panel_rect(4).is_none());
}

#[test]
fn invalid_inputs_are_rejected() {
    assert!(matches!(
        compute_layout(params(0)),
        Err(StripError::InvalidConfig(_))
    ));
    let mutations: [fn(&mut LayoutParams); 4] = [
        |p| p.panel_width = 0.0,
        |p| p.aspect_ratio = -1.0,
        |p| p.spacing = 0.0,
        |p| p.footer_height = f64::NAN,
    ];
    for mutate in mutations {
        let mut p = params(2);
        mutate(&mut p);
        assert!(matches!(compute_layout(p), Err(StripError::InvalidConfig(_))));
    }
}

#[test]
fn designs_parse_like_the_wizard() {
    assert_eq!("4x1".parse::<StripDesign>().unwrap().panel_count(), 4);
    assert_eq!(" 3X1 ".parse::<StripDesign>().unwrap().panel_count(), 3);
    assert_eq!("2x1".parse::<StripDesign>().unwrap().to_string(), "2x1");
    assert_eq!(
        "4x1".parse::<StripDesign>().unwrap().display_label(),
        "4 in 1"
    );
    for bad in ["", "4", "x1", "0x1", "4x2", "ax1"] {
        assert!(bad.parse::<StripDesign>().is_err(), "{bad}");
    }
    for d in StripDesign::OFFERED {
        d.parse::<StripDesign>().unwrap();
    }
}
