use super::*;

#[test]
fn premul_then_unpremul_is_close() {
    let mut px = vec![200u8, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![100, 50, 25, 128]);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px.iter().zip([200u8, 100, 50, 128]) {
        assert!(got.abs_diff(want) <= 2);
    }
}

#[test]
fn zero_alpha_clears_colour() {
    let mut px = vec![10u8, 20, 30, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}
