use crate::foundation::error::{StripError, StripResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(src[i], mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Composite a premultiplied overlay surface onto `dst` in place.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> StripResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StripError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
