use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::foundation::math::mul_div255_u8;
use crate::raster::buffer::RasterBuffer;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over: `dst = src + dst * (1 - src.a)` on premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = 255u16 - u16::from(sa);
            let mut out = [0u8; 4];
            for i in 0..4 {
                out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
            }
            out
        }
    }
}

/// Blend `src` over `dst` with its top-left corner at `(dx, dy)` in `dst` pixel space.
///
/// Offsets may be negative or past the far edge; pixels landing outside `dst` are discarded.
pub fn blit_over(dst: &mut RasterBuffer, src: &RasterBuffer, dx: i64, dy: i64) -> SnapfadeResult<()> {
    if !dst.premultiplied || !src.premultiplied {
        return Err(SnapfadeError::validation(
            "blit_over expects premultiplied buffers",
        ));
    }
    dst.check_layout()?;
    src.check_layout()?;

    let (dw, dh) = (i64::from(dst.width), i64::from(dst.height));
    let (sw, sh) = (i64::from(src.width), i64::from(src.height));

    let x0 = dx.max(0);
    let x1 = dx.saturating_add(sw).min(dw);
    let y0 = dy.max(0);
    let y1 = dy.saturating_add(sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let run = ((x1 - x0) * 4) as usize;
    for y in y0..y1 {
        let d_start = ((y * dw + x0) * 4) as usize;
        let s_start = (((y - dy) * sw + (x0 - dx)) * 4) as usize;
        let d_row = &mut dst.data[d_start..d_start + run];
        let s_row = &src.data[s_start..s_start + run];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
