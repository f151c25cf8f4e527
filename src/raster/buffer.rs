use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// A fixed-size grid of RGBA8 pixels.
///
/// Pixels produced by the compositor are **premultiplied alpha**; the `premultiplied` flag makes
/// the convention explicit at API boundaries, as codecs expect straight alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl RasterBuffer {
    /// Fully transparent premultiplied buffer.
    pub fn new_transparent(width: u32, height: u32) -> SnapfadeResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
            premultiplied: true,
        })
    }

    /// Premultiplied buffer where every pixel is `px`.
    pub fn filled(width: u32, height: u32, px: [u8; 4]) -> SnapfadeResult<Self> {
        let mut out = Self::new_transparent(width, height)?;
        out.fill(px);
        Ok(out)
    }

    /// Wrap straight-alpha RGBA8 bytes, converting them to premultiplied form.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> SnapfadeResult<Self> {
        check_len(width, height, data.len())?;
        premultiply_rgba8_in_place(&mut data);
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Wrap bytes that are already premultiplied.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> SnapfadeResult<Self> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Check that `data` holds exactly `width * height` RGBA8 pixels.
    ///
    /// The fields are public, so pixel loops call this before indexing.
    pub fn check_layout(&self) -> SnapfadeResult<()> {
        check_len(self.width, self.height, self.data.len())
    }

    /// Pixel at `(x, y)` in this buffer's alpha convention.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Overwrite every pixel with `px`.
    pub fn fill(&mut self, px: [u8; 4]) {
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Return the shared pixel value if every pixel is identical.
    pub fn uniform_pixel(&self) -> Option<[u8; 4]> {
        let mut it = self.data.chunks_exact(4);
        let first = it.next()?;
        it.all(|px| px == first)
            .then(|| [first[0], first[1], first[2], first[3]])
    }

    /// Copy of this buffer in straight alpha.
    pub fn to_straight(&self) -> Self {
        let mut out = self.clone();
        if out.premultiplied {
            unpremultiply_rgba8_in_place(&mut out.data);
            out.premultiplied = false;
        }
        out
    }

    /// Copy of this buffer in premultiplied alpha.
    pub fn to_premultiplied(&self) -> Self {
        let mut out = self.clone();
        if !out.premultiplied {
            premultiply_rgba8_in_place(&mut out.data);
            out.premultiplied = true;
        }
        out
    }

    /// Convert into a straight-alpha `image::RgbaImage` for encoding.
    pub fn into_rgba_image(self) -> SnapfadeResult<image::RgbaImage> {
        let straight = self.to_straight();
        image::RgbaImage::from_raw(straight.width, straight.height, straight.data)
            .ok_or_else(|| SnapfadeError::encode("raster byte length does not match dimensions"))
    }
}

fn byte_len(width: u32, height: u32) -> SnapfadeResult<usize> {
    if width == 0 || height == 0 {
        return Err(SnapfadeError::geometry(format!(
            "raster dimensions must be > 0 (got {width}x{height})"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| SnapfadeError::geometry(format!("raster {width}x{height} is too large")))
}

fn check_len(width: u32, height: u32, len: usize) -> SnapfadeResult<()> {
    let expected = byte_len(width, height)?;
    if len != expected {
        return Err(SnapfadeError::geometry(format!(
            "raster {width}x{height} expects {expected} bytes, got {len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
