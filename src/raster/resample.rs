use image::imageops::FilterType;

use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::raster::buffer::RasterBuffer;

/// Resampling filter used when a layer or image is drawn at a size other than its natural one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbour; blocky but exact for integer upscales.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

impl ResizeFilter {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Resample the whole of `src` to exactly `width x height`.
///
/// The alpha convention of `src` is preserved. Premultiplied input avoids dark fringes at
/// transparent edges.
pub fn resample(
    src: &RasterBuffer,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> SnapfadeResult<RasterBuffer> {
    if width == 0 || height == 0 {
        return Err(SnapfadeError::geometry(format!(
            "resample target must be > 0 (got {width}x{height})"
        )));
    }
    src.check_layout()?;
    if (width, height) == (src.width, src.height) {
        return Ok(src.clone());
    }

    let img = image::RgbaImage::from_raw(src.width, src.height, src.data.clone())
        .ok_or_else(|| SnapfadeError::geometry("raster byte length does not match dimensions"))?;
    let out = image::imageops::resize(&img, width, height, filter.filter_type());

    Ok(RasterBuffer {
        width,
        height,
        data: out.into_raw(),
        premultiplied: src.premultiplied,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/resample.rs"]
mod tests;
