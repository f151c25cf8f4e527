use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;

use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::raster::buffer::RasterBuffer;
use crate::raster::resample::{ResizeFilter, resample};

/// JPEG quality used when the caller does not pick one.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Static output formats the codec can encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Lossless PNG with alpha.
    Png,
    /// Baseline JPEG; alpha is flattened away.
    Jpeg,
    /// Lossless WebP with alpha.
    Webp,
}

impl OutputFormat {
    /// MIME type written alongside encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Conventional file extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    /// Guess a format from a file name's extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// How [`ImageCodec::resize`] maps a source onto the requested box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fit {
    /// Use the requested size as-is; a missing side keeps the aspect ratio.
    #[default]
    Exact,
    /// Scale uniformly so the image fits inside the box.
    Contain,
    /// Scale uniformly to fill the box, then center-crop the overflow.
    Cover,
}

/// Result of decoding stored bytes.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Premultiplied RGBA8 raster at natural size.
    pub raster: RasterBuffer,
    /// Intrinsic width in pixels.
    pub natural_width: u32,
    /// Intrinsic height in pixels.
    pub natural_height: u32,
}

/// Codec collaborator used by scenes (decode) and exports (encode).
pub trait ImageCodec: Send + Sync + std::fmt::Debug {
    /// Decode raw bytes into a raster plus its natural size.
    fn decode(&self, bytes: &[u8]) -> SnapfadeResult<DecodedImage>;

    /// Resize a raster to fit the optional target box.
    fn resize(
        &self,
        raster: &RasterBuffer,
        target_width: Option<u32>,
        target_height: Option<u32>,
        fit: Fit,
    ) -> SnapfadeResult<RasterBuffer>;

    /// Encode a raster into `format`. `quality` only applies to lossy formats.
    fn encode(
        &self,
        raster: &RasterBuffer,
        format: OutputFormat,
        quality: Option<u8>,
    ) -> SnapfadeResult<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageRsCodec {
    /// Filter used by [`ImageCodec::resize`].
    pub filter: ResizeFilter,
}

impl ImageRsCodec {
    /// Codec with the default resize filter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8]) -> SnapfadeResult<DecodedImage> {
        let dyn_img = image::load_from_memory(bytes)
            .map_err(|e| SnapfadeError::decode(format!("decode image from memory: {e}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(SnapfadeError::decode("decoded image has zero area"));
        }

        let raster = RasterBuffer::from_straight_rgba8(width, height, rgba.into_raw())
            .map_err(|e| SnapfadeError::decode(e.to_string()))?;
        Ok(DecodedImage {
            raster,
            natural_width: width,
            natural_height: height,
        })
    }

    fn resize(
        &self,
        raster: &RasterBuffer,
        target_width: Option<u32>,
        target_height: Option<u32>,
        fit: Fit,
    ) -> SnapfadeResult<RasterBuffer> {
        let (w, h) = (f64::from(raster.width), f64::from(raster.height));
        let (tw, th) = match (target_width, target_height) {
            (None, None) => return Ok(raster.clone()),
            (Some(0), _) | (_, Some(0)) => {
                return Err(SnapfadeError::geometry("resize target must be > 0"));
            }
            (Some(tw), None) => (tw, proportional(h, f64::from(tw) / w)),
            (None, Some(th)) => (proportional(w, f64::from(th) / h), th),
            (Some(tw), Some(th)) => (tw, th),
        };

        match fit {
            Fit::Exact => resample(raster, tw, th, self.filter),
            Fit::Contain => {
                let s = (f64::from(tw) / w).min(f64::from(th) / h);
                resample(raster, proportional(w, s), proportional(h, s), self.filter)
            }
            Fit::Cover => {
                let s = (f64::from(tw) / w).max(f64::from(th) / h);
                let (cw, ch) = (proportional(w, s).max(tw), proportional(h, s).max(th));
                let scaled = resample(raster, cw, ch, self.filter)?;
                crop(&scaled, (cw - tw) / 2, (ch - th) / 2, tw, th)
            }
        }
    }

    fn encode(
        &self,
        raster: &RasterBuffer,
        format: OutputFormat,
        quality: Option<u8>,
    ) -> SnapfadeResult<Vec<u8>> {
        let rgba = raster.clone().into_rgba_image()?;
        let mut buf = Vec::new();
        match format {
            OutputFormat::Png | OutputFormat::Webp => {
                let fmt = match format {
                    OutputFormat::Png => image::ImageFormat::Png,
                    _ => image::ImageFormat::WebP,
                };
                image::DynamicImage::ImageRgba8(rgba)
                    .write_to(&mut Cursor::new(&mut buf), fmt)
                    .map_err(|e| SnapfadeError::encode(format!("encode {format:?}: {e}")))?;
            }
            OutputFormat::Jpeg => {
                let q = quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
                let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, q)
                    .encode_image(&rgb)
                    .map_err(|e| SnapfadeError::encode(format!("encode Jpeg: {e}")))?;
            }
        }
        Ok(buf)
    }
}

/// MIME type sniffed from the leading bytes, if `image` recognizes the container.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

fn proportional(side: f64, factor: f64) -> u32 {
    crate::foundation::math::scaled_dim(side, factor)
}

fn crop(src: &RasterBuffer, x: u32, y: u32, width: u32, height: u32) -> SnapfadeResult<RasterBuffer> {
    let row = width as usize * 4;
    let mut data = Vec::with_capacity(row * height as usize);
    for yy in y..y + height {
        let start = (yy as usize * src.width as usize + x as usize) * 4;
        data.extend_from_slice(&src.data[start..start + row]);
    }
    let mut out = RasterBuffer::from_premul_rgba8(width, height, data)?;
    out.premultiplied = src.premultiplied;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/image_codec.rs"]
mod tests;
