use std::borrow::Cow;
use std::collections::HashMap;

use crate::encode::color_key::{ColorKeyOpts, apply_color_key};
use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::raster::buffer::RasterBuffer;

/// MIME type of exported animations.
pub const GIF_MIME: &str = "image/gif";
/// Palette index reserved for the key color.
pub const SENTINEL_INDEX: u8 = 0;

/// Settings for [`export_single_play`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinglePlayOpts {
    /// Alpha binarization settings.
    pub color_key: ColorKeyOpts,
    /// Duration of the blank second frame, in hundredths of a second.
    pub vanish_delay_centis: u16,
    /// NeuQuant sampling factor (1 = best, 30 = fastest) used when the image has more colors
    /// than the palette can hold.
    pub quantize_speed: i32,
}

impl Default for SinglePlayOpts {
    fn default() -> Self {
        Self {
            color_key: ColorKeyOpts::default(),
            vanish_delay_centis: 10,
            quantize_speed: 10,
        }
    }
}

/// Encode `buffer` as a two-frame GIF that shows the image for `show_duration_secs`, then
/// becomes fully transparent, and does not loop.
///
/// Frame 1 is the color-keyed image with the key declared transparent and disposal set to
/// "restore background", so frame 2 (all key color) leaves nothing behind. No NETSCAPE loop
/// extension is written, which GIF viewers treat as "play once".
#[tracing::instrument(skip(buffer, opts), fields(width = buffer.width, height = buffer.height))]
pub fn export_single_play(
    buffer: &RasterBuffer,
    show_duration_secs: f64,
    opts: &SinglePlayOpts,
) -> SnapfadeResult<Vec<u8>> {
    validate_show_duration(show_duration_secs)?;
    buffer.check_layout()?;
    let (width, height) = gif_dims(buffer)?;

    let keyed = apply_color_key(buffer, &opts.color_key);
    let indexed = index_colors(&keyed, opts)?;
    let show_delay = secs_to_centis(show_duration_secs);

    let appear = gif::Frame {
        width,
        height,
        buffer: Cow::Owned(indexed.indices),
        delay: show_delay,
        dispose: gif::DisposalMethod::Background,
        transparent: Some(SENTINEL_INDEX),
        ..gif::Frame::default()
    };
    let vanish = gif::Frame {
        width,
        height,
        buffer: Cow::Owned(vec![SENTINEL_INDEX; usize::from(width) * usize::from(height)]),
        delay: opts.vanish_delay_centis.max(1),
        dispose: gif::DisposalMethod::Keep,
        transparent: Some(SENTINEL_INDEX),
        ..gif::Frame::default()
    };

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &indexed.palette)
            .map_err(|e| SnapfadeError::encode(format!("start gif stream: {e}")))?;
        encoder
            .write_frame(&appear)
            .map_err(|e| SnapfadeError::encode(format!("write gif frame 1: {e}")))?;
        encoder
            .write_frame(&vanish)
            .map_err(|e| SnapfadeError::encode(format!("write gif frame 2: {e}")))?;
    }
    tracing::debug!(bytes = out.len(), show_delay, "encoded single-play gif");
    Ok(out)
}

/// Longest show duration a GIF frame delay can express, in seconds.
pub const MAX_SHOW_DURATION_SECS: f64 = u16::MAX as f64 / 100.0;

/// Reject durations that are not finite and positive, or that the GIF delay field cannot hold.
pub fn validate_show_duration(secs: f64) -> SnapfadeResult<()> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(SnapfadeError::validation(format!(
            "show duration must be finite and > 0 (got {secs})"
        )));
    }
    if (secs * 100.0).round() > f64::from(u16::MAX) {
        return Err(SnapfadeError::validation(format!(
            "show duration {secs}s exceeds the {MAX_SHOW_DURATION_SECS}s a gif frame can hold"
        )));
    }
    Ok(())
}

/// Seconds to GIF delay units (1/100 s), rounded, within `1..=u16::MAX`.
pub fn secs_to_centis(secs: f64) -> u16 {
    (secs * 100.0).round().clamp(1.0, f64::from(u16::MAX)) as u16
}

fn gif_dims(buffer: &RasterBuffer) -> SnapfadeResult<(u16, u16)> {
    let w = u16::try_from(buffer.width).ok().filter(|w| *w > 0);
    let h = u16::try_from(buffer.height).ok().filter(|h| *h > 0);
    match (w, h) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(SnapfadeError::encode(format!(
            "gif cannot encode {}x{} (sides must be 1..=65535)",
            buffer.width, buffer.height
        ))),
    }
}

struct IndexedImage {
    /// RGB triples; entry 0 is the key color.
    palette: Vec<u8>,
    indices: Vec<u8>,
}

/// Map the keyed raster onto a palette with the key at [`SENTINEL_INDEX`].
///
/// Up to 255 distinct visible colors are kept exactly, numbered in scan order. Beyond that the
/// visible pixels are quantized with NeuQuant; both paths are deterministic.
fn index_colors(keyed: &RasterBuffer, opts: &SinglePlayOpts) -> SnapfadeResult<IndexedImage> {
    let key = opts.color_key.sentinel.opaque();
    let mut palette = vec![key[0], key[1], key[2]];
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut indices = Vec::with_capacity(keyed.data.len() / 4);

    for px in keyed.data.chunks_exact(4) {
        if px == key {
            indices.push(SENTINEL_INDEX);
            continue;
        }
        let rgb = [px[0], px[1], px[2]];
        if let Some(&idx) = lookup.get(&rgb) {
            indices.push(idx);
            continue;
        }
        if lookup.len() == 255 {
            return quantize(keyed, opts);
        }
        let idx = (lookup.len() + 1) as u8;
        lookup.insert(rgb, idx);
        palette.extend_from_slice(&rgb);
        indices.push(idx);
    }

    Ok(IndexedImage { palette, indices })
}

fn quantize(keyed: &RasterBuffer, opts: &SinglePlayOpts) -> SnapfadeResult<IndexedImage> {
    if !(1..=30).contains(&opts.quantize_speed) {
        return Err(SnapfadeError::encode(format!(
            "quantize speed must be within 1..=30 (got {})",
            opts.quantize_speed
        )));
    }
    let key = opts.color_key.sentinel.opaque();
    let visible: Vec<u8> = keyed
        .data
        .chunks_exact(4)
        .filter(|px| *px != key)
        .flatten()
        .copied()
        .collect();

    let nq = color_quant::NeuQuant::new(opts.quantize_speed, 255, &visible);
    let mut palette = vec![key[0], key[1], key[2]];
    palette.extend_from_slice(&nq.color_map_rgb());

    let indices = keyed
        .data
        .chunks_exact(4)
        .map(|px| {
            if px == key {
                SENTINEL_INDEX
            } else {
                (nq.index_of(px) + 1) as u8
            }
        })
        .collect();

    tracing::debug!("palette overflow, quantized visible colors");
    Ok(IndexedImage { palette, indices })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
