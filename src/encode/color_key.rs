use crate::foundation::core::Rgb8;
use crate::raster::buffer::RasterBuffer;

/// How translucent pixels are folded onto the key color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorKeyOpts {
    /// Color declared transparent to the encoder.
    pub sentinel: Rgb8,
    /// Pixels with alpha strictly below this become the sentinel; the rest become opaque.
    pub alpha_threshold: u8,
}

impl Default for ColorKeyOpts {
    fn default() -> Self {
        Self {
            sentinel: Rgb8::MAGENTA,
            alpha_threshold: 128,
        }
    }
}

impl ColorKeyOpts {
    /// Whether a pixel with `alpha` ends up as the sentinel.
    ///
    /// Alpha exactly at the threshold stays visible.
    pub fn keys_out(&self, alpha: u8) -> bool {
        alpha < self.alpha_threshold
    }
}

/// Binarize `buffer` against the key color.
///
/// The result is straight alpha with every pixel at alpha 255: keyed-out pixels are the
/// sentinel, the rest keep their un-premultiplied RGB. A visible pixel whose RGB equals the
/// sentinel is moved one step on the green channel so it cannot vanish.
pub fn apply_color_key(buffer: &RasterBuffer, opts: &ColorKeyOpts) -> RasterBuffer {
    let mut out = buffer.to_straight();
    let key = opts.sentinel.opaque();
    for px in out.data.chunks_exact_mut(4) {
        if opts.keys_out(px[3]) {
            px.copy_from_slice(&key);
            continue;
        }
        px[3] = 255;
        if px[..3] == key[..3] {
            px[1] = if px[1] == 255 { 254 } else { px[1] + 1 };
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/color_key.rs"]
mod tests;
