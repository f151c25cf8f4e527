use crate::foundation::core::Background;
use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::foundation::math::scaled_dim;
use crate::raster::buffer::RasterBuffer;
use crate::raster::composite::blit_over;
use crate::raster::resample::{ResizeFilter, resample};
use crate::scene::model::{Canvas, Scene};

/// Upper bounds checked before any pixel work starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderLimits {
    /// Largest output side in pixels.
    pub max_output_dim: u32,
    /// Largest output area in pixels.
    pub max_output_pixels: u64,
    /// Largest resampled layer side in pixels.
    pub max_layer_dim: u32,
    /// Largest resampled layer area in pixels.
    pub max_layer_pixels: u64,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_output_dim: 16_384,
            max_output_pixels: 64 * 1024 * 1024,
            max_layer_dim: 32_768,
            max_layer_pixels: 128 * 1024 * 1024,
        }
    }
}

/// Compositor settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositorOpts {
    /// Work bounds.
    pub limits: RenderLimits,
    /// Filter used to resample layers to their output size.
    pub filter: ResizeFilter,
}

/// Non-fatal problem encountered while rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderWarning {
    /// The layer's source never decoded, so it was left out.
    LayerSkipped {
        /// Index of the layer in paint order.
        index: usize,
        /// Stored image name of the layer.
        source: String,
    },
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderWarning::LayerSkipped { index, source } => {
                write!(f, "layer {index} ('{source}') skipped: source could not be decoded")
            }
        }
    }
}

/// A flattened scene plus any warnings raised on the way.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Premultiplied RGBA8 result.
    pub buffer: RasterBuffer,
    /// Layers that were skipped.
    pub warnings: Vec<RenderWarning>,
}

struct LayerPlacement {
    index: usize,
    width: u32,
    height: u32,
    dx: i64,
    dy: i64,
}

/// Flattens a [`Scene`] at an arbitrary output scale.
///
/// Rendering is a pure function of the scene and the scale: layers paint bottom to top with
/// source-over, each resampled in full and clipped only against the output bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compositor {
    opts: CompositorOpts,
}

impl Compositor {
    /// Compositor with explicit settings.
    pub fn new(opts: CompositorOpts) -> Self {
        Self { opts }
    }

    /// Settings in use.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// Output size for `canvas` at `output_scale`, after validating both against the limits.
    pub fn output_size(&self, canvas: &Canvas, output_scale: f64) -> SnapfadeResult<(u32, u32)> {
        check_scale(output_scale)?;
        let w = scaled_dim(f64::from(canvas.width()), output_scale);
        let h = scaled_dim(f64::from(canvas.height()), output_scale);
        let limits = &self.opts.limits;
        if w > limits.max_output_dim
            || h > limits.max_output_dim
            || u64::from(w) * u64::from(h) > limits.max_output_pixels
        {
            return Err(SnapfadeError::geometry(format!(
                "output {w}x{h} at scale {output_scale} exceeds render limits"
            )));
        }
        Ok((w, h))
    }

    /// Flatten `scene` into a raster of `canvas * output_scale` pixels.
    ///
    /// Layers whose source failed to decode are skipped and reported in
    /// [`RenderOutput::warnings`]; every other problem is rejected before painting starts.
    #[tracing::instrument(skip(self, scene), fields(layers = scene.layers().len()))]
    pub fn render(&self, scene: &Scene, output_scale: f64) -> SnapfadeResult<RenderOutput> {
        let (width, height) = self.output_size(scene.canvas(), output_scale)?;

        let mut warnings = Vec::new();
        let mut placements = Vec::with_capacity(scene.layers().len());
        for (index, layer) in scene.layers().iter().enumerate() {
            let Some(raster) = layer.raster() else {
                tracing::warn!(index, source = layer.source(), "skipping undecodable layer");
                warnings.push(RenderWarning::LayerSkipped {
                    index,
                    source: layer.source().to_string(),
                });
                continue;
            };
            raster.check_layout()?;

            let (nw, nh) = layer.natural_size();
            let factor = layer.scale() * output_scale;
            let lw = scaled_dim(f64::from(nw), factor);
            let lh = scaled_dim(f64::from(nh), factor);
            let limits = &self.opts.limits;
            if lw > limits.max_layer_dim
                || lh > limits.max_layer_dim
                || u64::from(lw) * u64::from(lh) > limits.max_layer_pixels
            {
                return Err(SnapfadeError::geometry(format!(
                    "layer {index} would render at {lw}x{lh}, exceeding render limits"
                )));
            }

            let pos = layer.position();
            placements.push(LayerPlacement {
                index,
                width: lw,
                height: lh,
                dx: (pos.x * output_scale).round() as i64,
                dy: (pos.y * output_scale).round() as i64,
            });
        }

        let mut buffer = RasterBuffer::new_transparent(width, height)?;
        if let Background::Solid(color) = scene.canvas().background {
            buffer.fill(color.opaque());
        }

        for p in placements {
            let Some(source) = scene.layers()[p.index].raster() else {
                continue;
            };
            let scaled = resample(source, p.width, p.height, self.opts.filter)?;
            blit_over(&mut buffer, &scaled, p.dx, p.dy)?;
        }

        Ok(RenderOutput { buffer, warnings })
    }
}

/// Render with default settings.
pub fn render(scene: &Scene, output_scale: f64) -> SnapfadeResult<RenderOutput> {
    Compositor::default().render(scene, output_scale)
}

fn check_scale(output_scale: f64) -> SnapfadeResult<()> {
    if output_scale.is_finite() && output_scale > 0.0 {
        Ok(())
    } else {
        Err(SnapfadeError::geometry(format!(
            "output scale must be finite and > 0 (got {output_scale})"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
