use std::sync::Arc;

use crate::codec::image_codec::{DecodedImage, ImageCodec};
use crate::foundation::core::{Background, Point, Size, Vec2};
use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::raster::buffer::RasterBuffer;
use crate::store::content::ContentStore;

/// Smallest layer scale factor accepted by [`Scene::scale_layer`].
pub const MIN_LAYER_SCALE: f64 = 0.05;
/// Largest layer scale factor accepted by [`Scene::scale_layer`].
pub const MAX_LAYER_SCALE: f64 = 10.0;
/// Largest canvas side accepted by [`Canvas::new`].
pub const MAX_CANVAS_DIM: u32 = 8192;

/// Output area of a scene, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// Fill painted under every layer.
    pub background: Background,
}

impl Canvas {
    /// Create a validated canvas.
    pub fn new(width: u32, height: u32, background: Background) -> SnapfadeResult<Self> {
        validate_canvas_dims(width, height)?;
        Ok(Self {
            width,
            height,
            background,
        })
    }

    /// Width in canvas pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in canvas pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

fn validate_canvas_dims(width: u32, height: u32) -> SnapfadeResult<()> {
    if width == 0 || height == 0 {
        return Err(SnapfadeError::geometry(format!(
            "canvas dimensions must be > 0 (got {width}x{height})"
        )));
    }
    if width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
        return Err(SnapfadeError::geometry(format!(
            "canvas {width}x{height} exceeds the {MAX_CANVAS_DIM}px limit"
        )));
    }
    Ok(())
}

/// A positioned, scaled reference to a decoded raster.
///
/// The raster is decoded once when the layer is created and shared for the scene's lifetime.
/// A layer whose source failed to decode keeps `raster == None` and is skipped at render time.
#[derive(Clone, Debug)]
pub struct Layer {
    source: String,
    position: Point,
    scale: f64,
    natural_width: u32,
    natural_height: u32,
    raster: Option<Arc<RasterBuffer>>,
}

impl Layer {
    /// Layer over an already decoded raster, at the origin and scale 1.
    pub fn new(source: impl Into<String>, raster: RasterBuffer) -> Self {
        Self {
            source: source.into(),
            position: Point::ZERO,
            scale: 1.0,
            natural_width: raster.width,
            natural_height: raster.height,
            raster: Some(Arc::new(raster.to_premultiplied())),
        }
    }

    /// Layer built from codec output.
    pub fn from_decoded(source: impl Into<String>, decoded: DecodedImage) -> Self {
        let mut layer = Self::new(source, decoded.raster);
        layer.natural_width = decoded.natural_width;
        layer.natural_height = decoded.natural_height;
        layer
    }

    /// Placeholder for a source whose bytes could not be decoded.
    pub fn unavailable(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            position: Point::ZERO,
            scale: 1.0,
            natural_width: 0,
            natural_height: 0,
            raster: None,
        }
    }

    /// Builder-style position setter.
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Name of the stored image this layer was created from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-left offset in canvas pixels. May be negative or beyond the canvas.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Uniform scale factor, always within `[MIN_LAYER_SCALE, MAX_LAYER_SCALE]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Intrinsic size captured at load time (zero when unavailable).
    pub fn natural_size(&self) -> (u32, u32) {
        (self.natural_width, self.natural_height)
    }

    /// Size in canvas pixels: natural size times scale.
    pub fn render_size(&self) -> Size {
        Size::new(
            f64::from(self.natural_width) * self.scale,
            f64::from(self.natural_height) * self.scale,
        )
    }

    /// Cached natural-size raster, if decoding succeeded.
    pub fn raster(&self) -> Option<&RasterBuffer> {
        self.raster.as_deref()
    }
}

/// A canvas plus an ordered layer stack and the current selection.
///
/// Index 0 paints first (bottom); the last layer paints on top. The selected index, when set,
/// always points at an existing layer.
#[derive(Clone, Debug)]
pub struct Scene {
    canvas: Canvas,
    layers: Vec<Layer>,
    selected: Option<usize>,
}

impl Scene {
    /// Empty scene over `canvas`.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            layers: Vec::new(),
            selected: None,
        }
    }

    /// Canvas definition.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Layers in paint order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer at `index`.
    pub fn layer(&self, index: usize) -> SnapfadeResult<&Layer> {
        self.layers.get(index).ok_or_else(|| out_of_range(index))
    }

    /// Index of the layer targeted by subsequent edits.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Change the selection; `None` clears it.
    pub fn select(&mut self, index: Option<usize>) -> SnapfadeResult<()> {
        if let Some(i) = index {
            self.check_index(i)?;
        }
        self.selected = index;
        Ok(())
    }

    /// Change the canvas size. Layers keep their positions.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> SnapfadeResult<()> {
        validate_canvas_dims(width, height)?;
        self.canvas.width = width;
        self.canvas.height = height;
        Ok(())
    }

    /// Change the canvas background.
    pub fn set_background(&mut self, background: Background) {
        self.canvas.background = background;
    }

    /// Append `layer` on top of the stack and select it.
    pub fn push_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        let idx = self.layers.len() - 1;
        self.selected = Some(idx);
        idx
    }

    /// Load `name` from the content store, decode it once, and push it as a new top layer.
    ///
    /// A missing image is an error. Bytes that fail to decode still produce a layer, which the
    /// compositor skips with a warning.
    pub fn add_layer(
        &mut self,
        name: &str,
        store: &ContentStore,
        codec: &dyn ImageCodec,
        position: Point,
    ) -> SnapfadeResult<usize> {
        check_point(position)?;
        let stored = store.get(name)?;
        let layer = match codec.decode(&stored.bytes) {
            Ok(decoded) => Layer::from_decoded(name, decoded),
            Err(err) => {
                tracing::warn!(source = name, error = %err, "layer source failed to decode");
                Layer::unavailable(name)
            }
        };
        Ok(self.push_layer(layer.at(position)))
    }

    /// Place the layer's top-left corner at `position`.
    pub fn move_layer(&mut self, index: usize, position: Point) -> SnapfadeResult<()> {
        check_point(position)?;
        self.layer_mut(index)?.position = position;
        Ok(())
    }

    /// Shift the layer by `delta` canvas pixels.
    pub fn nudge_layer(&mut self, index: usize, delta: Vec2) -> SnapfadeResult<()> {
        let next = self.layer(index)?.position + delta;
        self.move_layer(index, next)
    }

    /// Set the layer's scale, clamped to `[MIN_LAYER_SCALE, MAX_LAYER_SCALE]`.
    ///
    /// Returns the scale actually applied. Non-finite or non-positive input is rejected.
    pub fn scale_layer(&mut self, index: usize, scale: f64) -> SnapfadeResult<f64> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SnapfadeError::geometry(format!(
                "layer scale must be finite and > 0 (got {scale})"
            )));
        }
        let clamped = scale.clamp(MIN_LAYER_SCALE, MAX_LAYER_SCALE);
        self.layer_mut(index)?.scale = clamped;
        Ok(clamped)
    }

    /// Move the layer at `from` so it ends up at index `to`; the selection follows its layer.
    pub fn reorder_layer(&mut self, from: usize, to: usize) -> SnapfadeResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);

        self.selected = self.selected.map(|sel| {
            if sel == from {
                to
            } else if from < sel && sel <= to {
                sel - 1
            } else if to <= sel && sel < from {
                sel + 1
            } else {
                sel
            }
        });
        Ok(())
    }

    /// Move the layer to the top of the stack.
    pub fn bring_to_front(&mut self, index: usize) -> SnapfadeResult<()> {
        let top = self.layers.len().saturating_sub(1);
        self.reorder_layer(index, top)
    }

    /// Move the layer to the bottom of the stack.
    pub fn send_to_back(&mut self, index: usize) -> SnapfadeResult<()> {
        self.reorder_layer(index, 0)
    }

    /// Remove and return the layer at `index`.
    ///
    /// Deleting the selected layer clears the selection; deleting a layer below it shifts the
    /// selection down so it keeps pointing at the same layer.
    pub fn delete_layer(&mut self, index: usize) -> SnapfadeResult<Layer> {
        self.check_index(index)?;
        let removed = self.layers.remove(index);
        self.selected = match self.selected {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
        Ok(removed)
    }

    fn layer_mut(&mut self, index: usize) -> SnapfadeResult<&mut Layer> {
        self.layers.get_mut(index).ok_or_else(|| out_of_range(index))
    }

    fn check_index(&self, index: usize) -> SnapfadeResult<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(out_of_range(index))
        }
    }
}

fn out_of_range(index: usize) -> SnapfadeError {
    SnapfadeError::validation(format!("layer index {index} is out of range"))
}

fn check_point(p: Point) -> SnapfadeResult<()> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(())
    } else {
        Err(SnapfadeError::geometry(format!(
            "layer position must be finite (got {}, {})",
            p.x, p.y
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
