use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::codec::image_codec::ImageCodec;
use crate::foundation::core::{Background, Point};
use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::scene::model::{Canvas, Scene};
use crate::store::content::ContentStore;

/// JSON description of a scene, as saved by an editor client.
///
/// ```json
/// { "canvas": { "width": 100, "height": 100, "background": "#ffffff" },
///   "layers": [ { "source": "cat.png", "x": 25, "y": 25, "scale": 0.5 } ] }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDef {
    /// Canvas definition.
    pub canvas: CanvasDef,
    /// Layers bottom to top.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

/// Canvas section of a [`SceneDef`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasDef {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `"transparent"` (default) or `"#rrggbb"`.
    #[serde(default)]
    pub background: Background,
}

/// One layer of a [`SceneDef`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerDef {
    /// Stored image name.
    pub source: String,
    /// Left offset in canvas pixels.
    #[serde(default)]
    pub x: f64,
    /// Top offset in canvas pixels.
    #[serde(default)]
    pub y: f64,
    /// Uniform scale (clamped on load).
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl SceneDef {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SnapfadeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SnapfadeError::validation(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SnapfadeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SnapfadeError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Materialize the scene: every layer source is fetched and decoded once.
    ///
    /// Missing sources fail the whole build; undecodable ones become skipped layers.
    pub fn build(&self, store: &ContentStore, codec: &dyn ImageCodec) -> SnapfadeResult<Scene> {
        let canvas = Canvas::new(self.canvas.width, self.canvas.height, self.canvas.background)?;
        let mut scene = Scene::new(canvas);
        for layer in &self.layers {
            let idx = scene.add_layer(&layer.source, store, codec, Point::new(layer.x, layer.y))?;
            scene.scale_layer(idx, layer.scale)?;
        }
        scene.select(None)?;
        Ok(scene)
    }
}

impl Scene {
    /// Snapshot the scene back into its JSON form.
    pub fn to_def(&self) -> SceneDef {
        SceneDef {
            canvas: CanvasDef {
                width: self.canvas().width(),
                height: self.canvas().height(),
                background: self.canvas().background,
            },
            layers: self
                .layers()
                .iter()
                .map(|l| LayerDef {
                    source: l.source().to_string(),
                    x: l.position().x,
                    y: l.position().y,
                    scale: l.scale(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/def.rs"]
mod tests;
