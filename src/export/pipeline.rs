use std::sync::Arc;

use crate::codec::image_codec::{ImageCodec, ImageRsCodec, OutputFormat};
use crate::encode::gif::{GIF_MIME, SinglePlayOpts, export_single_play, validate_show_duration};
use crate::foundation::core::Background;
use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::raster::buffer::RasterBuffer;
use crate::render::compositor::{Compositor, RenderOutput, RenderWarning};
use crate::scene::model::{Canvas, Layer, Scene};
use crate::store::alias::AliasTable;
use crate::store::blob::StoredImage;
use crate::store::content::{ContentStore, validate_name};

/// What gets flattened.
#[derive(Clone, Copy, Debug)]
pub enum ExportSource<'a> {
    /// A composed scene.
    Scene(&'a Scene),
    /// A raster already in memory, exported at its own size on a transparent canvas.
    Raster(&'a RasterBuffer),
    /// A stored image, exported at its natural size on a transparent canvas.
    Image(&'a str),
}

/// Parameters of a single-play GIF export.
#[derive(Clone, Debug, PartialEq)]
pub struct GifExportRequest {
    /// Name the GIF is stored under.
    pub output_name: String,
    /// How long frame 1 stays visible.
    pub show_duration_secs: f64,
    /// Multiplier applied to the canvas size.
    pub output_scale: f64,
    /// Existing alias to point at the result.
    pub alias: Option<String>,
}

impl GifExportRequest {
    /// Request at scale 1 with no alias.
    pub fn new(output_name: impl Into<String>, show_duration_secs: f64) -> Self {
        Self {
            output_name: output_name.into(),
            show_duration_secs,
            output_scale: 1.0,
            alias: None,
        }
    }
}

/// Parameters of a static image export.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticExportRequest {
    /// Name the image is stored under.
    pub output_name: String,
    /// Target container.
    pub format: OutputFormat,
    /// JPEG quality; ignored by the lossless formats.
    pub quality: Option<u8>,
    /// Multiplier applied to the canvas size.
    pub output_scale: f64,
    /// Existing alias to point at the result.
    pub alias: Option<String>,
}

impl StaticExportRequest {
    /// Request at scale 1 with default quality and no alias.
    pub fn new(output_name: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            output_name: output_name.into(),
            format,
            quality: None,
            output_scale: 1.0,
            alias: None,
        }
    }
}

/// A stored export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Stored image name.
    pub name: String,
    /// Stored content type.
    pub mime: String,
    /// Alias that now targets `name`, if one was updated.
    pub alias: Option<String>,
    /// Where to fetch the result: `/{alias}` when an alias was updated, `/{name}` otherwise.
    pub url: String,
    /// Layers skipped while flattening.
    pub warnings: Vec<RenderWarning>,
}

/// JSON body reporting an export to a client.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExportResponse {
    /// Whether the export was stored.
    pub success: bool,
    /// Location of the result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Failure description otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Non-fatal render warnings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ExportResponse {
    /// Fold an export result into a response body.
    pub fn from_result(result: &SnapfadeResult<ExportOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                url: Some(outcome.url.clone()),
                error: None,
                warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
            },
            Err(err) => Self {
                success: false,
                url: None,
                error: Some(err.to_string()),
                warnings: Vec::new(),
            },
        }
    }
}

/// Flattens, encodes and stores exports.
///
/// All request validation (names, alias existence, scale, duration) runs before any pixels are
/// produced, and nothing is stored unless encoding succeeded. If retargeting the alias fails,
/// the output name is restored to what it held before the export.
#[derive(Clone, Debug)]
pub struct Exporter {
    images: ContentStore,
    aliases: AliasTable,
    codec: Arc<dyn ImageCodec>,
    compositor: Compositor,
    gif: SinglePlayOpts,
}

impl Exporter {
    /// Exporter over shared stores with default compositor and GIF settings.
    pub fn new(images: ContentStore, aliases: AliasTable, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            images,
            aliases,
            codec,
            compositor: Compositor::default(),
            gif: SinglePlayOpts::default(),
        }
    }

    /// Exporter using [`ImageRsCodec`].
    pub fn with_default_codec(images: ContentStore, aliases: AliasTable) -> Self {
        Self::new(images, aliases, Arc::new(ImageRsCodec::new()))
    }

    /// Replace the compositor.
    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Replace the GIF settings.
    pub fn with_gif_opts(mut self, opts: SinglePlayOpts) -> Self {
        self.gif = opts;
        self
    }

    /// Render `source`, encode it as a single-play GIF, and store it.
    #[tracing::instrument(skip(self, source, req), fields(output = %req.output_name))]
    pub fn export_single_play(
        &self,
        source: ExportSource<'_>,
        req: &GifExportRequest,
    ) -> SnapfadeResult<ExportOutcome> {
        validate_show_duration(req.show_duration_secs)?;
        self.check_targets(&req.output_name, req.alias.as_deref())?;

        let rendered = self.flatten(source, req.output_scale)?;
        let bytes = export_single_play(&rendered.buffer, req.show_duration_secs, &self.gif)?;
        self.publish(
            &req.output_name,
            GIF_MIME,
            &bytes,
            req.alias.as_deref(),
            rendered.warnings,
        )
    }

    /// Render `source`, encode it as PNG, JPEG or WebP, and store it.
    #[tracing::instrument(skip(self, source, req), fields(output = %req.output_name))]
    pub fn export_static(
        &self,
        source: ExportSource<'_>,
        req: &StaticExportRequest,
    ) -> SnapfadeResult<ExportOutcome> {
        self.check_targets(&req.output_name, req.alias.as_deref())?;

        let rendered = self.flatten(source, req.output_scale)?;
        let bytes = self.codec.encode(&rendered.buffer, req.format, req.quality)?;
        self.publish(
            &req.output_name,
            req.format.mime(),
            &bytes,
            req.alias.as_deref(),
            rendered.warnings,
        )
    }

    fn check_targets(&self, output_name: &str, alias: Option<&str>) -> SnapfadeResult<()> {
        validate_name(output_name)?;
        if let Some(slug) = alias
            && self.aliases.get(slug)?.is_none()
        {
            return Err(SnapfadeError::not_found(format!("alias '{slug}'")));
        }
        Ok(())
    }

    fn flatten(&self, source: ExportSource<'_>, output_scale: f64) -> SnapfadeResult<RenderOutput> {
        match source {
            ExportSource::Scene(scene) => self.compositor.render(scene, output_scale),
            ExportSource::Raster(raster) => {
                let scene = single_layer_scene(Layer::new("raster", raster.clone()))?;
                self.compositor.render(&scene, output_scale)
            }
            ExportSource::Image(name) => {
                let stored = self.images.get(name)?;
                let decoded = self.codec.decode(&stored.bytes)?;
                let scene = single_layer_scene(Layer::from_decoded(name, decoded))?;
                self.compositor.render(&scene, output_scale)
            }
        }
    }

    fn publish(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
        alias: Option<&str>,
        warnings: Vec<RenderWarning>,
    ) -> SnapfadeResult<ExportOutcome> {
        let previous = match alias {
            Some(_) => self.images.try_get(name)?,
            None => None,
        };
        self.images.put(name, mime, bytes)?;
        if let Some(slug) = alias
            && let Err(err) = self.aliases.retarget(slug, Some(name))
        {
            self.roll_back(name, previous);
            return Err(err);
        }
        for w in &warnings {
            tracing::warn!(warning = %w, "export rendered with warnings");
        }

        let url = format!("/{}", alias.unwrap_or(name));
        tracing::debug!(%url, bytes = bytes.len(), "export stored");
        Ok(ExportOutcome {
            name: name.to_string(),
            mime: mime.to_string(),
            alias: alias.map(str::to_string),
            url,
            warnings,
        })
    }

    /// Put back whatever `name` held before a failed export.
    fn roll_back(&self, name: &str, previous: Option<StoredImage>) {
        let restored = match previous {
            Some(prev) => self.images.put(name, &prev.mime, &prev.bytes),
            None => self.images.delete(name).map(|_| ()),
        };
        if let Err(err) = restored {
            tracing::error!(name, error = %err, "could not roll back export after alias failure");
        }
    }
}

fn single_layer_scene(layer: Layer) -> SnapfadeResult<Scene> {
    let (w, h) = layer.natural_size();
    let mut scene = Scene::new(Canvas::new(w, h, Background::Transparent)?);
    scene.push_layer(layer);
    Ok(scene)
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
