use super::*;
use crate::foundation::core::Point;
use crate::store::alias::{Alias, AliasStore, MemoryAliasStore};

const RED: [u8; 4] = [255, 0, 0, 255];

fn setup() -> (ContentStore, AliasTable, Exporter) {
    let images = ContentStore::in_memory();
    let aliases = AliasTable::in_memory();
    let exporter = Exporter::with_default_codec(images.clone(), aliases.clone());
    (images, aliases, exporter)
}

fn red_scene() -> Scene {
    let mut scene = Scene::new(Canvas::new(100, 100, Background::Transparent).unwrap());
    let block = RasterBuffer::filled(50, 50, RED).unwrap();
    scene.push_layer(Layer::new("red.png", block).at(Point::new(25.0, 25.0)));
    scene
}

fn frame_count(bytes: &[u8]) -> usize {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut dec = opts.read_info(bytes).unwrap();
    let mut n = 0;
    while dec.read_next_frame().unwrap().is_some() {
        n += 1;
    }
    n
}

#[test]
fn gif_export_is_stored_under_its_name() {
    let (images, _, exporter) = setup();
    let scene = red_scene();
    let out = exporter
        .export_single_play(ExportSource::Scene(&scene), &GifExportRequest::new("fade.gif", 2.5))
        .unwrap();

    assert_eq!(out.name, "fade.gif");
    assert_eq!(out.mime, GIF_MIME);
    assert_eq!(out.url, "/fade.gif");
    assert_eq!(out.alias, None);
    assert!(out.warnings.is_empty());

    let stored = images.get("fade.gif").unwrap();
    assert_eq!(stored.mime, "image/gif");
    assert_eq!(frame_count(&stored.bytes), 2);
}

#[test]
fn export_retargets_an_existing_alias() {
    let (images, aliases, exporter) = setup();
    aliases.create("banner", None).unwrap();

    let scene = red_scene();
    let mut req = StaticExportRequest::new("banner-v1.png", OutputFormat::Png);
    req.alias = Some("banner".into());
    let out = exporter.export_static(ExportSource::Scene(&scene), &req).unwrap();

    assert_eq!(out.url, "/banner");
    assert_eq!(out.alias.as_deref(), Some("banner"));
    assert_eq!(
        aliases.get("banner").unwrap().unwrap().target.as_deref(),
        Some("banner-v1.png")
    );
    assert_eq!(images.get("banner-v1.png").unwrap().mime, "image/png");
}

#[test]
fn unknown_alias_fails_before_anything_is_stored() {
    let (images, _, exporter) = setup();
    let scene = red_scene();
    let mut req = GifExportRequest::new("fade.gif", 1.0);
    req.alias = Some("nope".into());

    let err = exporter
        .export_single_play(ExportSource::Scene(&scene), &req)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(images.try_get("fade.gif").unwrap().is_none());
}

#[test]
fn invalid_requests_store_nothing() {
    let (images, _, exporter) = setup();
    let scene = red_scene();

    let err = exporter
        .export_single_play(ExportSource::Scene(&scene), &GifExportRequest::new("x.gif", 0.0))
        .unwrap_err();
    assert!(matches!(err, SnapfadeError::Validation(_)));

    let err = exporter
        .export_single_play(ExportSource::Scene(&scene), &GifExportRequest::new("../x", 1.0))
        .unwrap_err();
    assert!(matches!(err, SnapfadeError::Validation(_)));

    let mut req = StaticExportRequest::new("x.png", OutputFormat::Png);
    req.output_scale = -1.0;
    let err = exporter.export_static(ExportSource::Scene(&scene), &req).unwrap_err();
    assert!(matches!(err, SnapfadeError::InvalidGeometry(_)));

    assert!(images.list().unwrap().is_empty());
}

#[test]
fn stored_image_source_exports_at_natural_size_times_scale() {
    let (images, _, exporter) = setup();
    let codec = ImageRsCodec::new();
    let png = codec
        .encode(&RasterBuffer::filled(10, 6, RED).unwrap(), OutputFormat::Png, None)
        .unwrap();
    images.put("src.png", "image/png", &png).unwrap();

    let mut req = StaticExportRequest::new("big.png", OutputFormat::Png);
    req.output_scale = 2.0;
    exporter.export_static(ExportSource::Image("src.png"), &req).unwrap();

    let decoded = codec.decode(&images.get("big.png").unwrap().bytes).unwrap();
    assert_eq!((decoded.natural_width, decoded.natural_height), (20, 12));
    assert_eq!(decoded.raster.uniform_pixel(), Some(RED));
}

#[test]
fn missing_image_source_is_not_found() {
    let (_, _, exporter) = setup();
    let err = exporter
        .export_single_play(ExportSource::Image("ghost.png"), &GifExportRequest::new("g.gif", 1.0))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn raster_source_is_exported_directly() {
    let (images, _, exporter) = setup();
    let raster = RasterBuffer::filled(4, 4, RED).unwrap();
    let out = exporter
        .export_static(
            ExportSource::Raster(&raster),
            &StaticExportRequest::new("r.webp", OutputFormat::Webp),
        )
        .unwrap();
    assert_eq!(out.mime, "image/webp");
    assert!(images.get("r.webp").is_ok());
}

#[test]
fn skipped_layers_surface_as_warnings() {
    let (_, _, exporter) = setup();
    let mut scene = red_scene();
    scene.push_layer(Layer::unavailable("broken.png"));

    let result = exporter.export_single_play(
        ExportSource::Scene(&scene),
        &GifExportRequest::new("w.gif", 1.0),
    );
    let out = result.as_ref().unwrap();
    assert_eq!(
        out.warnings,
        vec![RenderWarning::LayerSkipped {
            index: 1,
            source: "broken.png".into()
        }]
    );

    let resp = ExportResponse::from_result(&result);
    assert!(resp.success);
    assert_eq!(resp.warnings.len(), 1);
}

#[test]
fn response_json_shape() {
    let ok = ExportResponse::from_result(&Ok(ExportOutcome {
        name: "a.gif".into(),
        mime: GIF_MIME.into(),
        alias: None,
        url: "/a.gif".into(),
        warnings: Vec::new(),
    }));
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        serde_json::json!({ "success": true, "url": "/a.gif" })
    );

    let err = ExportResponse::from_result(&Err(SnapfadeError::not_found("alias 'x'")));
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        serde_json::json!({ "success": false, "error": "not found: alias 'x'" })
    );
}

/// Alias store whose retargets always fail, as a full disk would.
#[derive(Debug, Default)]
struct ReadOnlyAliases(MemoryAliasStore);

impl AliasStore for ReadOnlyAliases {
    fn insert(&self, alias: Alias) -> SnapfadeResult<()> {
        self.0.insert(alias)
    }
    fn get(&self, slug: &str) -> SnapfadeResult<Option<Alias>> {
        self.0.get(slug)
    }
    fn set_target(&self, _slug: &str, _target: Option<&str>) -> SnapfadeResult<()> {
        Err(SnapfadeError::store_write("disk full"))
    }
    fn remove(&self, slug: &str) -> SnapfadeResult<bool> {
        self.0.remove(slug)
    }
    fn list(&self) -> SnapfadeResult<Vec<Alias>> {
        self.0.list()
    }
}

fn read_only_alias_setup() -> (ContentStore, Exporter) {
    let images = ContentStore::in_memory();
    let aliases = AliasTable::new(Arc::new(ReadOnlyAliases::default()));
    aliases.create("promo", None).unwrap();
    let exporter = Exporter::with_default_codec(images.clone(), aliases);
    (images, exporter)
}

#[test]
fn failed_alias_update_removes_the_new_image() {
    let (images, exporter) = read_only_alias_setup();
    let scene = red_scene();
    let mut req = GifExportRequest::new("out.gif", 1.0);
    req.alias = Some("promo".into());

    let err = exporter
        .export_single_play(ExportSource::Scene(&scene), &req)
        .unwrap_err();
    assert!(matches!(err, SnapfadeError::StoreWrite(_)));
    assert_eq!(images.try_get("out.gif").unwrap(), None);
}

#[test]
fn failed_alias_update_restores_the_overwritten_image() {
    let (images, exporter) = read_only_alias_setup();
    images.put("out.png", "image/png", b"previous").unwrap();

    let scene = red_scene();
    let mut req = StaticExportRequest::new("out.png", OutputFormat::Png);
    req.alias = Some("promo".into());
    assert!(exporter.export_static(ExportSource::Scene(&scene), &req).is_err());

    let kept = images.get("out.png").unwrap();
    assert_eq!(kept.mime, "image/png");
    assert_eq!(kept.bytes, b"previous".to_vec());
}

#[test]
fn malformed_raster_source_is_rejected() {
    let (images, _, exporter) = setup();
    let short = RasterBuffer {
        width: 10,
        height: 10,
        data: vec![0; 4],
        premultiplied: true,
    };
    let err = exporter
        .export_single_play(ExportSource::Raster(&short), &GifExportRequest::new("s.gif", 1.0))
        .unwrap_err();
    assert!(matches!(err, SnapfadeError::InvalidGeometry(_)));
    assert!(images.list().unwrap().is_empty());
}
