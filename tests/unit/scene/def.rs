use super::*;
use crate::codec::image_codec::ImageRsCodec;
use crate::foundation::core::Rgb8;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([9, 9, 9, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn parse_applies_defaults() {
    let json = r#"{
        "canvas": { "width": 64, "height": 32 },
        "layers": [ { "source": "a.png" }, { "source": "b.png", "x": -5, "y": 2.5, "scale": 2 } ]
    }"#;
    let def = SceneDef::from_reader(json.as_bytes()).unwrap();
    assert_eq!(def.canvas.background, Background::Transparent);
    assert_eq!(def.layers[0].scale, 1.0);
    assert_eq!((def.layers[0].x, def.layers[0].y), (0.0, 0.0));
    assert_eq!((def.layers[1].x, def.layers[1].y), (-5.0, 2.5));
}

#[test]
fn parse_rejects_unknown_fields() {
    let json = r#"{ "canvas": { "width": 1, "height": 1, "depth": 3 } }"#;
    assert!(matches!(
        SceneDef::from_reader(json.as_bytes()),
        Err(SnapfadeError::Validation(_))
    ));
}

#[test]
fn build_loads_layers_clamps_scale_and_round_trips() {
    let store = ContentStore::in_memory();
    store.put("a.png", "image/png", &png(4, 4)).unwrap();

    let def = SceneDef {
        canvas: CanvasDef {
            width: 50,
            height: 40,
            background: Background::Solid(Rgb8::new(255, 255, 255)),
        },
        layers: vec![LayerDef {
            source: "a.png".to_string(),
            x: 1.0,
            y: 2.0,
            scale: 99.0,
        }],
    };
    let scene = def.build(&store, &ImageRsCodec::new()).unwrap();
    assert_eq!(scene.layers().len(), 1);
    assert_eq!(scene.selected(), None);
    assert_eq!(scene.layer(0).unwrap().scale(), 10.0);

    let back = scene.to_def();
    assert_eq!(back.canvas, def.canvas);
    assert_eq!(back.layers[0].scale, 10.0);
    assert_eq!(back.layers[0].source, "a.png");
}

#[test]
fn build_fails_on_missing_source_and_bad_canvas() {
    let store = ContentStore::in_memory();
    let codec = ImageRsCodec::new();
    let missing = SceneDef {
        canvas: CanvasDef {
            width: 10,
            height: 10,
            background: Background::Transparent,
        },
        layers: vec![LayerDef {
            source: "ghost.png".to_string(),
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }],
    };
    assert!(missing.build(&store, &codec).unwrap_err().is_not_found());

    let zero = SceneDef {
        canvas: CanvasDef {
            width: 0,
            height: 10,
            background: Background::Transparent,
        },
        layers: vec![],
    };
    assert!(matches!(
        zero.build(&store, &codec),
        Err(SnapfadeError::InvalidGeometry(_))
    ));
}
