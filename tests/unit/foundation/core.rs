use super::*;

#[test]
fn parse_hex_accepts_with_and_without_hash() {
    assert_eq!(Rgb8::parse_hex("#ff0080").unwrap(), Rgb8::new(255, 0, 128));
    assert_eq!(Rgb8::parse_hex("00FF10").unwrap(), Rgb8::new(0, 255, 16));
}

#[test]
fn parse_hex_rejects_malformed() {
    assert!(Rgb8::parse_hex("#fff").is_err());
    assert!(Rgb8::parse_hex("#gg0000").is_err());
    assert!(Rgb8::parse_hex("").is_err());
}

#[test]
fn background_json_uses_string_form() {
    let solid = Background::Solid(Rgb8::new(1, 2, 3));
    assert_eq!(serde_json::to_string(&solid).unwrap(), "\"#010203\"");
    assert_eq!(
        serde_json::to_string(&Background::Transparent).unwrap(),
        "\"transparent\""
    );

    let back: Background = serde_json::from_str("\"Transparent\"").unwrap();
    assert_eq!(back, Background::Transparent);
    let back: Background = serde_json::from_str("\"#010203\"").unwrap();
    assert_eq!(back, solid);
    assert!(serde_json::from_str::<Background>("\"blue\"").is_err());
}

#[test]
fn opaque_sets_full_alpha() {
    assert_eq!(Rgb8::MAGENTA.opaque(), [255, 0, 255, 255]);
}
