use super::*;

#[test]
fn new_transparent_rejects_zero_dimensions() {
    assert!(matches!(
        RasterBuffer::new_transparent(0, 10),
        Err(SnapfadeError::InvalidGeometry(_))
    ));
    assert!(RasterBuffer::new_transparent(10, 0).is_err());
}

#[test]
fn filled_is_uniform() {
    let buf = RasterBuffer::filled(3, 2, [1, 2, 3, 255]).unwrap();
    assert_eq!(buf.data.len(), 3 * 2 * 4);
    assert_eq!(buf.uniform_pixel(), Some([1, 2, 3, 255]));
    assert_eq!(buf.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(buf.pixel(3, 0), None);
}

#[test]
fn from_straight_premultiplies() {
    let buf = RasterBuffer::from_straight_rgba8(1, 1, vec![100, 50, 200, 0]).unwrap();
    assert!(buf.premultiplied);
    assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn byte_length_mismatch_is_rejected() {
    assert!(RasterBuffer::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
}

#[test]
fn straight_round_trip_keeps_opaque_pixels() {
    let buf = RasterBuffer::from_straight_rgba8(1, 1, vec![10, 20, 30, 255]).unwrap();
    let straight = buf.to_straight();
    assert!(!straight.premultiplied);
    assert_eq!(straight.data, vec![10, 20, 30, 255]);
    assert_eq!(straight.to_premultiplied(), buf);
}

#[test]
fn into_rgba_image_is_straight() {
    let buf = RasterBuffer::from_premul_rgba8(1, 1, vec![64, 0, 0, 128]).unwrap();
    let img = buf.into_rgba_image().unwrap();
    let px = img.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!(px[0] >= 127 && px[0] <= 128);
}

#[test]
fn check_layout_catches_hand_built_buffers() {
    let good = RasterBuffer::filled(3, 2, [0, 0, 0, 0]).unwrap();
    good.check_layout().unwrap();

    let short = RasterBuffer {
        width: 10,
        height: 10,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(matches!(
        short.check_layout(),
        Err(SnapfadeError::InvalidGeometry(_))
    ));
}
