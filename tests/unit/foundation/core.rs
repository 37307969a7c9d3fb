use super::*;

#[test]
fn widen_and_narrow_are_inverse_on_u8() {
    for v in 0..=255u8 {
        assert_eq!(narrow_u16(widen_u8(v)), v);
    }
    assert_eq!(widen_u8(255), u16::MAX);
}

#[test]
fn from_raw_checks_len() {
    assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
    assert!(matches!(err, WatermarkError::InvalidConfiguration(_)));
}

#[test]
fn pixel_access_is_row_major() {
    let mut buf = PixelBuffer::new(3, 2);
    buf.put_pixel(2, 1, [1, 2, 3, 4]);
    assert_eq!(buf.pixel(2, 1), [1, 2, 3, 4]);
    assert_eq!(&buf.as_raw()[20..24], &[1, 2, 3, 4]);
    assert_eq!(buf.row(1).len(), 12);
}

#[test]
fn premul_rgba8_is_demultiplied() {
    let buf = PixelBuffer::from_premul_rgba8(2, 1, &[64, 0, 128, 128, 9, 9, 9, 0]).unwrap();
    let px = buf.pixel(0, 0);
    assert_eq!(narrow_u16(px[0]), 128);
    assert_eq!(narrow_u16(px[2]), 255);
    assert_eq!(narrow_u16(px[3]), 128);
    assert_eq!(buf.pixel(1, 0), TRANSPARENT);
}

#[test]
fn anchor_names_round_trip() {
    for a in Anchor::ALL {
        assert_eq!(a.name().parse::<Anchor>().unwrap(), a);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a.name()));
    }
    assert_eq!("Top-Left".parse::<Anchor>().unwrap(), Anchor::TopLeft);
    assert!("middle".parse::<Anchor>().is_err());
    assert_eq!(Anchor::default(), Anchor::BottomRight);
}

#[test]
fn anchor_axes() {
    assert_eq!(Anchor::Center.horizontal(), HAlign::Center);
    assert_eq!(Anchor::Center.vertical(), VAlign::Middle);
    assert_eq!(Anchor::LeftCenter.horizontal(), HAlign::Left);
    assert_eq!(Anchor::RightCenter.vertical(), VAlign::Middle);
    assert_eq!(Anchor::BottomCenter.vertical(), VAlign::Bottom);
}

#[test]
fn image_format_names() {
    assert_eq!("jpg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
    assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
    assert!(matches!(
        "gif".parse::<ImageFormat>(),
        Err(WatermarkError::UnsupportedFormat(_))
    ));
    assert_eq!(ImageFormat::from_mime_type("image/jpeg"), ImageFormat::Jpeg);
    assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
}
