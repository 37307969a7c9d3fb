use super::*;
use crate::foundation::core::widen_u8;

fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            buf.put_pixel(
                x,
                y,
                [
                    widen_u8((x * 40) as u8),
                    widen_u8((y * 40) as u8),
                    widen_u8(200),
                    widen_u8(255 - (x as u8)),
                ],
            );
        }
    }
    buf
}

#[test]
fn png_round_trip_8bit() {
    let buf = gradient(5, 4);
    let bytes = encode(&buf, ImageFormat::Png).unwrap();
    let (back, format) = decode(&bytes).unwrap();
    assert_eq!(format, ImageFormat::Png);
    assert_eq!(back, buf);
}

#[test]
fn png_round_trip_16bit() {
    let buf = PixelBuffer::from_raw(2, 1, vec![1, 2, 3, 4, 65535, 1000, 0, 32768]).unwrap();
    let bytes = encode(&buf, ImageFormat::Png).unwrap();
    let (back, _) = decode(&bytes).unwrap();
    assert_eq!(back, buf);
}

#[test]
fn jpeg_is_close_and_opaque() {
    let buf = PixelBuffer::filled(16, 16, [widen_u8(120), widen_u8(60), widen_u8(30), u16::MAX]);
    let bytes = encode(&buf, ImageFormat::Jpeg).unwrap();
    let (back, format) = decode(&bytes).unwrap();
    assert_eq!(format, ImageFormat::Jpeg);
    assert_eq!(back.dimensions(), (16, 16));
    assert!(back.is_opaque());

    let px = back.pixel(8, 8);
    for (got, want) in px[..3].iter().zip([120u8, 60, 30]) {
        let got = narrow_u16(*got) as i32;
        assert!((got - want as i32).abs() <= 4, "channel {got} vs {want}");
    }
}

#[test]
fn decode_rejects_garbage_and_foreign_containers() {
    assert!(matches!(
        decode(b"definitely not an image"),
        Err(WatermarkError::Decode(_))
    ));
    assert!(matches!(
        decode(b"GIF89a\x01\x00\x01\x00"),
        Err(WatermarkError::UnsupportedFormat(_))
    ));

    let mut truncated = encode(&gradient(4, 4), ImageFormat::Png).unwrap();
    truncated.truncate(30);
    assert!(matches!(decode(&truncated), Err(WatermarkError::Decode(_))));
}

#[test]
fn header_probe_reads_dimensions() {
    let bytes = encode(&gradient(7, 3), ImageFormat::Png).unwrap();
    assert_eq!(decode_header(&bytes).unwrap(), (7, 3, ImageFormat::Png));

    let jpeg = encode(&gradient(9, 2), ImageFormat::Jpeg).unwrap();
    assert_eq!(decode_header(&jpeg).unwrap(), (9, 2, ImageFormat::Jpeg));
}

#[test]
fn encode_named_rejects_unknown_formats() {
    let buf = gradient(2, 2);
    assert!(encode_named(&buf, "jpg").is_ok());
    assert!(matches!(
        encode_named(&buf, "webp"),
        Err(WatermarkError::UnsupportedFormat(_))
    ));
}

#[test]
fn decode_reports_source_depth() {
    let eight = encode(&gradient(3, 3), ImageFormat::Png).unwrap();
    assert_eq!(decode_image(&eight).unwrap().depth, BitDepth::Eight);

    let sixteen = PixelBuffer::from_raw(1, 1, vec![1, 2, 3, 4]).unwrap();
    let bytes = encode(&sixteen, ImageFormat::Png).unwrap();
    assert_eq!(decode_image(&bytes).unwrap().depth, BitDepth::Sixteen);

    let jpeg = encode(&gradient(3, 3), ImageFormat::Jpeg).unwrap();
    assert_eq!(decode_image(&jpeg).unwrap().depth, BitDepth::Eight);
}

#[test]
fn eight_bit_png_rounds_off_grid_samples() {
    // 1000 is not an exact 8-bit value; forced 8-bit output narrows it.
    let buf = PixelBuffer::from_raw(1, 1, vec![1000, 0, 65535, 40000]).unwrap();
    let bytes = encode_with_depth(&buf, ImageFormat::Png, BitDepth::Eight).unwrap();
    let decoded = decode_image(&bytes).unwrap();
    assert_eq!(decoded.depth, BitDepth::Eight);
    assert_eq!(
        decoded.buffer.pixel(0, 0),
        [
            widen_u8(narrow_u16(1000)),
            0,
            65535,
            widen_u8(narrow_u16(40000))
        ]
    );

    let wide = encode_with_depth(&buf, ImageFormat::Png, BitDepth::Sixteen).unwrap();
    assert_eq!(decode(&wide).unwrap().0, buf);
}
