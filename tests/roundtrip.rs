mod common;

use common::{RawBmp, noise_pattern};
use enough::Unstoppable;
use zenmono::*;

#[test]
fn decode_reads_headers_palette_and_padded_rows() {
    let pixels = [10, 20, 30, 40, 50, 60];
    let raw = RawBmp::new(3, 2, &pixels, 0xAA);
    let image = decode_bmp8(&raw.bytes(), Unstoppable).unwrap();

    assert_eq!(image.file_header.magic, *b"BM");
    assert_eq!(image.file_header.file_size, 0xDEAD);
    assert_eq!(image.file_header.reserved1, 0x1111);
    assert_eq!(image.file_header.reserved2, 0x2222);
    assert_eq!(image.info_header.width, 3);
    assert_eq!(image.info_header.height, 2);
    assert_eq!(image.info_header.bit_count, 8);
    assert_eq!(image.info_header.image_size, 0xBEEF);
    assert!(image.info_header.is_bottom_up());

    assert_eq!(image.palette.entries()[0], PaletteEntry { blue: 255, green: 0, red: 0, reserved: 7 });
    assert!(!image.palette.is_grayscale());

    assert_eq!(image.pixels.stride(), 4);
    assert_eq!(image.pixels.padding(), 1);
    // Padding bytes are kept as read.
    assert_eq!(image.pixels.as_bytes(), &[10, 20, 30, 0xAA, 40, 50, 60, 0xAA]);
    assert_eq!(image.pixels.to_packed(), pixels);
}

#[test]
fn encode_passes_rows_through_and_rewrites_palette_and_sizes() {
    let pixels = noise_pattern(5, 3);
    let raw = RawBmp::new(5, 3, &pixels, 0);
    let mut image = decode_bmp8(&raw.bytes(), Unstoppable).unwrap();
    let encoded = encode_bmp8(&mut image, Unstoppable).unwrap();

    assert_eq!(encoded.len(), PIXEL_DATA_OFFSET + 8 * 3);
    assert_eq!(&encoded[PIXEL_DATA_OFFSET..], &raw.rows[..]);

    let again = decode_bmp8(&encoded, Unstoppable).unwrap();
    assert!(again.palette.is_grayscale());
    assert_eq!(again.file_header.file_size as usize, encoded.len());
    assert_eq!(again.file_header.pixel_offset as usize, PIXEL_DATA_OFFSET);
    assert_eq!(again.file_header.reserved1, 0x1111);
    assert_eq!(again.info_header.image_size, 8 * 3);
    assert_eq!(again.info_header.x_pels_per_meter, 3780);
    assert_eq!(again.pixels.to_packed(), pixels);
}

#[test]
fn top_down_rows_are_not_flipped() {
    let pixels = [1, 2, 3, 4, 5, 6, 7, 8];
    let mut raw = RawBmp::new(4, 2, &pixels, 0);
    raw.height = -2;
    let mut image = decode_bmp8(&raw.bytes(), Unstoppable).unwrap();
    assert_eq!(image.height(), 2);
    assert!(!image.info_header.is_bottom_up());
    assert_eq!(image.pixels.row(0), &[1, 2, 3, 4]);

    let encoded = encode_bmp8(&mut image, Unstoppable).unwrap();
    let height = i32::from_le_bytes(encoded[22..26].try_into().unwrap());
    assert_eq!(height, -2);
    assert_eq!(&encoded[PIXEL_DATA_OFFSET..], &pixels);
}

#[test]
fn encode_takes_dimensions_from_pixels() {
    let raw = RawBmp::new(4, 4, &[0u8; 16], 0);
    let mut image = decode_bmp8(&raw.bytes(), Unstoppable).unwrap();
    let pixels = noise_pattern(8, 6);
    image.pixels = PixelBuffer::from_packed(&pixels, 8, 6).unwrap();

    let encoded = encode_bmp8(&mut image, Unstoppable).unwrap();
    assert_eq!((image.info_header.width, image.info_header.height), (8, 6));
    assert_eq!(encoded.len(), PIXEL_DATA_OFFSET + 8 * 6);

    let again = decode_bmp8(&encoded, Unstoppable).unwrap();
    assert_eq!((again.width(), again.height()), (8, 6));
    assert_eq!(again.pixels.to_packed(), pixels);
}

#[test]
fn encode_keeps_top_down_sign_when_resizing() {
    let mut raw = RawBmp::new(4, 4, &[0u8; 16], 0);
    raw.height = -4;
    let mut image = decode_bmp8(&raw.bytes(), Unstoppable).unwrap();
    image.pixels = PixelBuffer::new(5, 3).unwrap();

    let encoded = encode_bmp8(&mut image, Unstoppable).unwrap();
    assert_eq!(i32::from_le_bytes(encoded[18..22].try_into().unwrap()), 5);
    assert_eq!(i32::from_le_bytes(encoded[22..26].try_into().unwrap()), -3);
}

#[test]
fn width_one_uses_three_padding_bytes() {
    let raw = RawBmp::new(1, 3, &[9, 8, 7], 0xFF);
    let image = decode_bmp8(&raw.bytes(), Unstoppable).unwrap();
    assert_eq!(image.pixels.stride(), 4);
    assert_eq!(image.pixels.padded_row(2), &[7, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn from_pixels_roundtrip() {
    let pixels = noise_pattern(7, 5);
    let buf = PixelBuffer::from_packed(&pixels, 7, 5).unwrap();
    let mut image = Bmp8::from_pixels(buf).unwrap();
    let encoded = encode_bmp8(&mut image, Unstoppable).unwrap();
    assert_eq!(Some(encoded.len()), image.encoded_len());
    let decoded = decode_bmp8(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded, image);
}

// ── Rejections ──────────────────────────────────────────────────────

#[test]
fn non_8bit_is_format_error() {
    for bits in [1u16, 4, 16, 24, 32] {
        let mut raw = RawBmp::new(4, 4, &[0u8; 16], 0);
        raw.bit_count = bits;
        let err = decode_bmp8(&raw.bytes(), Unstoppable).unwrap_err();
        assert!(matches!(err, BinarizeError::UnsupportedVariant(_)), "{bits}: {err:?}");
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

#[test]
fn compressed_is_format_error() {
    let mut raw = RawBmp::new(4, 4, &[0u8; 16], 0);
    raw.compression = 1;
    let err = decode_bmp8(&raw.bytes(), Unstoppable).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn bad_magic_is_unrecognized() {
    let mut bytes = RawBmp::new(4, 4, &[0u8; 16], 0).bytes();
    bytes[0] = b'P';
    assert!(matches!(
        decode_bmp8(&bytes, Unstoppable),
        Err(BinarizeError::UnrecognizedFormat)
    ));
}

#[test]
fn zero_or_negative_width_is_invalid_header() {
    for width in [0, -4] {
        let mut raw = RawBmp::new(4, 4, &[0u8; 16], 0);
        raw.width = width;
        assert!(matches!(
            decode_bmp8(&raw.bytes(), Unstoppable),
            Err(BinarizeError::InvalidHeader(_))
        ));
    }
}

#[test]
fn truncated_headers() {
    let bytes = RawBmp::new(4, 4, &[0u8; 16], 0).bytes();
    assert!(matches!(
        decode_bmp8(&bytes[..10], Unstoppable),
        Err(BinarizeError::TruncatedHeader("file"))
    ));
    let err = decode_bmp8(&bytes[..40], Unstoppable).unwrap_err();
    assert!(matches!(err, BinarizeError::TruncatedHeader("info")));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_palette() {
    let bytes = RawBmp::new(4, 4, &[0u8; 16], 0).bytes();
    let err = decode_bmp8(&bytes[..54 + 4 * 100 + 2], Unstoppable).unwrap_err();
    match err {
        BinarizeError::TruncatedPalette { needed: 256, actual: 100 } => {}
        ref other => panic!("expected TruncatedPalette, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_rows_are_io_class() {
    let bytes = RawBmp::new(4, 4, &[0u8; 16], 0).bytes();
    let err = decode_bmp8(&bytes[..bytes.len() - 5], Unstoppable).unwrap_err();
    match err {
        BinarizeError::TruncatedPixelData { row: 2 } => {}
        ref other => panic!("expected TruncatedPixelData, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn headers_only_probe() {
    let mut raw = RawBmp::new(6, 2, &[0u8; 12], 0);
    let bytes = raw.bytes();
    // Headers parse even when the palette is missing.
    let (file, info) = read_bmp8_headers(&bytes[..54]).unwrap();
    assert_eq!(file.magic, *b"BM");
    assert_eq!((info.width, info.height), (6, 2));

    raw.bit_count = 24;
    assert!(read_bmp8_headers(&raw.bytes()).is_err());
}

// ── Limits ───────────────────────────────────────────────────────────

#[test]
fn limits_reject_before_decoding_rows() {
    let bytes = RawBmp::new(8, 8, &[0u8; 64], 0).bytes();
    let limits = Limits {
        max_pixels: Some(63),
        ..Default::default()
    };
    match decode_bmp8_with_limits(&bytes, &limits, Unstoppable) {
        Err(BinarizeError::LimitExceeded(_)) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }

    let roomy = Limits {
        max_pixels: Some(64),
        max_memory_bytes: Some(64),
        ..Default::default()
    };
    assert!(decode_bmp8_with_limits(&bytes, &roomy, Unstoppable).is_ok());
}

#[cfg(feature = "imgref")]
#[test]
fn imgref_view_skips_padding() {
    let raw = RawBmp::new(3, 2, &[1, 2, 3, 4, 5, 6], 0xEE);
    let image = decode_bmp8(&raw.bytes(), Unstoppable).unwrap();
    let view = image.pixels.as_imgref();
    assert_eq!(view.width(), 3);
    assert_eq!(view.height(), 2);
    assert_eq!(view.stride(), 4);
    let rows: Vec<Vec<u8>> = view.rows().map(|r| r.to_vec()).collect();
    assert_eq!(rows, [vec![1, 2, 3], vec![4, 5, 6]]);
}
