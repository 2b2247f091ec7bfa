//! 8-bit indexed BMP encoder.

use alloc::vec::Vec;
use enough::Stop;

use super::{Bmp8, FileHeader, InfoHeader, Palette, too_large};
use crate::error::BinarizeError;

/// Serialize `image` after rewriting its palette to the grayscale ramp and
/// its size/offset fields to match the output.
pub(crate) fn encode_bmp8(image: &mut Bmp8, stop: &dyn Stop) -> Result<Vec<u8>, BinarizeError> {
    image.prepare_for_output()?;
    let file_size = image
        .encoded_len()
        .ok_or_else(|| too_large(image.width(), image.height()))?;

    stop.check()?;

    let mut out = Vec::with_capacity(file_size);
    write_file_header(&mut out, &image.file_header);
    write_info_header(&mut out, &image.info_header);
    write_palette(&mut out, &image.palette);

    let stride = image.pixels.stride();
    for (row, bytes) in image.pixels.as_bytes().chunks_exact(stride).enumerate() {
        if row % 16 == 0 {
            stop.check()?;
        }
        out.extend_from_slice(bytes);
    }

    debug_assert_eq!(out.len(), file_size);
    Ok(out)
}

fn write_file_header(out: &mut Vec<u8>, h: &FileHeader) {
    out.extend_from_slice(&h.magic);
    out.extend_from_slice(&h.file_size.to_le_bytes());
    out.extend_from_slice(&h.reserved1.to_le_bytes());
    out.extend_from_slice(&h.reserved2.to_le_bytes());
    out.extend_from_slice(&h.pixel_offset.to_le_bytes());
}

fn write_info_header(out: &mut Vec<u8>, h: &InfoHeader) {
    out.extend_from_slice(&h.header_size.to_le_bytes());
    out.extend_from_slice(&h.width.to_le_bytes());
    out.extend_from_slice(&h.height.to_le_bytes()); // sign kept, rows not flipped
    out.extend_from_slice(&h.planes.to_le_bytes());
    out.extend_from_slice(&h.bit_count.to_le_bytes());
    out.extend_from_slice(&h.compression.to_le_bytes());
    out.extend_from_slice(&h.image_size.to_le_bytes());
    out.extend_from_slice(&h.x_pels_per_meter.to_le_bytes());
    out.extend_from_slice(&h.y_pels_per_meter.to_le_bytes());
    out.extend_from_slice(&h.colors_used.to_le_bytes());
    out.extend_from_slice(&h.colors_important.to_le_bytes());
}

fn write_palette(out: &mut Vec<u8>, palette: &Palette) {
    for e in palette.entries() {
        out.extend_from_slice(&[e.blue, e.green, e.red, e.reserved]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::{FILE_HEADER_LEN, INFO_HEADER_LEN, PIXEL_DATA_OFFSET, PixelBuffer};
    use enough::Unstoppable;

    #[test]
    fn header_layout_matches_offsets() {
        let pixels = PixelBuffer::from_packed(&[1, 2, 3, 4, 5, 6], 3, 2).unwrap();
        let mut image = Bmp8::from_pixels(pixels).unwrap();
        let out = encode_bmp8(&mut image, &Unstoppable).unwrap();

        assert_eq!(&out[0..2], b"BM");
        assert_eq!(u32::from_le_bytes(out[2..6].try_into().unwrap()), out.len() as u32);
        assert_eq!(
            u32::from_le_bytes(out[10..14].try_into().unwrap()),
            PIXEL_DATA_OFFSET as u32
        );
        let info = &out[FILE_HEADER_LEN..FILE_HEADER_LEN + INFO_HEADER_LEN];
        assert_eq!(u32::from_le_bytes(info[0..4].try_into().unwrap()), 40);
        assert_eq!(i32::from_le_bytes(info[4..8].try_into().unwrap()), 3);
        assert_eq!(i32::from_le_bytes(info[8..12].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(info[14..16].try_into().unwrap()), 8);
        // biSizeImage: two rows of stride 4
        assert_eq!(u32::from_le_bytes(info[20..24].try_into().unwrap()), 8);
        assert_eq!(out.len(), PIXEL_DATA_OFFSET + 8);
        assert_eq!(&out[PIXEL_DATA_OFFSET..], &[1, 2, 3, 0, 4, 5, 6, 0]);
    }

    #[test]
    fn palette_is_overwritten() {
        let pixels = PixelBuffer::new(4, 1).unwrap();
        let mut image = Bmp8::from_pixels(pixels).unwrap();
        image.palette = Palette::new([crate::bmp::PaletteEntry {
            blue: 1,
            green: 2,
            red: 3,
            reserved: 4,
        }; 256]);
        let out = encode_bmp8(&mut image, &Unstoppable).unwrap();
        assert!(image.palette.is_grayscale());
        let table = &out[FILE_HEADER_LEN + INFO_HEADER_LEN..PIXEL_DATA_OFFSET];
        for (i, quad) in table.chunks_exact(4).enumerate() {
            assert_eq!(quad, &[i as u8, i as u8, i as u8, 0]);
        }
    }
}
