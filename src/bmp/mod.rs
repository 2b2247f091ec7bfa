//! 8-bit indexed BMP codec.
//!
//! Only the classic layout is handled: a 14-byte file header, a 40-byte
//! `BITMAPINFOHEADER`, a 256-entry palette and uncompressed rows padded to
//! four bytes. Rows are kept in the order they appear in the file.

pub(crate) mod decode;
pub(crate) mod encode;

use alloc::vec;
use alloc::vec::Vec;

use crate::error::BinarizeError;

/// Size of the file header on disk.
pub const FILE_HEADER_LEN: usize = 14;
/// Size of a `BITMAPINFOHEADER` on disk.
pub const INFO_HEADER_LEN: usize = 40;
/// Number of palette entries in an 8-bit image.
pub const PALETTE_ENTRIES: usize = 256;
/// Offset of the first pixel row in files written by this crate.
pub const PIXEL_DATA_OFFSET: usize = FILE_HEADER_LEN + INFO_HEADER_LEN + PALETTE_ENTRIES * 4;

/// `BITMAPFILEHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: [u8; 2],
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

/// `BITMAPINFOHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Positive for bottom-up files, negative for top-down.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    /// Whether the first stored row is the bottom row of the picture.
    pub fn is_bottom_up(&self) -> bool {
        self.height > 0
    }
}

/// One `RGBQUAD` palette slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaletteEntry {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub reserved: u8,
}

impl PaletteEntry {
    pub const fn gray(level: u8) -> Self {
        Self {
            blue: level,
            green: level,
            red: level,
            reserved: 0,
        }
    }
}

/// The 256-entry color table of an 8-bit image, indexed by pixel value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette([PaletteEntry; PALETTE_ENTRIES]);

impl Palette {
    pub fn new(entries: [PaletteEntry; PALETTE_ENTRIES]) -> Self {
        Self(entries)
    }

    /// Linear ramp where entry `i` is `(i, i, i, 0)`.
    pub fn grayscale() -> Self {
        let mut entries = [PaletteEntry::default(); PALETTE_ENTRIES];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = PaletteEntry::gray(i as u8);
        }
        Self(entries)
    }

    pub fn entries(&self) -> &[PaletteEntry; PALETTE_ENTRIES] {
        &self.0
    }

    pub fn is_grayscale(&self) -> bool {
        self.0
            .iter()
            .enumerate()
            .all(|(i, e)| *e == PaletteEntry::gray(i as u8))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

/// Bytes per stored row for an 8-bit image `width` pixels wide.
pub fn row_stride(width: usize) -> Option<usize> {
    width.checked_add(3).map(|r| r & !3)
}

/// Padded, row-major 8-bit pixel storage.
///
/// `as_bytes().len()` is always `stride() * height()`. The trailing
/// `padding()` bytes of each row are filler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize,
}

impl PixelBuffer {
    /// Zero-filled buffer. Both dimensions must be nonzero.
    pub fn new(width: usize, height: usize) -> Result<Self, BinarizeError> {
        let (stride, len) = buffer_layout(width, height)?;
        Ok(Self {
            data: vec![0u8; len],
            width,
            height,
            stride,
        })
    }

    /// Wrap already padded rows. `data.len()` must be exactly
    /// `row_stride(width) * height`.
    pub fn from_padded(data: Vec<u8>, width: usize, height: usize) -> Result<Self, BinarizeError> {
        let (stride, len) = buffer_layout(width, height)?;
        if data.len() != len {
            return Err(BinarizeError::BufferTooSmall {
                needed: len,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Build from tightly packed rows (`width * height` bytes, no padding).
    pub fn from_packed(pixels: &[u8], width: usize, height: usize) -> Result<Self, BinarizeError> {
        let mut buf = Self::new(width, height)?;
        let needed = width * height;
        if pixels.len() < needed {
            return Err(BinarizeError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        for (y, src) in pixels[..needed].chunks_exact(width).enumerate() {
            buf.row_mut(y).copy_from_slice(src);
        }
        Ok(buf)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn padding(&self) -> usize {
        self.stride - self.width
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// The `width` pixel values of row `y`, without padding.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.stride..][..self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.stride..][..self.width]
    }

    /// Row `y` as stored, padding included.
    pub fn padded_row(&self, y: usize) -> &[u8] {
        &self.data[y * self.stride..][..self.stride]
    }

    /// Copy of the pixel values with padding removed.
    pub fn to_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            out.extend_from_slice(self.row(y));
        }
        out
    }

    /// Zero-copy view honoring the row stride.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, u8> {
        imgref::ImgRef::new_stride(&self.data, self.width, self.height, self.stride)
    }
}

pub(crate) fn too_large(width: usize, height: usize) -> BinarizeError {
    BinarizeError::DimensionsTooLarge {
        width: u32::try_from(width).unwrap_or(u32::MAX),
        height: u32::try_from(height).unwrap_or(u32::MAX),
    }
}

fn buffer_layout(width: usize, height: usize) -> Result<(usize, usize), BinarizeError> {
    if width == 0 || height == 0 {
        return Err(BinarizeError::EmptyImage);
    }
    let stride = row_stride(width).ok_or_else(|| too_large(width, height))?;
    let len = stride
        .checked_mul(height)
        .ok_or_else(|| too_large(width, height))?;
    Ok((stride, len))
}

/// A decoded 8-bit indexed bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bmp8 {
    pub file_header: FileHeader,
    pub info_header: InfoHeader,
    pub palette: Palette,
    pub pixels: PixelBuffer,
}

impl Bmp8 {
    /// Wrap a pixel buffer in default bottom-up headers and a grayscale
    /// palette (72 DPI, uncompressed).
    pub fn from_pixels(pixels: PixelBuffer) -> Result<Self, BinarizeError> {
        let mut image = Self {
            file_header: FileHeader {
                magic: *b"BM",
                file_size: 0,
                reserved1: 0,
                reserved2: 0,
                pixel_offset: 0,
            },
            info_header: InfoHeader {
                header_size: INFO_HEADER_LEN as u32,
                width: 0,
                height: 0,
                planes: 1,
                bit_count: 8,
                compression: 0,
                image_size: 0,
                x_pels_per_meter: 2835,
                y_pels_per_meter: 2835,
                colors_used: PALETTE_ENTRIES as u32,
                colors_important: 0,
            },
            palette: Palette::grayscale(),
            pixels,
        };
        image.prepare_for_output()?;
        Ok(image)
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// Exact length of the file [`crate::encode_bmp8`] will produce.
    pub fn encoded_len(&self) -> Option<usize> {
        self.pixels.as_bytes().len().checked_add(PIXEL_DATA_OFFSET)
    }

    /// Rewrite the palette to the grayscale ramp and make the dimension, size
    /// and offset fields describe the bytes that will be written. The sign
    /// of `biHeight` is kept.
    pub(crate) fn prepare_for_output(&mut self) -> Result<(), BinarizeError> {
        let (w, h) = (self.pixels.width(), self.pixels.height());
        let width = i32::try_from(w).map_err(|_| too_large(w, h))?;
        let height = i32::try_from(h).map_err(|_| too_large(w, h))?;
        let image_size =
            u32::try_from(self.pixels.as_bytes().len()).map_err(|_| too_large(w, h))?;
        let file_size = image_size
            .checked_add(PIXEL_DATA_OFFSET as u32)
            .ok_or_else(|| too_large(w, h))?;

        if self.info_header.width != width || self.info_header.height.unsigned_abs() != h as u32 {
            log::debug!(
                "bmp8: header says {}x{}, pixels are {w}x{h}; rewriting",
                self.info_header.width,
                self.info_header.height
            );
        }
        self.info_header.width = width;
        self.info_header.height = if self.info_header.height < 0 {
            -height
        } else {
            height
        };

        self.palette = Palette::grayscale();
        self.file_header.file_size = file_size;
        self.file_header.pixel_offset = PIXEL_DATA_OFFSET as u32;
        self.info_header.image_size = image_size;
        self.info_header.colors_used = PALETTE_ENTRIES as u32;
        Ok(())
    }
}
