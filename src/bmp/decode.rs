//! 8-bit indexed BMP decoder.
//!
//! Reads the headers as fixed little-endian records, then the palette and
//! the padded rows that follow it. `bfOffBits` is recorded but not used to
//! seek: the palette is always the 1024 bytes right after the info header
//! and the rows follow the palette directly.

use enough::Stop;

use super::{
    Bmp8, FILE_HEADER_LEN, FileHeader, INFO_HEADER_LEN, InfoHeader, PALETTE_ENTRIES,
    PIXEL_DATA_OFFSET, Palette, PaletteEntry, PixelBuffer, row_stride, too_large,
};
use crate::error::BinarizeError;
use crate::limits::Limits;

// ── Cursor for reading from &[u8] ───────────────────────────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Take the next `n` bytes, or `None` without advancing if fewer remain.
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_fixed_bytes<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Some(buf)
    }
}

/// Little-endian field reader over one fixed-size header record.
struct Fields<const N: usize> {
    raw: [u8; N],
    pos: usize,
}

impl<const N: usize> Fields<N> {
    fn new(raw: [u8; N]) -> Self {
        Self { raw, pos: 0 }
    }

    fn bytes<const M: usize>(&mut self) -> [u8; M] {
        let mut out = [0u8; M];
        out.copy_from_slice(&self.raw[self.pos..self.pos + M]);
        self.pos += M;
        out
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.bytes())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.bytes())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.bytes())
    }
}

// ── Headers ─────────────────────────────────────────────────────────

fn parse_file_header(raw: [u8; FILE_HEADER_LEN]) -> FileHeader {
    let mut f = Fields::new(raw);
    FileHeader {
        magic: f.bytes(),
        file_size: f.u32(),
        reserved1: f.u16(),
        reserved2: f.u16(),
        pixel_offset: f.u32(),
    }
}

fn parse_info_header(raw: [u8; INFO_HEADER_LEN]) -> InfoHeader {
    let mut f = Fields::new(raw);
    InfoHeader {
        header_size: f.u32(),
        width: f.i32(),
        height: f.i32(),
        planes: f.u16(),
        bit_count: f.u16(),
        compression: f.u32(),
        image_size: f.u32(),
        x_pels_per_meter: f.i32(),
        y_pels_per_meter: f.i32(),
        colors_used: f.u32(),
        colors_important: f.u32(),
    }
}

/// Dimensions in pixels: `(width, |height|)`.
fn validate_headers(
    file: &FileHeader,
    info: &InfoHeader,
) -> Result<(usize, usize), BinarizeError> {
    if &file.magic != b"BM" {
        return Err(BinarizeError::UnrecognizedFormat);
    }
    if info.header_size as usize != INFO_HEADER_LEN {
        return Err(BinarizeError::UnsupportedVariant(alloc::format!(
            "info header size {} (only the 40-byte BITMAPINFOHEADER is supported)",
            info.header_size
        )));
    }
    if info.bit_count != 8 {
        return Err(BinarizeError::UnsupportedVariant(alloc::format!(
            "{} bits per pixel (only 8-bit indexed grayscale is supported)",
            info.bit_count
        )));
    }
    if info.compression != 0 {
        return Err(BinarizeError::UnsupportedVariant(alloc::format!(
            "compression scheme {} (only uncompressed rows are supported)",
            info.compression
        )));
    }
    if info.width <= 0 {
        return Err(BinarizeError::InvalidHeader(alloc::format!(
            "BMP width is {}",
            info.width
        )));
    }
    if info.height == 0 {
        return Err(BinarizeError::InvalidHeader("BMP height is zero".into()));
    }
    Ok((info.width as usize, info.height.unsigned_abs() as usize))
}

/// Parse and validate both headers without touching the palette or rows.
pub(crate) fn parse_headers(data: &[u8]) -> Result<(FileHeader, InfoHeader), BinarizeError> {
    let mut cursor = Cursor::new(data);
    let (file, info) = read_headers(&mut cursor)?;
    validate_headers(&file, &info)?;
    Ok((file, info))
}

fn read_headers(cursor: &mut Cursor<'_>) -> Result<(FileHeader, InfoHeader), BinarizeError> {
    let file = cursor
        .read_fixed_bytes()
        .map(parse_file_header)
        .ok_or(BinarizeError::TruncatedHeader("file"))?;
    let info = cursor
        .read_fixed_bytes()
        .map(parse_info_header)
        .ok_or(BinarizeError::TruncatedHeader("info"))?;
    Ok((file, info))
}

fn read_palette(cursor: &mut Cursor<'_>) -> Result<Palette, BinarizeError> {
    let raw = cursor
        .take(PALETTE_ENTRIES * 4)
        .ok_or_else(|| BinarizeError::TruncatedPalette {
            needed: PALETTE_ENTRIES,
            actual: cursor.remaining() / 4,
        })?;
    let mut entries = [PaletteEntry::default(); PALETTE_ENTRIES];
    for (entry, quad) in entries.iter_mut().zip(raw.chunks_exact(4)) {
        *entry = PaletteEntry {
            blue: quad[0],
            green: quad[1],
            red: quad[2],
            reserved: quad[3],
        };
    }
    Ok(Palette::new(entries))
}

// ── Full decode ─────────────────────────────────────────────────────

pub(crate) fn decode_bmp8(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<Bmp8, BinarizeError> {
    let mut cursor = Cursor::new(data);
    let (file_header, info_header) = read_headers(&mut cursor)?;
    let (width, height) = validate_headers(&file_header, &info_header)?;

    let stride = row_stride(width).ok_or_else(|| too_large(width, height))?;
    let buffer_len = stride
        .checked_mul(height)
        .ok_or_else(|| too_large(width, height))?;
    if let Some(limits) = limits {
        limits.check(width as u32, height as u32, buffer_len)?;
    }

    let palette = read_palette(&mut cursor)?;
    if file_header.pixel_offset as usize != PIXEL_DATA_OFFSET {
        log::warn!(
            "bmp8: bfOffBits is {}, reading rows at {} instead",
            file_header.pixel_offset,
            PIXEL_DATA_OFFSET
        );
    }
    log::debug!(
        "bmp8: {width}x{height}, stride {stride}, {}",
        if info_header.is_bottom_up() { "bottom-up" } else { "top-down" }
    );

    // Refuse before allocating when the rows obviously cannot be there.
    if cursor.remaining() < buffer_len {
        return Err(BinarizeError::TruncatedPixelData {
            row: cursor.remaining() / stride,
        });
    }

    stop.check()?;
    let mut pixels = PixelBuffer::new(width, height)?;
    for (row, dst) in pixels.as_bytes_mut().chunks_exact_mut(stride).enumerate() {
        if row % 16 == 0 {
            stop.check()?;
        }
        let src = cursor
            .take(stride)
            .ok_or(BinarizeError::TruncatedPixelData { row })?;
        dst.copy_from_slice(src);
    }

    if cursor.remaining() > 0 {
        log::debug!("bmp8: ignoring {} trailing bytes", cursor.remaining());
    }

    Ok(Bmp8 {
        file_header,
        info_header,
        palette,
        pixels,
    })
}
