//! # zenmono
//!
//! Local-mean binarization of 8-bit indexed grayscale BMP images.
//!
//! The pipeline is `decode → binarize → encode`:
//!
//! - [`decode_bmp8`] reads the file header, the 40-byte info header, the
//!   256-entry palette and the 4-byte-aligned rows into a [`Bmp8`].
//! - [`binarize`] replaces every pixel with 255 or 0 depending on whether the
//!   truncated mean of the `window × window` neighborhood around it (clipped
//!   at the image edges) is strictly above the threshold. Row padding is
//!   zeroed.
//! - [`encode_bmp8`] writes the image back with a grayscale palette
//!   (`entry[i] = (i, i, i, 0)`), so index 255 displays white and 0 black
//!   whatever palette the input carried.
//!
//! Rows are never flipped: a bottom-up input stays bottom-up.
//!
//! ## Non-Goals
//!
//! - Bit depths other than 8, color images, RLE
//! - Other thresholding rules (Otsu, Sauvola, ...)
//! - Streaming decode
//!
//! ## Usage
//!
//! ```no_run
//! use zenmono::{ThresholdConfig, Unstoppable};
//!
//! let data: &[u8] = &[]; // your 8-bit BMP bytes
//!
//! let mut image = zenmono::decode_bmp8(data, Unstoppable)?;
//! let config = ThresholdConfig::new(128, 15)?;
//! zenmono::binarize(&mut image.pixels, &config, Unstoppable)?;
//! let encoded = zenmono::encode_bmp8(&mut image, Unstoppable)?;
//! # Ok::<(), zenmono::BinarizeError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod binarize;
mod bmp;
mod error;
mod limits;

#[cfg(feature = "std")]
mod pipeline;
#[cfg(feature = "std")]
pub mod timing;

use alloc::vec::Vec;

// Re-exports
pub use binarize::ThresholdConfig;
pub use bmp::{
    Bmp8, FILE_HEADER_LEN, FileHeader, INFO_HEADER_LEN, InfoHeader, PALETTE_ENTRIES,
    PIXEL_DATA_OFFSET, Palette, PaletteEntry, PixelBuffer, row_stride,
};
pub use enough::{Stop, Unstoppable};
pub use error::{BinarizeError, ErrorKind};
pub use limits::Limits;
#[cfg(feature = "std")]
pub use pipeline::{RunSummary, binarize_file};

/// Decode an 8-bit indexed BMP.
pub fn decode_bmp8(data: &[u8], stop: impl Stop) -> Result<Bmp8, BinarizeError> {
    bmp::decode::decode_bmp8(data, None, &stop)
}

/// Decode an 8-bit indexed BMP, rejecting images over `limits` before the
/// pixel buffer is allocated.
pub fn decode_bmp8_with_limits(
    data: &[u8],
    limits: &Limits,
    stop: impl Stop,
) -> Result<Bmp8, BinarizeError> {
    bmp::decode::decode_bmp8(data, Some(limits), &stop)
}

/// Parse and validate the two headers only.
///
/// Fails exactly where [`decode_bmp8`] would fail on the headers, without
/// reading the palette or pixel rows.
pub fn read_bmp8_headers(data: &[u8]) -> Result<(FileHeader, InfoHeader), BinarizeError> {
    bmp::decode::parse_headers(data)
}

/// Encode `image` as an 8-bit BMP.
///
/// The palette is replaced with the grayscale ramp, and `bfSize`,
/// `bfOffBits`, `biSizeImage` and `biClrUsed` are rewritten to describe the
/// output. Other header fields are written as they are.
pub fn encode_bmp8(image: &mut Bmp8, stop: impl Stop) -> Result<Vec<u8>, BinarizeError> {
    bmp::encode::encode_bmp8(image, &stop)
}

/// Binarize `pixels` in place with the local-mean rule.
pub fn binarize(
    pixels: &mut PixelBuffer,
    config: &ThresholdConfig,
    stop: impl Stop,
) -> Result<(), BinarizeError> {
    let (width, height) = (pixels.width(), pixels.height());
    binarize::binarize_padded(pixels.as_bytes_mut(), width, height, config, &stop)
}

/// Binarize a raw padded buffer in place.
///
/// `buf` must hold at least `row_stride(width) * height` bytes laid out as
/// rows of `row_stride(width)`; bytes past that are left untouched.
pub fn binarize_padded(
    buf: &mut [u8],
    width: usize,
    height: usize,
    config: &ThresholdConfig,
    stop: impl Stop,
) -> Result<(), BinarizeError> {
    binarize::binarize_padded(buf, width, height, config, &stop)
}

/// Decode, binarize and re-encode an in-memory BMP.
///
/// The window is checked against the image size right after the headers
/// are parsed, before the palette and rows are read.
pub fn binarize_bmp8_bytes(
    data: &[u8],
    config: &ThresholdConfig,
    stop: impl Stop,
) -> Result<Vec<u8>, BinarizeError> {
    binarize_encoded(data, config, &stop).map(|(_, encoded)| encoded)
}

/// Shared body of [`binarize_bmp8_bytes`] and [`binarize_file`]; also
/// returns the decoded image (with its output headers).
pub(crate) fn binarize_encoded(
    data: &[u8],
    config: &ThresholdConfig,
    stop: &dyn Stop,
) -> Result<(Bmp8, Vec<u8>), BinarizeError> {
    let (_, info) = bmp::decode::parse_headers(data)?;
    config.check_dimensions(info.width as usize, info.height.unsigned_abs() as usize)?;

    let mut image = bmp::decode::decode_bmp8(data, None, stop)?;
    let (width, height) = (image.width(), image.height());
    binarize::binarize_padded(image.pixels.as_bytes_mut(), width, height, config, stop)?;
    let encoded = bmp::encode::encode_bmp8(&mut image, stop)?;
    Ok((image, encoded))
}
