//! Local-mean binarization.
//!
//! Every output pixel is 255 when the integer mean of the square window
//! centered on it is strictly greater than the threshold, 0 otherwise. The
//! window is clipped at the image border: pixels outside the image are left
//! out of both the sum and the count rather than treated as zero.
//!
//! Window sums come from a summed-area table built from the untouched input
//! before the first pixel is overwritten, so neighbor reads never observe
//! binarized values. The mean is `sum / count` truncated toward zero.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::bmp::row_stride;
use crate::error::BinarizeError;

/// Threshold and window size for [`crate::binarize`].
///
/// Construction checks the values on their own; whether the window fits a
/// particular image is checked with [`ThresholdConfig::check_dimensions`],
/// which [`crate::binarize`] calls before touching any pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ThresholdConfig {
    threshold: u8,
    window_size: usize,
}

impl ThresholdConfig {
    /// `threshold` must lie in `0..=255`; `window_size` must be odd and
    /// positive.
    pub fn new(threshold: i64, window_size: i64) -> Result<Self, BinarizeError> {
        let threshold =
            u8::try_from(threshold).map_err(|_| BinarizeError::ThresholdOutOfRange(threshold))?;
        let invalid = |reason| BinarizeError::InvalidWindowSize {
            window: window_size,
            reason,
        };
        if window_size <= 0 {
            return Err(invalid("must be positive"));
        }
        if window_size % 2 == 0 {
            return Err(invalid("must be odd"));
        }
        let window_size = usize::try_from(window_size).map_err(|_| invalid("too large"))?;
        Ok(Self {
            threshold,
            window_size,
        })
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Pixels on each side of the center.
    pub fn half_window(&self) -> usize {
        self.window_size / 2
    }

    /// Reject windows larger than the image in either direction.
    pub fn check_dimensions(&self, width: usize, height: usize) -> Result<(), BinarizeError> {
        let invalid = |reason| BinarizeError::InvalidWindowSize {
            window: self.window_size as i64,
            reason,
        };
        if self.window_size > width {
            return Err(invalid("exceeds image width"));
        }
        if self.window_size > height {
            return Err(invalid("exceeds image height"));
        }
        Ok(())
    }
}

/// Rows handed to the thread pool between cancellation checks.
#[cfg(feature = "parallel")]
const BAND_ROWS: usize = 64;

/// Binarize a padded 8-bit buffer in place.
///
/// `buf` holds `height` rows of `row_stride(width)` bytes; anything beyond
/// that is left alone. Row padding is zeroed.
pub(crate) fn binarize_padded(
    buf: &mut [u8],
    width: usize,
    height: usize,
    config: &ThresholdConfig,
    stop: &dyn Stop,
) -> Result<(), BinarizeError> {
    if width == 0 || height == 0 {
        return Err(BinarizeError::EmptyImage);
    }
    config.check_dimensions(width, height)?;
    let too_large = || crate::bmp::too_large(width, height);
    let stride = row_stride(width).ok_or_else(too_large)?;
    let needed = stride.checked_mul(height).ok_or_else(too_large)?;
    if buf.len() < needed {
        return Err(BinarizeError::BufferTooSmall {
            needed,
            actual: buf.len(),
        });
    }
    let buf = &mut buf[..needed];

    log::debug!(
        "binarize: {width}x{height}, threshold {}, window {}",
        config.threshold,
        config.window_size
    );

    let table = SummedArea::build(buf, width, height, stride, stop)?;
    let rows = RowBinarizer {
        table: &table,
        width,
        height,
        half: config.half_window(),
        threshold: u64::from(config.threshold),
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        for (band, chunk) in buf.chunks_mut(stride * BAND_ROWS).enumerate() {
            stop.check()?;
            chunk
                .par_chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(i, row)| rows.apply(band * BAND_ROWS + i, row));
        }
    }

    #[cfg(not(feature = "parallel"))]
    for (y, row) in buf.chunks_exact_mut(stride).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        rows.apply(y, row);
    }

    Ok(())
}

/// Inclusive prefix sums over the logical pixels, with a zero first row and
/// column: `at(x, y)` is the sum of all pixels above and left of `(x, y)`.
struct SummedArea {
    sums: Vec<u64>,
    cols: usize,
}

impl SummedArea {
    fn build(
        buf: &[u8],
        width: usize,
        height: usize,
        stride: usize,
        stop: &dyn Stop,
    ) -> Result<Self, BinarizeError> {
        let cols = width + 1;
        let len = cols
            .checked_mul(height + 1)
            .ok_or_else(|| crate::bmp::too_large(width, height))?;
        let mut sums = vec![0u64; len];
        for (y, row) in buf.chunks_exact(stride).enumerate() {
            if y % 16 == 0 {
                stop.check()?;
            }
            let (above, below) = sums.split_at_mut((y + 1) * cols);
            let above = &above[y * cols..];
            let current = &mut below[..cols];
            let mut running = 0u64;
            for (x, &v) in row[..width].iter().enumerate() {
                running += u64::from(v);
                current[x + 1] = above[x + 1] + running;
            }
        }
        Ok(Self { sums, cols })
    }

    fn at(&self, x: usize, y: usize) -> u64 {
        self.sums[y * self.cols + x]
    }

    /// Sum over `x0..x1` × `y0..y1`.
    fn rect(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        self.at(x1, y1) + self.at(x0, y0) - self.at(x0, y1) - self.at(x1, y0)
    }
}

struct RowBinarizer<'a> {
    table: &'a SummedArea,
    width: usize,
    height: usize,
    half: usize,
    threshold: u64,
}

impl RowBinarizer<'_> {
    /// Write binarized row `y` into `row` (one full stride).
    fn apply(&self, y: usize, row: &mut [u8]) {
        let y0 = y.saturating_sub(self.half);
        let y1 = (y + self.half + 1).min(self.height);
        let rows = (y1 - y0) as u64;

        let (pixels, padding) = row.split_at_mut(self.width);
        for (x, out) in pixels.iter_mut().enumerate() {
            let x0 = x.saturating_sub(self.half);
            let x1 = (x + self.half + 1).min(self.width);
            let count = (x1 - x0) as u64 * rows;
            let mean = self.table.rect(x0, y0, x1, y1) / count;
            *out = if mean > self.threshold { 255 } else { 0 };
        }
        padding.fill(0);
    }
}
