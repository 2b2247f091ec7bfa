use crate::error::BinarizeError;

/// Resource limits applied while decoding, before the pixel buffer is
/// allocated.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height), padding excluded.
    pub max_pixels: Option<u64>,
    /// Maximum bytes for the padded pixel buffer. Binarization allocates a
    /// summed-area table of roughly eight times this on top.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Check logical dimensions and the padded buffer size.
    pub(crate) fn check(
        &self,
        width: u32,
        height: u32,
        buffer_bytes: usize,
    ) -> Result<(), BinarizeError> {
        let exceeded = |what: &str, value: u64, limit: Option<u64>| match limit {
            Some(max) if value > max => Err(BinarizeError::LimitExceeded(alloc::format!(
                "{what} {value} exceeds limit {max}"
            ))),
            _ => Ok(()),
        };
        exceeded("width", u64::from(width), self.max_width)?;
        exceeded("height", u64::from(height), self.max_height)?;
        exceeded(
            "pixel count",
            u64::from(width) * u64::from(height),
            self.max_pixels,
        )?;
        exceeded("buffer bytes", buffer_bytes as u64, self.max_memory_bytes)
    }
}
