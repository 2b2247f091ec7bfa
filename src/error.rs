use alloc::string::String;
use enough::StopReason;

/// Errors from BMP decoding/encoding, binarization and the file pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BinarizeError {
    #[cfg(feature = "std")]
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("truncated {0} header")]
    TruncatedHeader(&'static str),

    #[error("truncated palette: need {needed} entries, got {actual}")]
    TruncatedPalette { needed: usize, actual: usize },

    #[error("truncated pixel data at row {row}")]
    TruncatedPixelData { row: usize },

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("image has zero width or height")]
    EmptyImage,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("threshold {0} is outside 0..=255")]
    ThresholdOutOfRange(i64),

    #[error("invalid window size {window}: {reason}")]
    InvalidWindowSize { window: i64, reason: &'static str },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

/// Coarse classification of [`BinarizeError`], for callers that map
/// failures onto exit codes or messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A file or stream could not be opened, read or written, or the pixel
    /// rows ended early.
    Io,
    /// Headers or palette unreadable, or an unsupported bitmap variant.
    Format,
    /// Threshold or window size rejected.
    Validation,
    /// A [`enough::Stop`] token asked the operation to stop.
    Cancelled,
}

impl BinarizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            #[cfg(feature = "std")]
            Self::Io { .. } => ErrorKind::Io,
            Self::TruncatedPixelData { .. } => ErrorKind::Io,
            Self::ThresholdOutOfRange(_) | Self::InvalidWindowSize { .. } => ErrorKind::Validation,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::UnrecognizedFormat
            | Self::InvalidHeader(_)
            | Self::TruncatedHeader(_)
            | Self::TruncatedPalette { .. }
            | Self::UnsupportedVariant(_)
            | Self::EmptyImage
            | Self::DimensionsTooLarge { .. }
            | Self::LimitExceeded(_)
            | Self::BufferTooSmall { .. } => ErrorKind::Format,
        }
    }
}

impl From<StopReason> for BinarizeError {
    fn from(r: StopReason) -> Self {
        BinarizeError::Cancelled(r)
    }
}
