use alloc::string::String;
use enough::StopReason;

/// Errors from identifying and decoding raster images.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RasterError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("corrupt pixel data: {0}")]
    CorruptData(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl RasterError {
    /// Whether the error means the input bytes are damaged or inconsistent,
    /// as opposed to unsupported, rejected by limits, or cancelled.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::CorruptData(_)
                | Self::InvalidHeader(_)
                | Self::UnexpectedEof
                | Self::DimensionsTooLarge { .. }
        )
    }

    /// Whether the input was recognized but uses a variant this crate cannot decode.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnrecognizedFormat | Self::UnsupportedVariant(_))
    }
}

impl From<StopReason> for RasterError {
    fn from(r: StopReason) -> Self {
        RasterError::Cancelled(r)
    }
}
