use thiserror::Error;

/// Errors returned by header parsing, filtering and stream processing.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The bytes are not a valid RIFF/WAVE structure.
    #[error("invalid wave header: {0}")]
    HeaderFormat(String),

    /// The header is valid but describes something this crate does not handle.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A filter or controller was used outside its supported range.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure category reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    HeaderFormat,
    UnsupportedFormat,
    Io,
}

impl AudioError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AudioError::HeaderFormat(_) => ErrorKind::HeaderFormat,
            AudioError::UnsupportedFormat(_) | AudioError::UnsupportedOperation(_) => {
                ErrorKind::UnsupportedFormat
            }
            AudioError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, AudioError>;
