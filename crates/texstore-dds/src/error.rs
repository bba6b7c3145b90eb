//! Error types for DDS handling.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::dxgi::DxgiFormat;
use crate::format::Support;
use crate::header::FourCC;

/// Coarse classification of every [`Error`].
///
/// Callers that only need to know *why* an asset could not be loaded can
/// match on this instead of the detailed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The origin could not be opened or read at all.
    ResourceNotFound,
    /// Fewer bytes were available than the header or payload requires.
    TruncatedInput,
    /// Header fields are present but internally inconsistent.
    Format,
    /// The header is valid but names a format or layout we cannot decode.
    UnsupportedFormat,
    /// Zero or otherwise unusable base dimensions.
    InvalidDimensions,
}

/// Which part of the file a truncated read was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Magic, primary header or DX10 extension.
    Header,
    /// Mip level data.
    Payload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Header => f.write_str("header"),
            Stage::Payload => f.write_str("payload"),
        }
    }
}

/// Errors that can occur when loading DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be opened or mapped.
    #[error("cannot open {}: {source}", .path.display())]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// Input ended early.
    #[error("truncated {stage}: needed {needed} bytes but only {available} available")]
    Truncated {
        stage: Stage,
        needed: usize,
        available: usize,
    },

    /// Invalid DDS magic.
    #[error("invalid DDS magic: expected 'DDS ', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Header size field is not 124.
    #[error("invalid DDS header size: expected 124, got {0}")]
    InvalidHeaderSize(u32),

    /// Pixel format size field is not 32.
    #[error("invalid DDS pixel format size: expected 32, got {0}")]
    InvalidPixelFormatSize(u32),

    /// Bit-mask pixel format that does not describe a real layout.
    #[error("inconsistent pixel format masks: {0}")]
    InconsistentMasks(String),

    /// Any other header field that contradicts the rest of the header.
    #[error("invalid header field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// DXGI format value outside the known enumeration.
    #[error("unknown DXGI format {0}")]
    UnknownDxgiFormat(u32),

    /// Known DXGI format whose layout is not linear.
    #[error("unsupported DXGI format {format:?} ({support:?})")]
    UnsupportedDxgiFormat { format: DxgiFormat, support: Support },

    /// FourCC that does not map to any known format.
    #[error("unknown FourCC {0}")]
    UnknownFourCC(FourCC),

    /// Combination of layers, faces and depth that cannot be represented.
    #[error("unsupported texture shape: {0}")]
    UnsupportedShape(String),

    /// Zero, overflowing or over-limit dimensions.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ResourceNotFound { .. } | Error::Io(_) => ErrorKind::ResourceNotFound,
            Error::Truncated { .. } => ErrorKind::TruncatedInput,
            Error::InvalidMagic(_)
            | Error::InvalidHeaderSize(_)
            | Error::InvalidPixelFormatSize(_)
            | Error::InconsistentMasks(_)
            | Error::InvalidField { .. } => ErrorKind::Format,
            Error::UnknownDxgiFormat(_)
            | Error::UnsupportedDxgiFormat { .. }
            | Error::UnknownFourCC(_)
            | Error::UnsupportedShape(_) => ErrorKind::UnsupportedFormat,
            Error::InvalidDimensions(_) => ErrorKind::InvalidDimensions,
        }
    }

    /// Convert a byte source failure that happened while reading `stage`.
    pub(crate) fn from_source(stage: Stage, err: texstore_common::Error) -> Self {
        match err {
            texstore_common::Error::UnexpectedEof { needed, available } => Error::Truncated {
                stage,
                needed,
                available,
            },
            texstore_common::Error::Io(e) => Error::Io(e),
        }
    }

    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_eof_maps_to_truncated() {
        let err = Error::from_source(
            Stage::Payload,
            texstore_common::Error::UnexpectedEof {
                needed: 16,
                available: 6,
            },
        );

        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(
            err.to_string(),
            "truncated payload: needed 16 bytes but only 6 available"
        );
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::InvalidHeaderSize(0).kind(), ErrorKind::Format);
        assert_eq!(
            Error::UnknownFourCC(FourCC(*b"ABCD")).kind(),
            ErrorKind::UnsupportedFormat
        );
        assert_eq!(
            Error::InvalidDimensions("width is 0".into()).kind(),
            ErrorKind::InvalidDimensions
        );
    }
}
