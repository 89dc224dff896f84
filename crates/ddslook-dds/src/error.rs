//! Error types for DDS decoding.

use thiserror::Error;

/// Errors that can occur when parsing or decoding DDS files.
///
/// None of these are retryable: the same bytes always fail the same way.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] ddslook_common::Error),

    /// Buffer is smaller than the headers it must contain.
    #[error("DDS data too short: needed {needed} bytes, got {available}")]
    TooShort { needed: usize, available: usize },

    /// Invalid DDS magic.
    #[error("invalid DDS magic: expected 'DDS ', got {0:?}")]
    BadMagic([u8; 4]),

    /// Header is well formed but names a codec we cannot decode.
    #[error("unsupported DDS format: {0}")]
    UnsupportedFormat(String),

    /// Mip/face byte ranges fall outside the file, or dimensions are zero.
    #[error("corrupt DDS layout: {0}")]
    CorruptLayout(String),

    /// Internal fault while expanding blocks or pixels.
    #[error("DDS decode error: {0}")]
    Decode(String),

    /// The caller withdrew the request while decoding.
    #[error("decode canceled")]
    Canceled,
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
