//! Error types for QR symbol encoding.

use thiserror::Error;

use crate::segment::QrSegmentMode;
use crate::spec::QrCodeEcc;

/// Errors returned to callers when an encode request cannot be satisfied.
///
/// Every variant describes a problem with the caller's input. Internal table
/// defects (a template whose free modules disagree with the capacity tables)
/// are not represented here; they abort the encode with a panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    /// Version number outside 1..=40.
    #[error("Version {0} is out of range (expected 1..=40, or 0 for automatic)")]
    InvalidVersion(u8),

    /// Automatic version selection found no version large enough.
    #[error("No version in 1..=40 can hold {bits} data bits at level {level:?}")]
    VersionNotFound { bits: usize, level: QrCodeEcc },

    /// Error correction level outside L/M/Q/H.
    #[error("Invalid error correction level: {0:?}")]
    InvalidLevel(String),

    /// Mask id outside 0..=7.
    #[error("Mask {0} is out of range (expected 0..=7)")]
    InvalidMask(u8),

    /// Packed payload does not fit the chosen version and level.
    #[error("Data length = {bits} bits, Max capacity = {capacity} bits")]
    CapacityExceeded { bits: usize, capacity: usize },

    /// Segment content cannot be represented in the requested mode.
    #[error("Cannot encode in {mode:?} mode: {reason}")]
    UnsupportedMode { mode: QrSegmentMode, reason: String },

    /// A stored module matrix could not be parsed back into a symbol.
    #[error("Malformed module matrix: {0}")]
    MalformedMatrix(String),
}

pub type Result<T> = std::result::Result<T, QrError>;
