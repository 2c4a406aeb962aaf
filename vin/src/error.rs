//! Error types for VIN validation and decoding.

use thiserror::Error;
use vpic::SnapshotError;

/// Errors raised while validating or decoding a VIN.
///
/// Validation errors carry enough context to be self-describing. Decoding
/// shortfalls (an unknown make, model or year) are not errors; the affected
/// field of the decoded record stays empty instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VinError {
    /// Input is not exactly 17 characters long.
    #[error("VIN must be 17 characters long, got {0}")]
    InvalidLength(usize),

    /// A character outside `0-9A-HJ-NPR-Z` (position is 1-based).
    #[error("invalid character {character:?} at VIN position {position}")]
    InvalidCharacter { position: usize, character: char },

    /// The character at position 9 does not match the weighted check digit.
    #[error("invalid check digit: expected {expected:?}, got {got:?}")]
    InvalidCheckDigit { expected: char, got: char },

    /// The bundled vPIC snapshot could not be loaded.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
