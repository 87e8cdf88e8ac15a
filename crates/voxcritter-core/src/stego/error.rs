use thiserror::Error;

/// Errors returned by LSB extraction and embedding.
///
/// A carrier without the voxel-painter prefix is not an error; extraction
/// reports it as `Ok(None)`.
///
/// # Examples
/// ```
/// use voxcritter_core::StegoError;
///
/// let err = StegoError::CapacityExceeded { needed: 40, available: 12 };
/// assert!(err.to_string().contains("carrier capacity exceeded"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StegoError {
    #[error("carrier too short: need {needed} characters, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("carrier capacity exceeded: need {needed} characters, room for {available}")]
    CapacityExceeded { needed: usize, available: usize },
    #[error("character {ch:?} at position {position} does not fit in one byte")]
    NonLatin1 { ch: char, position: usize },
}
