use std::fmt;

use thiserror::Error;

/// Cursor component a geometry delta applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    X,
    Y,
    Z,
    Color,
}

impl Component {
    pub const ALL: [Component; 4] = [Component::X, Component::Y, Component::Z, Component::Color];
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::X => "x",
            Component::Y => "y",
            Component::Z => "z",
            Component::Color => "color",
        };
        f.write_str(name)
    }
}

/// Errors returned by voxel payload decoding and encoding.
///
/// A failed decode returns no partial geometry or palette.
///
/// # Examples
/// ```
/// use voxcritter_core::CodecError;
///
/// let err = CodecError::MalformedAlphabet { symbol: '!', position: 3 };
/// assert!(err.to_string().contains("invalid geometry symbol"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid geometry symbol {symbol:?} at position {position}")]
    MalformedAlphabet { symbol: char, position: usize },
    #[error("geometry truncated: missing {component} delta at position {position}")]
    TruncatedSequence { position: usize, component: Component },
    #[error("payload has no geometry chunk")]
    MissingGeometry,
    #[error("invalid palette length: {length} is not a multiple of 6")]
    PaletteLength { length: usize },
    #[error("invalid palette entry {entry}: {value:?}")]
    MalformedPalette { entry: usize, value: String },
    #[error("negative color index {index} at position {position}")]
    NegativeColorIndex { index: i32, position: usize },
    #[error("{component} coordinate overflows at position {position}")]
    CoordinateOverflow { component: Component, position: usize },
    #[error("{component} delta {delta} out of range -32..=31")]
    DeltaOutOfRange { component: Component, delta: i64 },
}
