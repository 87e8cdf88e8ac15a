//! Voxel-painter chunk codec.
//!
//! A payload is a list of `:`-separated chunks, each a one-character tag, one
//! delimiter character and a value. `C` carries the palette as packed
//! `RRGGBB` hex, `A` the geometry as base64-alphabet codes: a flag code
//! followed by biased deltas (`value - 32`) for the x, y, z and color cursor
//! components it flags. Codes with the emit flag place a voxel at the cursor.
//!
//! Decoding is strict: unknown symbols, truncated delta runs and malformed
//! palettes are errors, never coerced values. Constants live in `layout`,
//! chunk and symbol access in `reader`.

pub mod encoder;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use encoder::{encode, encode_payload};
pub use error::{CodecError, Component};
pub use parser::{DecodeOptions, GeometryPolicy, decode, decode_geometry, decode_with};
pub use reader::{ChunkMap, CodeFlags};
