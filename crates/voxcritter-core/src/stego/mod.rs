//! LSB steganography over RGBA pixel buffers.
//!
//! Hidden text is stored one bit per carrier byte, in the least-significant
//! bit, eight bits per character with the most-significant bit first. The
//! voxel-painter walk visits the R, G and B bytes of each pixel and skips
//! alpha. Extraction is pure: a carrier whose text does not start with the
//! `voxel-painter:` marker yields `Ok(None)` so callers can skip it.
//!
//! Byte positions and constants live in `layout`, bit access in `reader`.

pub mod embed;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use embed::{embed_payload, embed_text};
pub use error::StegoError;
pub use layout::rgb_channel_index;
pub use parser::{StopRule, extract_payload, extract_rgb_payload, extract_text, strip_magic};
pub use reader::{LsbReader, char_capacity};
