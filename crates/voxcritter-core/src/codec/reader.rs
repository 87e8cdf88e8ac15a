use std::collections::HashMap;

use super::error::{CodecError, Component};
use super::layout;
use crate::model::Rgb;

/// Payload chunks keyed by their one-character tag.
///
/// A later chunk with the same tag replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMap {
    chunks: HashMap<char, String>,
}

impl ChunkMap {
    /// Split `payload` on `:` into tag/value chunks. Empty chunks are skipped.
    pub fn parse(payload: &str) -> Self {
        let mut chunks = HashMap::new();
        for chunk in payload.split(layout::CHUNK_SEPARATOR) {
            let mut chars = chunk.chars();
            let Some(tag) = chars.next() else {
                continue;
            };
            let value: String = chunk.chars().skip(layout::VALUE_OFFSET).collect();
            chunks.insert(tag, value);
        }
        Self { chunks }
    }

    /// Value for `tag`; an empty value counts as absent.
    pub fn get(&self, tag: char) -> Option<&str> {
        self.chunks
            .get(&tag)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Decode a packed `RRGGBB...` palette value.
pub fn read_palette(value: &str) -> Result<Vec<Rgb>, CodecError> {
    let digits: Vec<char> = value.chars().collect();
    if digits.len() % layout::HEX_DIGITS_PER_COLOR != 0 {
        return Err(CodecError::PaletteLength {
            length: digits.len(),
        });
    }
    digits
        .chunks(layout::HEX_DIGITS_PER_COLOR)
        .enumerate()
        .map(|(entry, hex)| read_hex_color(entry, hex))
        .collect()
}

fn read_hex_color(entry: usize, hex: &[char]) -> Result<Rgb, CodecError> {
    let malformed = || CodecError::MalformedPalette {
        entry,
        value: hex.iter().collect(),
    };
    let mut bytes = [0u8; 3];
    for (byte, pair) in bytes.iter_mut().zip(hex.chunks(2)) {
        let high = pair[0].to_digit(16).ok_or_else(malformed)?;
        let low = pair[1].to_digit(16).ok_or_else(malformed)?;
        *byte = (high * 16 + low) as u8;
    }
    Ok(Rgb::from_bytes(bytes[0], bytes[1], bytes[2]))
}

/// Flags carried by one geometry code.
///
/// The code's binary digits are read from its leading `1` downwards: the
/// first digit is the emit flag, the next four are the x, y, z and color
/// delta flags. For six-bit codes this gives emit = 32, x = 16, y = 8,
/// z = 4, color = 2 with the low bit unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeFlags {
    pub emit: bool,
    pub deltas: [bool; layout::COMPONENTS],
}

impl CodeFlags {
    pub fn from_code(code: u8) -> Self {
        let width = (u8::BITS - code.leading_zeros()) as usize;
        let digit = |index: usize| index < width && (code >> (width - 1 - index)) & 1 == 1;
        Self {
            emit: digit(0),
            deltas: [digit(1), digit(2), digit(3), digit(4)],
        }
    }
}

/// Cursor over the decoded geometry codes.
pub struct SymbolReader {
    codes: Vec<u8>,
    position: usize,
}

impl SymbolReader {
    /// Map every symbol of `value` through the geometry alphabet.
    pub fn new(value: &str) -> Result<Self, CodecError> {
        let codes = value
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                layout::symbol_value(symbol)
                    .ok_or(CodecError::MalformedAlphabet { symbol, position })
            })
            .collect::<Result<Vec<u8>, CodecError>>()?;
        Ok(Self { codes, position: 0 })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn next_code(&mut self) -> Option<u8> {
        let code = self.codes.get(self.position).copied()?;
        self.position += 1;
        Some(code)
    }

    /// Read the unbiased delta for `component`.
    pub fn read_delta(&mut self, component: Component) -> Result<i32, CodecError> {
        let position = self.position;
        let code = self
            .next_code()
            .ok_or(CodecError::TruncatedSequence {
                position,
                component,
            })?;
        Ok(i32::from(code) - layout::DELTA_BIAS)
    }
}
