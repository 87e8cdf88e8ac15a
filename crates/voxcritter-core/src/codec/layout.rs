pub const CHUNK_SEPARATOR: char = ':';
/// Chunk values start after the tag and one delimiter char.
pub const VALUE_OFFSET: usize = 2;
/// Delimiter the encoder writes between tag and value.
pub const VALUE_DELIMITER: char = '=';

pub const TAG_COLORS: char = 'C';
pub const TAG_GEOMETRY: char = 'A';

pub const HEX_DIGITS_PER_COLOR: usize = 6;

/// Geometry symbols, in code order (`A` = 0 .. `/` = 63).
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Delta values are stored biased: `code - 32`.
pub const DELTA_BIAS: i32 = 32;
pub const MIN_DELTA: i32 = -DELTA_BIAS;
pub const MAX_DELTA: i32 = ALPHABET.len() as i32 - 1 - DELTA_BIAS;

/// Cursor components: x, y, z, color.
pub const COMPONENTS: usize = 4;

/// Codes as the encoder writes them: emit in the top bit of six, then the
/// x, y, z and color delta flags, low bit unused.
pub const EMIT_CODE: u8 = 0b10_0000;
pub const DELTA_FLAG_CODES: [u8; COMPONENTS] = [0b01_0000, 0b00_1000, 0b00_0100, 0b00_0010];

pub fn symbol_value(symbol: char) -> Option<u8> {
    let byte = u8::try_from(u32::from(symbol)).ok()?;
    ALPHABET
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|index| index as u8)
}
