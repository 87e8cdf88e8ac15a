/// Marker every voxel-painter payload starts with.
pub const MAGIC_PREFIX: &str = "voxel-painter:";
/// Character offset of the chunk text (prefix plus one delimiter char).
pub const PAYLOAD_OFFSET: usize = MAGIC_PREFIX.len() + 1;
/// Delimiter written between the prefix and the chunk text.
pub const PAYLOAD_DELIMITER: char = '#';

pub const BYTES_PER_PIXEL: usize = 4;
pub const CARRIER_CHANNELS: usize = 3;
pub const BITS_PER_CHAR: usize = 8;

pub const DEFAULT_TERMINATOR: u8 = 0x00;

/// Map a logical bit index onto the R, G and B bytes of an RGBA buffer.
///
/// Every fourth byte (alpha) is skipped: `0, 1, 2, 4, 5, 6, 8, ...`.
pub fn rgb_channel_index(logical: usize) -> usize {
    logical + logical / CARRIER_CHANNELS
}
