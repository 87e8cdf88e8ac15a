use super::layout;

/// Sequential reader over the least-significant bits of a pixel buffer.
///
/// Logical bit `n` lives in byte `index_map(n)`. Reading stops as soon as the
/// mapped byte falls outside the buffer, or after `pixels.len()` bits: the
/// map is expected to be strictly increasing, so no carrier byte holds more
/// than one bit.
pub struct LsbReader<'a, F> {
    pixels: &'a [u8],
    index_map: F,
    cursor: usize,
}

impl<'a, F> LsbReader<'a, F>
where
    F: Fn(usize) -> usize,
{
    pub fn new(pixels: &'a [u8], index_map: F) -> Self {
        Self {
            pixels,
            index_map,
            cursor: 0,
        }
    }

    pub fn read_bit(&mut self) -> Option<u8> {
        if self.cursor >= self.pixels.len() {
            return None;
        }
        let byte = self.pixels.get((self.index_map)(self.cursor))?;
        self.cursor += 1;
        Some(byte & 1)
    }

    /// Read one character worth of bits, most-significant bit first.
    ///
    /// Returns `None` when the carrier runs out before a full byte.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut value = 0u8;
        for _ in 0..layout::BITS_PER_CHAR {
            value = (value << 1) | self.read_bit()?;
        }
        Some(value)
    }

    pub fn bits_read(&self) -> usize {
        self.cursor
    }
}

/// Count how many whole characters fit in `len` bytes under `index_map`.
///
/// Counts at most `len` bits, so a map that never leaves the buffer still
/// terminates.
///
/// # Examples
/// ```
/// use voxcritter_core::stego::{char_capacity, rgb_channel_index};
///
/// // 4 RGBA pixels carry 12 bits, one full character.
/// assert_eq!(char_capacity(16, rgb_channel_index), 1);
/// ```
pub fn char_capacity<F>(len: usize, index_map: F) -> usize
where
    F: Fn(usize) -> usize,
{
    let mut bits = 0usize;
    while bits < len && index_map(bits) < len {
        bits += 1;
    }
    bits / layout::BITS_PER_CHAR
}

#[cfg(test)]
mod tests {
    use super::{LsbReader, char_capacity};
    use crate::stego::layout::rgb_channel_index;

    #[test]
    fn read_byte_packs_msb_first() {
        let pixels = [1u8, 0, 0, 0, 0, 0, 0, 1];
        let mut reader = LsbReader::new(&pixels, |idx| idx);
        assert_eq!(reader.read_byte(), Some(0b1000_0001));
        assert_eq!(reader.bits_read(), 8);
    }

    #[test]
    fn read_byte_ignores_upper_bits() {
        let pixels = [0xFE, 0xFF, 0xFE, 0xFF, 0xFE, 0xFF, 0xFE, 0xFF];
        let mut reader = LsbReader::new(&pixels, |idx| idx);
        assert_eq!(reader.read_byte(), Some(0b0101_0101));
    }

    #[test]
    fn read_byte_skips_alpha_with_rgb_map() {
        // Alpha bytes are set; RGB LSBs spell 0b1111_1111.
        let mut pixels = [0u8; 12];
        for (idx, byte) in pixels.iter_mut().enumerate() {
            *byte = if idx % 4 == 3 { 0 } else { 1 };
        }
        let mut reader = LsbReader::new(&pixels, rgb_channel_index);
        assert_eq!(reader.read_byte(), Some(0xFF));
    }

    #[test]
    fn read_byte_incomplete_returns_none() {
        let pixels = [1u8; 7];
        let mut reader = LsbReader::new(&pixels, |idx| idx);
        assert_eq!(reader.read_byte(), None);
    }

    #[test]
    fn char_capacity_counts_rgb_bits_only() {
        assert_eq!(char_capacity(0, rgb_channel_index), 0);
        assert_eq!(char_capacity(32, rgb_channel_index), 3);
        assert_eq!(char_capacity(32, |idx| idx), 4);
    }

    #[test]
    fn wrapping_index_map_is_bounded_by_buffer_len() {
        assert_eq!(char_capacity(16, |idx| idx % 16), 2);

        let pixels = [1u8; 8];
        let mut reader = LsbReader::new(&pixels, |idx| idx % 8);
        assert_eq!(reader.read_byte(), Some(0xFF));
        assert_eq!(reader.read_bit(), None);
        assert_eq!(reader.bits_read(), 8);
    }
}
