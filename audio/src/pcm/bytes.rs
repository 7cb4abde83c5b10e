//! Conversion between raw sample bytes and signed integers.

use super::ByteOrder;

/// Width of one encoded sample in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    /// 8-bit samples.
    One,
    /// 16-bit samples.
    Two,
    /// 24-bit packed samples.
    Three,
    /// 32-bit samples.
    Four,
}

impl SampleWidth {
    /// Returns the width for a byte count between 1 and 4.
    pub fn from_byte_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// Returns the width for a bit depth of 8, 16, 24 or 32.
    pub fn from_bits(bits: u16) -> Option<Self> {
        if bits % 8 != 0 {
            return None;
        }
        Self::from_byte_count(usize::from(bits / 8))
    }

    /// Returns the number of bytes per sample.
    pub fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Decodes one signed sample from the first `self.bytes()` bytes of `src`.
    ///
    /// 24-bit values are sign-extended to 32 bits.
    ///
    /// # Panics
    ///
    /// Panics if `src` is shorter than the sample width.
    pub fn read(self, src: &[u8], order: ByteOrder) -> i32 {
        match (self, order) {
            (Self::One, _) => i32::from(src[0] as i8),
            (Self::Two, ByteOrder::Little) => i32::from(i16::from_le_bytes([src[0], src[1]])),
            (Self::Two, ByteOrder::Big) => i32::from(i16::from_be_bytes([src[0], src[1]])),
            (Self::Three, ByteOrder::Little) => {
                i32::from_le_bytes([0, src[0], src[1], src[2]]) >> 8
            }
            (Self::Three, ByteOrder::Big) => i32::from_be_bytes([src[0], src[1], src[2], 0]) >> 8,
            (Self::Four, ByteOrder::Little) => {
                i32::from_le_bytes([src[0], src[1], src[2], src[3]])
            }
            (Self::Four, ByteOrder::Big) => i32::from_be_bytes([src[0], src[1], src[2], src[3]]),
        }
    }

    /// Appends `value` to `dst`, keeping only the low `self.bytes()` bytes.
    pub fn write(self, value: i32, order: ByteOrder, dst: &mut Vec<u8>) {
        let n = self.bytes();
        match order {
            ByteOrder::Little => dst.extend_from_slice(&value.to_le_bytes()[..n]),
            ByteOrder::Big => dst.extend_from_slice(&value.to_be_bytes()[4 - n..]),
        }
    }
}

/// Decodes a signed integer from 1 to 4 bytes.
///
/// Returns `None` for any other length.
pub fn read_int(src: &[u8], order: ByteOrder) -> Option<i32> {
    SampleWidth::from_byte_count(src.len()).map(|w| w.read(src, order))
}

/// Encodes `value` into `count` bytes (1 to 4), truncating the high bytes.
///
/// Returns `None` for any other count.
pub fn write_int(value: i32, count: usize, order: ByteOrder) -> Option<Vec<u8>> {
    let width = SampleWidth::from_byte_count(count)?;
    let mut out = Vec::with_capacity(count);
    width.write(value, order, &mut out);
    Some(out)
}

/// Reads a little-endian `u16` at `offset`.
pub(crate) fn le_u16(src: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([src[offset], src[offset + 1]])
}

/// Reads a little-endian `u32` at `offset`.
pub(crate) fn le_u32(src: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        src[offset],
        src[offset + 1],
        src[offset + 2],
        src[offset + 3],
    ])
}
