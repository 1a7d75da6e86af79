//! Growable bit buffer with independent write and read cursors.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.

use crate::errors::ReadError;

/// Reads a single bit at `bit_pos` (0 = MSB of first byte). Returns 0 or 1.
pub fn read_bit_at(data: &[u8], bit_pos: usize) -> Result<u8, ReadError> {
    let byte = data
        .get(bit_pos / 8)
        .ok_or(ReadError::OutOfRangeRead { position: bit_pos })?;

    Ok((byte >> (7 - bit_pos % 8)) & 1)
}

/// Number of whole bytes needed to hold `bits` bits.
pub fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Bit-addressable storage. Writes append at the write cursor, reads consume
/// from the read cursor, and a read can never pass the write cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    write_pos: usize,
    read_pos: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a buffer from exported bytes holding `bit_len` meaningful bits.
    ///
    /// Bytes past the ones `bit_len` needs are dropped and pad bits in the last
    /// byte are cleared, so the result compares equal to the buffer that
    /// produced the bytes.
    pub fn from_bytes(data: &[u8], bit_len: usize) -> Result<Self, ReadError> {
        let needed = bytes_for_bits(bit_len);
        if needed > data.len() {
            return Err(ReadError::Format(format!(
                "{bit_len} bits need {needed} bytes, only {} supplied",
                data.len()
            )));
        }

        let mut bytes = data[..needed].to_vec();
        let used = bit_len % 8;
        if used != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFF << (8 - used);
            }
        }

        Ok(Self {
            bytes,
            write_pos: bit_len,
            read_pos: 0,
        })
    }

    /// Appends one bit.
    pub fn write_bit(&mut self, bit: bool) {
        if self.write_pos == self.bytes.len() * 8 {
            self.bytes.push(0);
        }

        if bit {
            self.bytes[self.write_pos / 8] |= 0x80 >> (self.write_pos % 8);
        }
        self.write_pos += 1;
    }

    /// Appends the 8 bits of `value`, most significant first.
    pub fn write_byte(&mut self, value: u8) {
        if self.write_pos % 8 == 0 {
            self.bytes.push(value);
            self.write_pos += 8;
            return;
        }

        for i in (0..8).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Reads the next unread bit.
    pub fn read_bit(&mut self) -> Result<bool, ReadError> {
        if self.read_pos == self.write_pos {
            return Err(ReadError::OutOfRangeRead {
                position: self.read_pos,
            });
        }

        let bit = read_bit_at(&self.bytes, self.read_pos)?;
        self.read_pos += 1;

        Ok(bit == 1)
    }

    /// Reads the next 8 bits as a byte, most significant first.
    pub fn read_byte(&mut self) -> Result<u8, ReadError> {
        let mut value = 0u8;
        for _ in 0..8 {
            value = (value << 1) | self.read_bit()? as u8;
        }

        Ok(value)
    }

    pub fn reset_read_cursor(&mut self) {
        self.read_pos = 0;
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.write_pos
    }

    pub fn is_empty(&self) -> bool {
        self.write_pos == 0
    }

    /// Bits between the read cursor and the write cursor.
    pub fn bits_remaining(&self) -> usize {
        self.write_pos - self.read_pos
    }

    pub fn read_position(&self) -> usize {
        self.read_pos
    }

    /// Underlying storage; pad bits after [`bit_len`](Self::bit_len) are zero.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
