//! Sub-byte field extraction for indexed pixel rows.

use crate::common::error::{Error, Result};

/// Reads consecutive N-bit fields, most significant bit first.
///
/// A single read never straddles a byte boundary. Pixel depths of 1, 2, 4 and
/// 8 bits always divide a byte evenly, so rows of those depths stay aligned.
#[derive(Debug, Clone)]
pub struct BitUnpacker<'data> {
    data: &'data [u8],
    byte: usize,
    bit: u32,
}

impl<'data> BitUnpacker<'data> {
    pub fn new(data: &'data [u8]) -> Self {
        Self {
            data,
            byte: 0,
            bit: 0,
        }
    }

    /// Extract the next `size`-bit field.
    ///
    /// Fails if the field would cross into the following byte or if the data
    /// is exhausted. A zero-width read returns 0 without moving the cursor.
    pub fn read_field(&mut self, size: u32) -> Result<u8> {
        if size == 0 {
            return Ok(0);
        }
        if size + self.bit > 8 {
            return Err(Error::Unsupported(format!(
                "unhandled case ({} + {})",
                size, self.bit
            )));
        }
        let byte = *self.data.get(self.byte).ok_or(Error::Truncated {
            needed: self.byte + 1,
            available: self.data.len(),
        })?;

        let shift = 8 - (self.bit + size);
        let mask = ((1u16 << size) - 1) as u8;
        let value = (byte >> shift) & mask;

        self.bit += size;
        if self.bit == 8 {
            self.byte += 1;
            self.bit = 0;
        }
        Ok(value)
    }

    /// Advance the cursor by `size` bits.
    pub fn skip(&mut self, size: usize) {
        let total = self.bit as usize + size;
        self.byte += total / 8;
        self.bit = (total % 8) as u32;
    }

    /// Current cursor as (byte offset, bit offset within that byte).
    pub fn position(&self) -> (usize, u32) {
        (self.byte, self.bit)
    }
}
