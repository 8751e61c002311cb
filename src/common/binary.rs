//! Binary data parsing utilities shared across formats.
//!
//! Every classic Mac OS structure is stored big-endian. This module provides
//! offset-based readers for the fixed-layout headers (resource fork maps,
//! AppleSingle entry tables) and a sequential [`BeReader`] cursor for the
//! stream-shaped formats (pictures, icons, color tables).

use zerocopy::{BE, FromBytes, I16, I32, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { needed: usize, available: usize },
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData { needed, available } => {
                write!(
                    f,
                    "Insufficient data: needed {}, got {}",
                    needed, available
                )
            },
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn window(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    let end = offset.checked_add(len).ok_or(BinaryError::InsufficientData {
        needed: usize::MAX,
        available: data.len(),
    })?;
    data.get(offset..end).ok_or(BinaryError::InsufficientData {
        needed: end,
        available: data.len(),
    })
}

/// Read a big-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use resconv::common::binary::read_u16_be;
/// let data = [0x12, 0x34, 0x56, 0x78];
/// assert_eq!(read_u16_be(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_be(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_be(data: &[u8], offset: usize) -> BinaryResult<u16> {
    let bytes = window(data, offset, 2)?;
    Ok(U16::<BE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a big-endian i16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use resconv::common::binary::read_i16_be;
/// let data = [0xFF, 0xFE];
/// assert_eq!(read_i16_be(&data, 0).unwrap(), -2i16);
/// ```
#[inline]
pub fn read_i16_be(data: &[u8], offset: usize) -> BinaryResult<i16> {
    let bytes = window(data, offset, 2)?;
    Ok(I16::<BE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a big-endian u32 from a byte slice at the given offset.
#[inline]
pub fn read_u32_be(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = window(data, offset, 4)?;
    Ok(U32::<BE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a big-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_be(data: &[u8], offset: usize) -> BinaryResult<i32> {
    let bytes = window(data, offset, 4)?;
    Ok(I32::<BE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Borrow `len` bytes starting at `offset`, failing if they are not all present.
#[inline]
pub fn read_slice(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    window(data, offset, len)
}

/// Sequential big-endian reader over an immutable byte slice.
///
/// The cursor never reads past the end of its slice; every read either
/// succeeds completely or returns [`BinaryError::InsufficientData`] and
/// leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct BeReader<'data> {
    data: &'data [u8],
    pos: usize,
}

impl<'data> BeReader<'data> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'data [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the underlying slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The unread tail of the slice.
    #[inline]
    pub fn rest(&self) -> &'data [u8] {
        &self.data[self.pos..]
    }

    /// Consume `len` bytes and return them.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> BinaryResult<&'data [u8]> {
        let bytes = window(self.data, self.pos, len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Advance past `len` bytes without inspecting them.
    #[inline]
    pub fn skip(&mut self, len: usize) -> BinaryResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    #[inline]
    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> BinaryResult<u16> {
        let value = read_u16_be(self.data, self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    #[inline]
    pub fn read_i16(&mut self) -> BinaryResult<i16> {
        let value = read_i16_be(self.data, self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    #[inline]
    pub fn read_u32(&mut self) -> BinaryResult<u32> {
        let value = read_u32_be(self.data, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    #[inline]
    pub fn read_i32(&mut self) -> BinaryResult<i32> {
        let value = read_i32_be(self.data, self.pos)?;
        self.pos += 4;
        Ok(value)
    }
}
