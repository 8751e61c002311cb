//! PackBits run-length decoding for pixmap scanlines.
//!
//! Each control byte `c` introduces either a literal run (`c` in 0x00..=0x7F:
//! `c + 1` raw bytes follow) or a repeated run (`c` in 0x80..=0xFF: the next
//! byte is repeated `0x101 - c` times). Two decoders share this scheme:
//! indexed rows produce palette indices, component rows produce channel
//! planes laid out one after another.
//!
//! Packed scanlines are individually prefixed with their byte length, one
//! byte wide when the pixmap's nominal row size is at most 250 bytes and two
//! bytes wide otherwise. If the total number of bytes consumed by a pixmap's
//! rows is odd, a single pad byte follows.

use crate::common::error::{Error, Result};
use crate::common::BeReader;

/// Largest nominal row size that still uses a one-byte length prefix.
pub const MAX_SHORT_ROW_BYTES: u16 = 250;

/// Run every control byte of `packed`, handing decoded bytes to `emit`.
fn unpack_row(packed: &[u8], mut emit: impl FnMut(u8)) -> Result<()> {
    let mut pos = 0;
    while pos < packed.len() {
        let control = packed[pos];
        pos += 1;

        if control >= 0x80 {
            let count = 0x101 - control as usize;
            let value = *packed.get(pos).ok_or_else(|| {
                Error::InvalidFormat("PackBits repeat run is missing its value byte".into())
            })?;
            pos += 1;
            for _ in 0..count {
                emit(value);
            }
        } else {
            let count = control as usize + 1;
            let literal = packed.get(pos..pos + count).ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "PackBits literal run of {} bytes exceeds the {} remaining in the row",
                    count,
                    packed.len() - pos
                ))
            })?;
            pos += count;
            for &value in literal {
                emit(value);
            }
        }
    }
    Ok(())
}

/// Decode one packed row of palette indices.
///
/// Values decoded past `width` are discarded; a row that decodes to fewer
/// than `width` values returns what it produced.
pub fn decode_indexed_run(packed: &[u8], width: usize) -> Result<Vec<u8>> {
    let mut indices = Vec::with_capacity(width);
    unpack_row(packed, |value| {
        if indices.len() < width {
            indices.push(value);
        }
    })?;
    Ok(indices)
}

/// Decode one packed row of channel planes into a flat buffer.
pub fn decode_component_run(packed: &[u8]) -> Result<Vec<u8>> {
    let mut components = Vec::with_capacity(packed.len() * 2);
    unpack_row(packed, |value| components.push(value))?;
    Ok(components)
}

/// Slice the red, green and blue planes out of a decoded component row.
///
/// With four components the first plane (alpha or padding) is skipped.
pub fn split_planes(components: &[u8], width: usize, cmp_count: usize) -> Result<[&[u8]; 3]> {
    if !(3..=4).contains(&cmp_count) {
        return Err(Error::Unsupported(format!(
            "direct pixels must have three or four components, not {}",
            cmp_count
        )));
    }
    let needed = cmp_count * width;
    if components.len() < needed {
        return Err(Error::InvalidFormat(format!(
            "component row decoded to {} bytes, expected {}",
            components.len(),
            needed
        )));
    }
    let skip = cmp_count - 3;
    let plane = |n: usize| &components[(skip + n) * width..(skip + n + 1) * width];
    Ok([plane(0), plane(1), plane(2)])
}

/// Sequential reader for the length-prefixed scanlines of one pixmap.
pub struct PackedRows<'r, 'data> {
    reader: &'r mut BeReader<'data>,
    wide_prefix: bool,
    bytes_read: usize,
}

impl<'r, 'data> PackedRows<'r, 'data> {
    /// Prepare to read rows of a pixmap whose nominal row size is `row_bytes`.
    pub fn new(reader: &'r mut BeReader<'data>, row_bytes: u16) -> Self {
        Self {
            reader,
            wide_prefix: row_bytes > MAX_SHORT_ROW_BYTES,
            bytes_read: 0,
        }
    }

    /// Return the packed bytes of the next scanline.
    pub fn next_row(&mut self) -> Result<&'data [u8]> {
        let len = if self.wide_prefix {
            self.bytes_read += 2;
            self.reader.read_u16()? as usize
        } else {
            self.bytes_read += 1;
            self.reader.read_u8()? as usize
        };
        if len > self.reader.remaining() {
            return Err(Error::InvalidFormat(format!(
                "row length {} exceeds the {} bytes remaining",
                len,
                self.reader.remaining()
            )));
        }
        log::trace!("packed row of {} bytes", len);
        self.bytes_read += len;
        Ok(self.reader.read_bytes(len)?)
    }

    /// Consume the pad byte that follows an odd total.
    pub fn finish(self) -> Result<()> {
        if self.bytes_read % 2 == 1 {
            self.reader.skip(1)?;
        }
        Ok(())
    }
}
