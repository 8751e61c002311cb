//! QuickDraw pixel maps and bitmaps.
//!
//! A pixmap header describes a rectangle of pixels: its depth, whether the
//! pixels are palette indices or direct RGB, and how the scanlines are packed.
//! The scanline bytes follow the header (and, for indexed pixmaps, a color
//! table) in the enclosing stream. Three decode strategies cover every layout
//! this crate accepts:
//!
//! | Strategy         | Used by              | Rows                     |
//! |------------------|----------------------|--------------------------|
//! | unpacked indexed | 'cicn'               | `row_bytes` raw bytes    |
//! | packed indexed   | PackBitsRect         | length-prefixed PackBits |
//! | packed direct    | DirectBitsRect       | length-prefixed planes   |

use super::bits::BitUnpacker;
use super::clut::{ColorTable, MissingColorPolicy};
use super::packbits::{PackedRows, decode_component_run, decode_indexed_run, split_planes};
use super::raster::{AlphaColor, RasterImage, Rect};
use crate::common::error::{Error, Result};
use crate::common::BeReader;

/// `pixel_type` of palette-indexed pixmaps
pub const PIXEL_TYPE_INDEXED: i16 = 0;
/// `pixel_type` of direct RGB pixmaps
pub const PIXEL_TYPE_DIRECT: i16 = 16;

/// `pack_type` values
pub const PACK_DEFAULT: i16 = 0;
pub const PACK_COMPONENT_RUN_LENGTH: i16 = 4;

/// The two high bits of `row_bytes` are flags, not part of the count.
const ROW_BYTES_MASK: u16 = 0x3FFF;

/// 16.16 fixed-point number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fixed(pub i32);

impl Fixed {
    /// 72 dots per inch, the only resolution pictures may declare.
    pub const DPI_72: Fixed = Fixed(0x0048_0000);

    pub fn read(reader: &mut BeReader<'_>) -> Result<Self> {
        Ok(Fixed(reader.read_i32()?))
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    /// Integer part, rounding toward negative infinity.
    #[inline]
    pub fn floor(self) -> i16 {
        (self.0 >> 16) as i16
    }
}

/// Pixel map header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixMapHeader {
    /// Nominal bytes per row, flag bits removed
    pub row_bytes: u16,
    pub bounds: Rect,
    pub version: i16,
    pub pack_type: i16,
    pub pack_size: i32,
    pub h_res: Fixed,
    pub v_res: Fixed,
    pub pixel_type: i16,
    pub pixel_size: i16,
    pub cmp_count: i16,
    pub cmp_size: i16,
    pub plane_bytes: i32,
    pub table: u32,
    pub reserved: i32,
}

impl PixMapHeader {
    /// Read and validate a header (without a leading base address).
    pub fn read(reader: &mut BeReader<'_>) -> Result<Self> {
        let header = Self {
            row_bytes: reader.read_u16()? & ROW_BYTES_MASK,
            bounds: Rect::read(reader)?,
            version: reader.read_i16()?,
            pack_type: reader.read_i16()?,
            pack_size: reader.read_i32()?,
            h_res: Fixed::read(reader)?,
            v_res: Fixed::read(reader)?,
            pixel_type: reader.read_i16()?,
            pixel_size: reader.read_i16()?,
            cmp_count: reader.read_i16()?,
            cmp_size: reader.read_i16()?,
            plane_bytes: reader.read_i32()?,
            table: reader.read_u32()?,
            reserved: reader.read_i32()?,
        };
        header.validate()?;
        log::debug!(
            "pixmap {:?}: row_bytes {}, type {}, {} bpp, pack {}",
            header.bounds,
            header.row_bytes,
            header.pixel_type,
            header.pixel_size,
            header.pack_type
        );
        Ok(header)
    }

    /// Read a header preceded by a 32-bit base address, which is ignored.
    pub fn read_addressed(reader: &mut BeReader<'_>) -> Result<Self> {
        let _base_addr = reader.read_u32()?;
        Self::read(reader)
    }

    fn validate(&self) -> Result<()> {
        if self.plane_bytes != 0 {
            return Err(Error::InvalidFormat("PixMap plane_bytes must be 0".into()));
        }
        if self.table != 0 {
            return Err(Error::InvalidFormat("PixMap table must be 0".into()));
        }
        if self.reserved != 0 {
            return Err(Error::InvalidFormat("PixMap reserved must be 0".into()));
        }

        match self.pixel_type {
            PIXEL_TYPE_INDEXED => {
                if !matches!(self.pixel_size, 1 | 2 | 4 | 8) {
                    return Err(Error::Unsupported(format!(
                        "indexed pixels may not have size {}",
                        self.pixel_size
                    )));
                }
                if self.pack_type != PACK_DEFAULT || self.pack_size != 0 {
                    return Err(Error::InvalidFormat("indexed pixels may not be packed".into()));
                }
                if self.cmp_count != 1 || self.cmp_size != self.pixel_size {
                    return Err(Error::InvalidFormat(
                        "indexed pixels must have one component".into(),
                    ));
                }
            },
            PIXEL_TYPE_DIRECT => {
                match self.pixel_size {
                    32 if self.cmp_size != 8 => {
                        return Err(Error::InvalidFormat(
                            "32-bit direct pixels must have cmp_size 8".into(),
                        ));
                    },
                    32 => {},
                    16 => {
                        return Err(Error::Unsupported(format!(
                            "unsupported pixel_size {}",
                            self.pixel_size
                        )));
                    },
                    other => {
                        return Err(Error::InvalidFormat(format!(
                            "direct pixels may not have size {}",
                            other
                        )));
                    },
                }
                if self.cmp_count != 3 && self.cmp_count != 4 {
                    return Err(Error::InvalidFormat(
                        "direct pixels must have three or four components".into(),
                    ));
                }
            },
            other => {
                return Err(Error::InvalidFormat(format!(
                    "illegal PixMap pixel_type {}",
                    other
                )));
            },
        }
        Ok(())
    }

    #[inline]
    fn width(&self) -> usize {
        self.bounds.width().max(0) as usize
    }

    #[inline]
    fn rows(&self) -> i32 {
        self.bounds.height().max(0)
    }

    fn require_indexed(&self) -> Result<()> {
        if self.pixel_type != PIXEL_TYPE_INDEXED {
            return Err(Error::Unsupported("image is not indexed".into()));
        }
        Ok(())
    }

    /// Decode `row_bytes`-wide unpacked rows of palette indices.
    pub fn decode_unpacked_indexed(
        &self,
        reader: &mut BeReader<'_>,
        clut: &ColorTable,
        policy: MissingColorPolicy,
    ) -> Result<RasterImage> {
        self.require_indexed()?;
        let mut image = RasterImage::new(self.bounds);
        if self.row_bytes == 0 {
            return Ok(image);
        }

        let depth = self.pixel_size as u32;
        let mut bytes_read = 0usize;
        for row in 0..self.rows() {
            let data = reader.read_bytes(self.row_bytes as usize)?;
            bytes_read += data.len();
            let mut bits = BitUnpacker::new(data);
            let y = self.bounds.top as i32 + row;
            for column in 0..self.width() {
                let value = bits.read_field(depth)?;
                let x = self.bounds.left as i32 + column as i32;
                image.set(x, y, clut.resolve(value as u16, policy)?);
            }
        }
        if bytes_read % 2 == 1 {
            reader.skip(1)?;
        }
        Ok(image)
    }

    /// Decode PackBits-compressed rows of palette indices.
    ///
    /// Every decoded byte is one index, whatever the declared pixel depth.
    pub fn decode_packed_indexed(
        &self,
        reader: &mut BeReader<'_>,
        clut: &ColorTable,
        policy: MissingColorPolicy,
    ) -> Result<RasterImage> {
        self.require_indexed()?;
        let mut image = RasterImage::new(self.bounds);
        if self.row_bytes == 0 {
            return Ok(image);
        }

        let mut rows = PackedRows::new(reader, self.row_bytes);
        for row in 0..self.rows() {
            let indices = decode_indexed_run(rows.next_row()?, self.width())?;
            let y = self.bounds.top as i32 + row;
            for (column, &value) in indices.iter().enumerate() {
                let x = self.bounds.left as i32 + column as i32;
                image.set(x, y, clut.resolve(value as u16, policy)?);
            }
        }
        rows.finish()?;
        Ok(image)
    }

    /// Decode component-run-length rows of direct RGB pixels.
    pub fn decode_packed_direct(&self, reader: &mut BeReader<'_>) -> Result<RasterImage> {
        if self.pixel_type != PIXEL_TYPE_DIRECT {
            return Err(Error::Unsupported("image is not direct".into()));
        }
        if self.pack_type != PACK_COMPONENT_RUN_LENGTH {
            return Err(Error::Unsupported(format!(
                "unsupported pack_type {}",
                self.pack_type
            )));
        }
        let mut image = RasterImage::new(self.bounds);
        if self.row_bytes == 0 {
            return Ok(image);
        }

        let width = self.width();
        let mut rows = PackedRows::new(reader, self.row_bytes);
        for row in 0..self.rows() {
            let components = decode_component_run(rows.next_row()?)?;
            let [red, green, blue] = split_planes(&components, width, self.cmp_count as usize)?;
            let y = self.bounds.top as i32 + row;
            for column in 0..width {
                let x = self.bounds.left as i32 + column as i32;
                image.set(x, y, AlphaColor::rgb(red[column], green[column], blue[column]));
            }
        }
        rows.finish()?;
        Ok(image)
    }
}

/// One-bit-deep bitmap header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMapHeader {
    pub base_addr: u32,
    pub row_bytes: u16,
    pub bounds: Rect,
}

impl BitMapHeader {
    pub fn read(reader: &mut BeReader<'_>) -> Result<Self> {
        let header = Self {
            base_addr: reader.read_u32()?,
            row_bytes: reader.read_u16()?,
            bounds: Rect::read(reader)?,
        };
        if header.base_addr != 0 {
            return Err(Error::InvalidFormat("BitMap base_addr must be 0".into()));
        }
        Ok(header)
    }

    /// Decode unpacked 1-bit rows, mapping set bits to `on` and clear bits to `off`.
    pub fn decode(
        &self,
        reader: &mut BeReader<'_>,
        on: AlphaColor,
        off: AlphaColor,
    ) -> Result<RasterImage> {
        let mut image = RasterImage::new(self.bounds);
        if self.row_bytes == 0 {
            return Ok(image);
        }
        for row in 0..self.bounds.height().max(0) {
            let mut bits = BitUnpacker::new(reader.read_bytes(self.row_bytes as usize)?);
            let y = self.bounds.top as i32 + row;
            for column in 0..self.bounds.width().max(0) {
                let x = self.bounds.left as i32 + column;
                image.set(x, y, if bits.read_field(1)? != 0 { on } else { off });
            }
        }
        Ok(image)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::images::raster::ImageSource;

    /// Serialize a pixmap header the way it appears in a picture stream.
    pub(crate) fn header_bytes(
        row_bytes: u16,
        bounds: Rect,
        pixel_type: i16,
        pixel_size: i16,
        pack_type: i16,
        cmp_count: i16,
        cmp_size: i16,
    ) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(row_bytes | 0x8000).to_be_bytes());
        for v in [bounds.top, bounds.left, bounds.bottom, bounds.right] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data.extend_from_slice(&0i16.to_be_bytes()); // version
        data.extend_from_slice(&pack_type.to_be_bytes());
        data.extend_from_slice(&0i32.to_be_bytes()); // pack_size
        data.extend_from_slice(&Fixed::DPI_72.0.to_be_bytes());
        data.extend_from_slice(&Fixed::DPI_72.0.to_be_bytes());
        data.extend_from_slice(&pixel_type.to_be_bytes());
        data.extend_from_slice(&pixel_size.to_be_bytes());
        data.extend_from_slice(&cmp_count.to_be_bytes());
        data.extend_from_slice(&cmp_size.to_be_bytes());
        data.extend_from_slice(&[0u8; 12]); // plane_bytes, table, reserved
        data
    }

    fn gray_table(count: u16) -> ColorTable {
        let mut data = vec![0, 0, 0, 0, 0, 0];
        data.extend_from_slice(&(count - 1).to_be_bytes());
        for id in 0..count {
            let level = id * 0x1100;
            for v in [id, level, level, level] {
                data.extend_from_slice(&v.to_be_bytes());
            }
        }
        ColorTable::parse_resource(&data).unwrap()
    }

    fn gray(id: u8) -> AlphaColor {
        AlphaColor::rgb(id * 0x11, id * 0x11, id * 0x11)
    }

    #[test]
    fn test_read_masks_row_byte_flags() {
        let data = header_bytes(4, Rect::new(0, 0, 1, 4), 0, 8, 0, 1, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        assert_eq!(header.row_bytes, 4);
        assert_eq!(header.h_res, Fixed::DPI_72);
        assert_eq!(header.h_res.to_f64(), 72.0);
    }

    #[test]
    fn test_nonzero_reserved_is_fatal() {
        let mut data = header_bytes(4, Rect::new(0, 0, 1, 4), 0, 8, 0, 1, 8);
        let last = data.len() - 1;
        data[last] = 1;
        let err = PixMapHeader::read(&mut BeReader::new(&data)).unwrap_err();
        assert!(err.to_string().contains("reserved must be 0"));
    }

    #[test]
    fn test_nonzero_plane_bytes_is_fatal() {
        let mut data = header_bytes(4, Rect::new(0, 0, 1, 4), 0, 8, 0, 1, 8);
        let at = data.len() - 12;
        data[at + 3] = 1;
        assert!(PixMapHeader::read(&mut BeReader::new(&data)).is_err());
    }

    #[test]
    fn test_indexed_validation() {
        let rect = Rect::new(0, 0, 1, 1);
        let cases = [
            header_bytes(2, rect, 0, 3, 0, 1, 3),
            header_bytes(2, rect, 0, 8, 1, 1, 8),
            header_bytes(2, rect, 0, 8, 0, 2, 8),
            header_bytes(2, rect, 0, 8, 0, 1, 4),
        ];
        for data in cases {
            assert!(PixMapHeader::read(&mut BeReader::new(&data)).is_err());
        }
    }

    #[test]
    fn test_direct_validation() {
        let rect = Rect::new(0, 0, 1, 1);
        let err = PixMapHeader::read(&mut BeReader::new(&header_bytes(4, rect, 16, 16, 4, 3, 5)))
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(ref m) if m.contains("pixel_size 16")));
        assert!(PixMapHeader::read(&mut BeReader::new(&header_bytes(4, rect, 16, 32, 4, 3, 5))).is_err());
        assert!(PixMapHeader::read(&mut BeReader::new(&header_bytes(4, rect, 16, 32, 4, 2, 8))).is_err());
        assert!(PixMapHeader::read(&mut BeReader::new(&header_bytes(4, rect, 16, 24, 4, 3, 8))).is_err());
        assert!(PixMapHeader::read(&mut BeReader::new(&header_bytes(4, rect, 16, 32, 4, 4, 8))).is_ok());
    }

    #[test]
    fn test_illegal_pixel_type() {
        let data = header_bytes(2, Rect::new(0, 0, 1, 1), 7, 8, 0, 1, 8);
        let err = PixMapHeader::read(&mut BeReader::new(&data)).unwrap_err();
        assert!(err.to_string().contains("illegal PixMap pixel_type 7"));
    }

    #[test]
    fn test_unpacked_indexed_two_bit() {
        let data = header_bytes(2, Rect::new(10, 20, 12, 24), 0, 2, 0, 1, 2);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        // rows: [0,1,2,3] and [3,3,0,0], row_bytes 2 (second byte is padding)
        let rows = [0b00_01_10_11, 0x00, 0b11_11_00_00, 0x00];
        let mut reader = BeReader::new(&rows);
        let image = header
            .decode_unpacked_indexed(&mut reader, &gray_table(4), MissingColorPolicy::Error)
            .unwrap();
        assert!(reader.is_empty());
        assert_eq!(image.get(20, 10), gray(0));
        assert_eq!(image.get(23, 10), gray(3));
        assert_eq!(image.get(21, 11), gray(3));
        assert_eq!(image.get(22, 11), gray(0));
    }

    #[test]
    fn test_unpacked_indexed_pads_odd_total() {
        let data = header_bytes(1, Rect::new(0, 0, 1, 8), 0, 1, 0, 1, 1);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        let rows = [0b1000_0000, 0xAA, 0x55];
        let mut reader = BeReader::new(&rows);
        header
            .decode_unpacked_indexed(&mut reader, &gray_table(2), MissingColorPolicy::Error)
            .unwrap();
        assert_eq!(reader.rest(), &[0x55]);
    }

    #[test]
    fn test_missing_color_policy() {
        let data = header_bytes(1, Rect::new(0, 0, 1, 1), 0, 8, 0, 1, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        let rows = [0x09, 0x00];
        let strict = header.decode_unpacked_indexed(
            &mut BeReader::new(&rows),
            &gray_table(2),
            MissingColorPolicy::Error,
        );
        assert!(matches!(strict, Err(Error::MissingColor(9))));
        let lenient = header
            .decode_unpacked_indexed(
                &mut BeReader::new(&rows),
                &gray_table(2),
                MissingColorPolicy::Transparent,
            )
            .unwrap();
        assert_eq!(lenient.get(0, 0), AlphaColor::TRANSPARENT);
    }

    #[test]
    fn test_packed_indexed() {
        let data = header_bytes(4, Rect::new(0, 0, 2, 3), 0, 8, 0, 1, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        // row 0: literal [1,2,3]; row 1: repeat 2 x3 plus one discarded value
        let rows = [0x04, 0x02, 1, 2, 3, 0x04, 0xFD, 2, 0x00, 9, 0x00];
        let mut reader = BeReader::new(&rows);
        let image = header
            .decode_packed_indexed(&mut reader, &gray_table(4), MissingColorPolicy::Error)
            .unwrap();
        assert_eq!(image.get(0, 0), gray(1));
        assert_eq!(image.get(2, 0), gray(3));
        assert_eq!(image.get(0, 1), gray(2));
        assert_eq!(image.get(2, 1), gray(2));
        // 5 + 5 bytes consumed is even, so the trailing zero is left unread
        assert_eq!(reader.rest(), &[0x00]);
    }

    #[test]
    fn test_row_prefix_width_boundary() {
        // 250 bytes per row still uses a one-byte length prefix
        let data = header_bytes(250, Rect::new(0, 0, 1, 250), 0, 8, 0, 1, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        let rows = [0x04, 0x81, 1, 0x87, 1, 0x00, 0xEE];
        let mut reader = BeReader::new(&rows);
        let image = header
            .decode_packed_indexed(&mut reader, &gray_table(2), MissingColorPolicy::Error)
            .unwrap();
        assert_eq!(image.get(0, 0), gray(1));
        assert_eq!(image.get(249, 0), gray(1));
        assert_eq!(reader.rest(), &[0xEE]);

        // 251 switches to a two-byte prefix
        let data = header_bytes(251, Rect::new(0, 0, 1, 251), 0, 8, 0, 1, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        let rows = [0x00, 0x04, 0x81, 1, 0x86, 1, 0xEE];
        let mut reader = BeReader::new(&rows);
        let image = header
            .decode_packed_indexed(&mut reader, &gray_table(2), MissingColorPolicy::Error)
            .unwrap();
        assert_eq!(image.get(0, 0), gray(1));
        assert_eq!(image.get(250, 0), gray(1));
        assert_eq!(reader.rest(), &[0xEE]);
    }

    #[test]
    fn test_zero_row_bytes_is_noop() {
        let data = header_bytes(0, Rect::new(0, 0, 2, 2), 0, 8, 0, 1, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        let mut reader = BeReader::new(&[0xFF]);
        let image = header
            .decode_packed_indexed(&mut reader, &gray_table(1), MissingColorPolicy::Error)
            .unwrap();
        assert_eq!(reader.remaining(), 1);
        assert!(image.pixels().iter().all(|p| *p == AlphaColor::TRANSPARENT));
    }

    #[test]
    fn test_degenerate_bounds_is_noop() {
        let data = header_bytes(4, Rect::new(5, 5, 5, 9), 0, 8, 0, 1, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        let mut reader = BeReader::new(&[]);
        let image = header
            .decode_packed_indexed(&mut reader, &gray_table(1), MissingColorPolicy::Error)
            .unwrap();
        assert!(image.pixels().is_empty());
    }

    #[test]
    fn test_packed_direct_three_components() {
        let data = header_bytes(8, Rect::new(0, 0, 1, 2), 16, 32, 4, 3, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        // one row: literal of 6 bytes R R G G B B
        let rows = [0x07, 0x05, 0xFF, 0x10, 0x00, 0x20, 0x00, 0x30];
        let mut reader = BeReader::new(&rows);
        let image = header.decode_packed_direct(&mut reader).unwrap();
        assert_eq!(image.get(0, 0), AlphaColor::rgb(0xFF, 0x00, 0x00));
        assert_eq!(image.get(1, 0), AlphaColor::rgb(0x10, 0x20, 0x30));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_packed_direct_four_components_pad() {
        let data = header_bytes(8, Rect::new(0, 0, 1, 1), 16, 32, 4, 4, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        // A R G B as a literal run; 1 + 5 bytes is even, then nothing
        let rows = [0x05, 0x03, 0x00, 0x11, 0x22, 0x33];
        let image = header.decode_packed_direct(&mut BeReader::new(&rows)).unwrap();
        assert_eq!(image.get(0, 0), AlphaColor::rgb(0x11, 0x22, 0x33));
    }

    #[test]
    fn test_packed_direct_requires_component_packing() {
        let data = header_bytes(8, Rect::new(0, 0, 1, 1), 16, 32, 1, 3, 8);
        let header = PixMapHeader::read(&mut BeReader::new(&data)).unwrap();
        let err = header.decode_packed_direct(&mut BeReader::new(&[])).unwrap_err();
        assert!(err.to_string().contains("unsupported pack_type 1"));
    }

    #[test]
    fn test_bitmap_decode() {
        let mut data = vec![0, 0, 0, 0, 0, 2];
        for v in [0i16, 0, 2, 3] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data.extend_from_slice(&[0b1010_0000, 0x00, 0b0110_0000, 0x00]);
        let mut reader = BeReader::new(&data);
        let header = BitMapHeader::read(&mut reader).unwrap();
        let image = header.decode(&mut reader, AlphaColor::BLACK, AlphaColor::WHITE).unwrap();
        assert!(reader.is_empty());
        assert_eq!(image.get(0, 0), AlphaColor::BLACK);
        assert_eq!(image.get(1, 0), AlphaColor::WHITE);
        assert_eq!(image.get(2, 0), AlphaColor::BLACK);
        assert_eq!(image.get(0, 1), AlphaColor::WHITE);
        assert_eq!(image.get(1, 1), AlphaColor::BLACK);
    }

    #[test]
    fn test_bitmap_base_addr_must_be_zero() {
        let data = [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(BitMapHeader::read(&mut BeReader::new(&data)).is_err());
    }
}
