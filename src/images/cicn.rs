// 'cicn' color icon decoder
//
// A color icon bundles a pixmap, a 1-bit mask, a 1-bit fallback icon and the
// pixmap's color table. Exporting composites the pixmap through the mask.

use super::DecodeOptions;
use super::clut::ColorTable;
use super::pixmap::{BitMapHeader, PIXEL_TYPE_DIRECT, PixMapHeader};
use super::raster::{AlphaColor, RasterImage};
use crate::common::BeReader;
use crate::common::error::{Error, Result};

/// Decoded 'cicn' resource
#[derive(Debug, Clone)]
pub struct ColorIcon {
    pub pixmap: PixMapHeader,
    pub mask: BitMapHeader,
    pub bitmap: BitMapHeader,
    /// Handle placeholder stored in the resource, always ignored
    pub icon_data: u32,
    pub color_table: ColorTable,
    mask_image: RasterImage,
    bitmap_image: RasterImage,
    pixmap_image: RasterImage,
}

impl ColorIcon {
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, &DecodeOptions::default())
    }

    pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<Self> {
        let mut reader = BeReader::new(data);
        let pixmap = PixMapHeader::read_addressed(&mut reader)?;
        let mask = BitMapHeader::read(&mut reader)?;
        let bitmap = BitMapHeader::read(&mut reader)?;
        let icon_data = reader.read_u32()?;

        let mask_image = mask.decode(&mut reader, AlphaColor::BLACK, AlphaColor::TRANSPARENT)?;
        let bitmap_image = bitmap.decode(&mut reader, AlphaColor::BLACK, AlphaColor::WHITE)?;
        let color_table = ColorTable::read(&mut reader)?;
        let pixmap_image = if pixmap.pixel_type == PIXEL_TYPE_DIRECT {
            pixmap.decode_packed_direct(&mut reader)?
        } else {
            pixmap.decode_unpacked_indexed(&mut reader, &color_table, options.missing_color)?
        };

        if !reader.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "{} extra bytes at end of 'cicn' resource",
                reader.remaining()
            )));
        }
        log::debug!("color icon {:?}, mask {:?}", pixmap.bounds, mask.bounds);

        Ok(Self {
            pixmap,
            mask,
            bitmap,
            icon_data,
            color_table,
            mask_image,
            bitmap_image,
            pixmap_image,
        })
    }

    /// The 1-bit icon shown on displays without color.
    pub fn bitmap_image(&self) -> &RasterImage {
        &self.bitmap_image
    }

    pub fn mask_image(&self) -> &RasterImage {
        &self.mask_image
    }

    pub fn pixmap_image(&self) -> &RasterImage {
        &self.pixmap_image
    }

    /// Composite the color pixmap through the mask onto a canvas of the mask's bounds.
    pub fn to_rgba(&self) -> RasterImage {
        let mut canvas = RasterImage::new(self.mask.bounds);
        canvas.src(&self.pixmap_image, &self.mask_image);
        canvas
    }

    #[cfg(feature = "imgconv")]
    pub fn to_png(&self) -> Result<Vec<u8>> {
        super::raster_to_png(&self.to_rgba())
    }
}
