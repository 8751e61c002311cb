// Image decoding and conversion module
//
// This module decodes the image-bearing resources of classic Mac OS resource
// forks ('PICT', 'cicn', 'clut') into RGBA rasters and exports them as PNG.
//
// # Architecture
//
// - `raster`: coordinate-plane images, masks and compositing
// - `bits`: sub-byte field extraction for indexed rows
// - `packbits`: PackBits run-length scanline decoding
// - `clut`: color lookup tables
// - `pixmap`: pixel map headers and their decode strategies
// - `pict`: QuickDraw picture decoder
// - `cicn`: color icon decoder
//
// # Example: Converting a 'PICT' resource to PNG
//
// ```no_run
// use resconv::images::pict::{Picture, export_png};
//
// let data = std::fs::read("picture.pict")?;
// let picture = Picture::decode(&data)?;
// if picture.is_raster() && picture.version() == 2 {
//     std::fs::write("picture.png", export_png(&picture)?)?;
// }
// # Ok::<(), resconv::common::error::Error>(())
// ```

pub mod bits;
pub mod cicn;
pub mod clut;
pub mod packbits;
pub mod pict;
pub mod pixmap;
pub mod raster;

pub use cicn::ColorIcon;
pub use clut::{ColorTable, MissingColorPolicy};
pub use pict::Picture;
pub use raster::{AlphaColor, ImageSource, RasterImage, Rect};

/// Options shared by the indexed-image decoders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Resolution of pixel values missing from their color table
    pub missing_color: MissingColorPolicy,
}

/// Copy a raster into an `image` crate buffer of the same size.
#[cfg(feature = "imgconv")]
pub fn raster_to_rgba_image(raster: &RasterImage) -> crate::common::error::Result<image::RgbaImage> {
    use crate::common::error::Error;

    image::RgbaImage::from_raw(raster.width(), raster.height(), raster.to_rgba_bytes()).ok_or_else(
        || Error::ImageEncode("raster buffer does not match its dimensions".into()),
    )
}

/// Encode a raster as PNG bytes.
#[cfg(feature = "imgconv")]
pub fn raster_to_png(raster: &RasterImage) -> crate::common::error::Result<Vec<u8>> {
    let image = raster_to_rgba_image(raster)?;
    log::debug!("encoding {}x{} PNG", image.width(), image.height());
    let mut buffer = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
