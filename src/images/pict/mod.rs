// Macintosh PICT format decoder and converter
//
// This module decodes 'PICT' resources into a raster canvas and exports
// raster pictures to PNG.
//
// PICT is the native graphics metafile format for Mac OS Classic. There are
// two versions: PICT 1 (original) and PICT 2 (extended). Only the raster
// subset of PICT 2 is rasterized: PackBitsRect and DirectBitsRect pixmaps
// composited in source-copy mode. Vector opcodes are skipped and mark the
// picture as non-raster.
//
// References:
// - Inside Macintosh: Imaging With QuickDraw
// - Apple Technical Note TN1023: Understanding the PICT Format

pub mod opcodes;
pub mod parser;

#[cfg(feature = "imgconv")]
pub mod converter;

#[cfg(feature = "imgconv")]
pub use converter::{PictConverter, PictToRasterOptions};
pub use parser::Picture;

/// Convert an exportable picture to PNG bytes at its own size
///
/// # Example
/// ```no_run
/// use resconv::images::pict::{Picture, export_png};
///
/// let pict_data = std::fs::read("picture.pict")?;
/// let picture = Picture::decode(&pict_data)?;
/// std::fs::write("picture.png", export_png(&picture)?)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[cfg(feature = "imgconv")]
pub fn export_png(picture: &Picture) -> crate::common::error::Result<Vec<u8>> {
    PictConverter::new(picture, PictToRasterOptions::default()).convert_to_png()
}

/// Decode 'PICT' resource bytes and convert them to PNG
#[cfg(feature = "imgconv")]
pub fn convert_pict_to_png(
    pict_data: &[u8],
    width: Option<u32>,
    height: Option<u32>,
) -> crate::common::error::Result<Vec<u8>> {
    let picture = Picture::decode(pict_data)?;
    let options = PictToRasterOptions { width, height };
    PictConverter::new(&picture, options).convert_to_png()
}
