// PICT to raster image converter
//
// Exports decoded pictures as RGBA images and PNG bytes. Only version 2
// raster pictures can be exported; every entry point checks this first.

use super::parser::Picture;
use crate::common::error::Result;
use crate::images::raster_to_rgba_image;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Options for PICT to raster conversion
#[derive(Debug, Clone, Default)]
pub struct PictToRasterOptions {
    /// Target width (None = use source dimensions)
    pub width: Option<u32>,
    /// Target height (None = use source dimensions)
    pub height: Option<u32>,
}

/// PICT to raster converter
pub struct PictConverter<'a> {
    picture: &'a Picture,
    options: PictToRasterOptions,
}

impl<'a> PictConverter<'a> {
    /// Create a new PICT converter
    pub fn new(picture: &'a Picture, options: PictToRasterOptions) -> Self {
        Self { picture, options }
    }

    /// Calculate output dimensions maintaining aspect ratio
    fn calculate_dimensions(&self, src_width: u32, src_height: u32) -> (u32, u32) {
        let src_width = src_width.max(1);
        let src_height = src_height.max(1);

        match (self.options.width, self.options.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => {
                let aspect = src_height as f64 / src_width as f64;
                (w, ((w as f64 * aspect) as u32).max(1))
            },
            (None, Some(h)) => {
                let aspect = src_width as f64 / src_height as f64;
                (((h as f64 * aspect) as u32).max(1), h)
            },
            (None, None) => (src_width, src_height),
        }
    }

    /// Convert the picture to an RGBA image
    pub fn convert_to_image(&self) -> Result<RgbaImage> {
        self.picture.ensure_exportable()?;
        let image = raster_to_rgba_image(self.picture.canvas())?;

        if self.options.width.is_none() && self.options.height.is_none() {
            return Ok(image);
        }
        let (width, height) = self.calculate_dimensions(image.width(), image.height());
        if (width, height) == image.dimensions() {
            return Ok(image);
        }
        log::debug!(
            "resizing picture from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );
        Ok(imageops::resize(&image, width, height, FilterType::Lanczos3))
    }

    /// Convert the picture to PNG bytes
    pub fn convert_to_png(&self) -> Result<Vec<u8>> {
        let image = self.convert_to_image()?;
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}
