//! Raster primitives shared by the picture and icon decoders.
//!
//! QuickDraw addresses pixels in an absolute coordinate plane: every image
//! carries a bounds rectangle, and pixels are looked up by plane coordinates
//! rather than by buffer offsets. Compositing is a single operation,
//! [`RasterImage::src`], which copies a source wherever a mask is opaque.

use crate::common::binary::BinaryResult;
use crate::common::BeReader;

/// QuickDraw rectangle (big-endian on disk, half-open on both axes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl Rect {
    pub const fn new(top: i16, left: i16, bottom: i16, right: i16) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Read a rectangle stored as top, left, bottom, right.
    pub fn read(reader: &mut BeReader<'_>) -> BinaryResult<Self> {
        Ok(Self {
            top: reader.read_i16()?,
            left: reader.read_i16()?,
            bottom: reader.read_i16()?,
            right: reader.read_i16()?,
        })
    }

    /// Get width of rectangle
    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    /// Get height of rectangle
    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.bottom as i32 - self.top as i32
    }

    /// True if the rectangle covers no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left as i32 && x < self.right as i32 && y >= self.top as i32 && y < self.bottom as i32
    }

    /// Largest rectangle contained in both `self` and `other`.
    ///
    /// The result may be degenerate; callers iterate it as a half-open range
    /// so an inverted rectangle simply yields no points.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            top: self.top.max(other.top),
            left: self.left.max(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.min(other.right),
        }
    }

    /// Offset the rectangle, wrapping at the 16-bit coordinate limits.
    pub fn translate(&self, dx: i16, dy: i16) -> Rect {
        Rect {
            top: self.top.wrapping_add(dy),
            left: self.left.wrapping_add(dx),
            bottom: self.bottom.wrapping_add(dy),
            right: self.right.wrapping_add(dx),
        }
    }

    /// Number of points covered, zero for degenerate rectangles.
    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }
}

/// 8-bit RGBA color with straight (non-premultiplied) alpha
///
/// The default value is transparent black.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AlphaColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl AlphaColor {
    pub const TRANSPARENT: AlphaColor = AlphaColor::new(0, 0, 0, 0);
    pub const BLACK: AlphaColor = AlphaColor::rgb(0, 0, 0);
    pub const WHITE: AlphaColor = AlphaColor::rgb(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Fully opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 255)
    }

    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.alpha != 0
    }

    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// Anything that can resolve a color at a point of the coordinate plane.
///
/// Lookups outside [`ImageSource::bounds`] return transparent black.
pub trait ImageSource {
    fn bounds(&self) -> Rect;

    fn get(&self, x: i32, y: i32) -> AlphaColor;
}

/// Dense, owned RGBA buffer covering a rectangle of the coordinate plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    bounds: Rect,
    pixels: Vec<AlphaColor>,
}

impl RasterImage {
    /// Create a fully transparent image covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            pixels: vec![AlphaColor::TRANSPARENT; bounds.area()],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.bounds.width().max(0) as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bounds.height().max(0) as u32
    }

    /// Pixels in row-major order, top to bottom.
    pub fn pixels(&self) -> &[AlphaColor] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        let dx = (x - self.bounds.left as i32) as usize;
        let dy = (y - self.bounds.top as i32) as usize;
        dy * self.width() as usize + dx
    }

    /// Store `color` at `(x, y)`; points outside the bounds are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: AlphaColor) {
        if self.bounds.contains(x, y) {
            let index = self.index(x, y);
            self.pixels[index] = color;
        }
    }

    /// Copy `source` into this image at every point where `mask` is opaque.
    ///
    /// Only the intersection of the three bounds is visited. There is no
    /// blending: an opaque mask point replaces the destination pixel outright,
    /// including its alpha.
    pub fn src<S, M>(&mut self, source: &S, mask: &M)
    where
        S: ImageSource + ?Sized,
        M: ImageSource + ?Sized,
    {
        let area = self.bounds.intersect(&source.bounds()).intersect(&mask.bounds());
        for y in area.top as i32..area.bottom as i32 {
            for x in area.left as i32..area.right as i32 {
                if mask.get(x, y).is_opaque() {
                    self.set(x, y, source.get(x, y));
                }
            }
        }
    }

    /// Row-major, top-to-bottom RGBA8 bytes with straight alpha.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            out.extend_from_slice(&pixel.to_rgba());
        }
        out
    }
}

impl ImageSource for RasterImage {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn get(&self, x: i32, y: i32) -> AlphaColor {
        if self.bounds.contains(x, y) {
            self.pixels[self.index(x, y)]
        } else {
            AlphaColor::TRANSPARENT
        }
    }
}

/// Virtual image of a single color inside a rectangle.
///
/// Used as an always-opaque mask for plain blits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectConstant {
    rect: Rect,
    color: AlphaColor,
}

impl RectConstant {
    pub fn new(rect: Rect, color: AlphaColor) -> Self {
        Self { rect, color }
    }
}

impl ImageSource for RectConstant {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn get(&self, x: i32, y: i32) -> AlphaColor {
        if self.rect.contains(x, y) {
            self.color
        } else {
            AlphaColor::TRANSPARENT
        }
    }
}

/// Read-only view of an image shifted by `(dx, dy)`.
#[derive(Debug, Clone, Copy)]
pub struct TranslatedView<'a, S: ImageSource + ?Sized> {
    image: &'a S,
    bounds: Rect,
    dx: i16,
    dy: i16,
}

impl<'a, S: ImageSource + ?Sized> TranslatedView<'a, S> {
    pub fn new(image: &'a S, dx: i16, dy: i16) -> Self {
        Self {
            image,
            bounds: image.bounds().translate(dx, dy),
            dx,
            dy,
        }
    }
}

impl<S: ImageSource + ?Sized> ImageSource for TranslatedView<'_, S> {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn get(&self, x: i32, y: i32) -> AlphaColor {
        if !self.bounds.contains(x, y) {
            return AlphaColor::TRANSPARENT;
        }
        self.image.get(x - self.dx as i32, y - self.dy as i32)
    }
}
