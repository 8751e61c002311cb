//! Resconv - A Rust library for decoding classic Mac OS resources
//!
//! This library reads resource forks (raw or wrapped in AppleSingle/AppleDouble
//! files) and decodes their image-bearing resources into modern formats.
//!
//! # Features
//!
//! - **Resource forks**: Zero-copy `(type, id)` lookup over resource fork maps
//! - **AppleSingle/AppleDouble**: Unwrap the resource fork from either container
//! - **'PICT'**: Decode QuickDraw pictures, rasterizing PackBitsRect and DirectBitsRect
//! - **'cicn'**: Decode color icons and composite them through their masks
//! - **'clut'**: Read color tables and render them as JSON
//! - **'STR#' and 'TEXT'**: Decode MacRoman string lists and text to UTF-8
//! - **PNG export**: Encode decoded rasters through the `image` crate (`imgconv` feature)
//!
//! # Example - Converting a picture from a resource fork
//!
//! ```no_run
//! use resconv::images::pict::{Picture, export_png};
//! use resconv::resource::load_resource_fork;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("Graphics.rsrc")?;
//! let fork = load_resource_fork(data.into())?;
//! let picture = Picture::decode(fork.get("PICT", 128)?.data())?;
//!
//! if picture.version() == 2 && picture.is_raster() {
//!     std::fs::write("pict-128.png", export_png(&picture)?)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Listing resources
//!
//! ```no_run
//! use resconv::resource::ResourceFork;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fork = ResourceFork::open("Graphics.rsrc")?;
//! for resource_type in fork.types() {
//!     for entry in resource_type.entries() {
//!         println!("'{}' {} {:?}", resource_type.code(), entry.id(), entry.name());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Shared error handling, binary readers and text decoding
pub mod common;

/// Image decoders: 'PICT', 'cicn', 'clut' and their raster primitives
///
/// This module also provides PNG export of decoded rasters when the
/// `imgconv` feature is enabled.
pub mod images;

/// Resource fork and AppleSingle/AppleDouble readers
pub mod resource;

/// 'STR#' and 'TEXT' decoders
pub mod text;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use images::{ColorIcon, ColorTable, DecodeOptions, MissingColorPolicy, Picture};
pub use resource::{AppleSingle, ResourceFork, load_resource_fork};
pub use text::{StringList, decode_text_resource};
