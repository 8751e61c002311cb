//! Text-bearing resources.
//!
//! 'TEXT' resources hold a single MacRoman string; 'STR#' resources hold a
//! counted list of Pascal strings.

pub mod strl;

pub use strl::StringList;

use crate::common::encoding::decode_mac_text;

/// Decode a 'TEXT' resource to UTF-8 with LF line endings.
pub fn decode_text_resource(data: &[u8]) -> String {
    let text = decode_mac_text(data);
    log::debug!("'TEXT' resource: {} bytes, {} chars", data.len(), text.chars().count());
    text
}
