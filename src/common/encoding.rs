//! Character encoding utilities for classic Mac OS text.
//!
//! Resource names and other Pascal strings are stored in MacRoman with
//! carriage returns as line separators. This module converts them to UTF-8
//! with Unix line endings.

use encoding_rs::MACINTOSH;
use std::borrow::Cow;

/// Decode MacRoman bytes to a UTF-8 string.
///
/// MacRoman assigns a character to every byte value, so decoding never fails.
///
/// # Examples
/// ```
/// use resconv::common::encoding::decode_mac_roman;
///
/// assert_eq!(decode_mac_roman(b"caf\x8e"), "café");
/// ```
#[inline]
pub fn decode_mac_roman(data: &[u8]) -> Cow<'_, str> {
    let (text, _had_errors) = MACINTOSH.decode_without_bom_handling(data);
    text
}

/// Replace classic Mac line endings (CR) with LF.
pub fn cr_to_lf(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Decode a MacRoman string and normalize its line endings in one step.
pub fn decode_mac_text(data: &[u8]) -> String {
    cr_to_lf(&decode_mac_roman(data)).into_owned()
}
