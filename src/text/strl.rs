//! 'STR#' string lists.
//!
//! A u16 count followed by that many Pascal strings (one length byte, then
//! MacRoman text). Each string is decoded to UTF-8 with CR line endings
//! converted to LF.

use crate::common::BeReader;
use crate::common::encoding::decode_mac_text;
use crate::common::error::{Error, Result};

/// Decoded 'STR#' resource
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringList {
    strings: Vec<String>,
}

impl StringList {
    /// Parse a 'STR#' resource. Truncated strings and trailing bytes are errors.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BeReader::new(data);
        let count = reader.read_u16()?;

        let mut strings = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = reader.read_u8()? as usize;
            strings.push(decode_mac_text(reader.read_bytes(len)?));
        }
        if !reader.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "{} extra bytes at end of 'STR#' resource",
                reader.remaining()
            )));
        }

        log::debug!("string list with {} entries", strings.len());
        Ok(Self { strings })
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn into_strings(self) -> Vec<String> {
        self.strings
    }

    /// Render as a JSON array of strings.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.strings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_list(strings: &[&[u8]]) -> Vec<u8> {
        let mut data = (strings.len() as u16).to_be_bytes().to_vec();
        for s in strings {
            data.push(s.len() as u8);
            data.extend_from_slice(s);
        }
        data
    }

    #[test]
    fn test_parse_strings() {
        let data = string_list(&[b"Open", b"", b"line one\rline two", b"caf\x8e"]);
        let list = StringList::parse(&data).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(0), Some("Open"));
        assert_eq!(list.get(1), Some(""));
        assert_eq!(list.get(2), Some("line one\nline two"));
        assert_eq!(list.get(3), Some("café"));
        assert_eq!(list.get(4), None);
    }

    #[test]
    fn test_empty_list() {
        let list = StringList::parse(&[0x00, 0x00]).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_truncated_string_is_fatal() {
        let mut data = string_list(&[b"Quit"]);
        data.pop();
        assert!(matches!(StringList::parse(&data), Err(Error::Truncated { .. })));

        // count promises a second string that never comes
        let mut data = string_list(&[b"Quit"]);
        data[1] = 2;
        assert!(matches!(StringList::parse(&data), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_trailing_bytes_are_fatal() {
        let mut data = string_list(&[b"Quit"]);
        data.extend_from_slice(&[0, 0, 0]);
        let err = StringList::parse(&data).unwrap_err();
        assert!(err.to_string().contains("3 extra bytes at end of 'STR#' resource"));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_rendering() {
        let list = StringList::parse(&string_list(&[b"a\rb", b"\xa5"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&list.to_json().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!(["a\nb", "\u{2022}"]));
    }
}
