//! AppleSingle and AppleDouble containers.
//!
//! Both formats share one layout: a magic number, a version, 16 filler bytes
//! and a table of `(id, offset, length)` entries locating the file's forks
//! and metadata. The header is big-endian, but files written by some encoders
//! are byte-swapped throughout; their magic reads as the byte-swapped
//! constant, and every following field is swapped back.

use crate::common::BeReader;
use crate::common::binary::read_slice;
use crate::common::encoding::decode_mac_text;
use crate::common::error::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;

pub const APPLE_SINGLE_MAGIC: u32 = 0x0005_1600;
pub const APPLE_DOUBLE_MAGIC: u32 = 0x0005_1607;
const APPLE_SINGLE_VERSION_2: u32 = 0x0002_0000;

/// Entry ids defined by the format
pub const ENTRY_DATA_FORK: u32 = 1;
pub const ENTRY_RESOURCE_FORK: u32 = 2;
pub const ENTRY_REAL_NAME: u32 = 3;

/// Which of the two container kinds a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppleContainerKind {
    Single,
    Double,
}

/// Parsed AppleSingle or AppleDouble file
#[derive(Debug, Clone)]
pub struct AppleSingle {
    kind: AppleContainerKind,
    little_endian: bool,
    entries: BTreeMap<u32, Bytes>,
}

impl AppleSingle {
    pub fn parse(data: Bytes) -> Result<Self> {
        let mut reader = BeReader::new(&data);
        let magic = reader.read_u32()?;
        let (kind, little_endian) = match magic {
            APPLE_SINGLE_MAGIC => (AppleContainerKind::Single, false),
            APPLE_DOUBLE_MAGIC => (AppleContainerKind::Double, false),
            m if m == APPLE_SINGLE_MAGIC.swap_bytes() => (AppleContainerKind::Single, true),
            m if m == APPLE_DOUBLE_MAGIC.swap_bytes() => (AppleContainerKind::Double, true),
            other => {
                return Err(Error::InvalidFormat(format!(
                    "invalid magic number 0x{:08x}",
                    other
                )));
            },
        };
        let fix32 = |v: u32| if little_endian { v.swap_bytes() } else { v };
        let fix16 = |v: u16| if little_endian { v.swap_bytes() } else { v };

        let version = fix32(reader.read_u32()?);
        if version != APPLE_SINGLE_VERSION_2 {
            return Err(Error::Unsupported(format!(
                "unknown version {}",
                version as f64 / 65536.0
            )));
        }
        reader.skip(16)?;

        let count = fix16(reader.read_u16()?);
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let id = fix32(reader.read_u32()?);
            let offset = fix32(reader.read_u32()?) as usize;
            let length = fix32(reader.read_u32()?) as usize;
            read_slice(&data, offset, length)?;
            entries.entry(id).or_insert_with(|| data.slice(offset..offset + length));
        }
        log::debug!(
            "{:?} container with {} entries{}",
            kind,
            entries.len(),
            if little_endian { " (byte-swapped)" } else { "" }
        );

        Ok(Self {
            kind,
            little_endian,
            entries,
        })
    }

    pub fn kind(&self) -> AppleContainerKind {
        self.kind
    }

    /// True if the header was stored byte-swapped
    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    pub fn entry(&self, id: u32) -> Result<&Bytes> {
        self.entries
            .get(&id)
            .ok_or_else(|| Error::ComponentNotFound(format!("no such id '{}'", id)))
    }

    /// The embedded resource fork (entry 2).
    pub fn resource_fork(&self) -> Result<&Bytes> {
        self.entry(ENTRY_RESOURCE_FORK)
    }

    pub fn data_fork(&self) -> Result<&Bytes> {
        self.entry(ENTRY_DATA_FORK)
    }

    /// The original file name (entry 3), decoded from MacRoman.
    pub fn real_name(&self) -> Result<String> {
        Ok(decode_mac_text(self.entry(ENTRY_REAL_NAME)?))
    }

    /// Entry ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(magic: u32, version: u32, entries: &[(u32, &[u8])], swap: bool) -> Vec<u8> {
        let fix32 = |v: u32| if swap { v.swap_bytes() } else { v };
        let mut out = Vec::new();
        out.extend_from_slice(&magic.to_be_bytes());
        out.extend_from_slice(&fix32(version).to_be_bytes());
        out.extend_from_slice(&[0; 16]);
        let count = entries.len() as u16;
        out.extend_from_slice(&(if swap { count.swap_bytes() } else { count }).to_be_bytes());

        let mut offset = out.len() + entries.len() * 12;
        for (id, body) in entries {
            out.extend_from_slice(&fix32(*id).to_be_bytes());
            out.extend_from_slice(&fix32(offset as u32).to_be_bytes());
            out.extend_from_slice(&fix32(body.len() as u32).to_be_bytes());
            offset += body.len();
        }
        for (_, body) in entries {
            out.extend_from_slice(body);
        }
        out
    }

    #[test]
    fn test_apple_single() {
        let data = container(
            APPLE_SINGLE_MAGIC,
            APPLE_SINGLE_VERSION_2,
            &[(ENTRY_REAL_NAME, &b"Icon"[..]), (ENTRY_RESOURCE_FORK, &b"rsrc"[..])],
            false,
        );
        let file = AppleSingle::parse(Bytes::from(data)).unwrap();
        assert_eq!(file.kind(), AppleContainerKind::Single);
        assert!(!file.is_little_endian());
        assert_eq!(file.resource_fork().unwrap().as_ref(), b"rsrc");
        assert_eq!(file.real_name().unwrap(), "Icon");
        assert_eq!(file.ids().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_byte_swapped_apple_double() {
        let data = container(
            APPLE_DOUBLE_MAGIC.swap_bytes(),
            APPLE_SINGLE_VERSION_2,
            &[(ENTRY_RESOURCE_FORK, &b"fork-bytes"[..])],
            true,
        );
        let file = AppleSingle::parse(Bytes::from(data)).unwrap();
        assert_eq!(file.kind(), AppleContainerKind::Double);
        assert!(file.is_little_endian());
        assert_eq!(file.resource_fork().unwrap().as_ref(), b"fork-bytes");
    }

    #[test]
    fn test_bad_magic() {
        let data = container(0x1234_5678, APPLE_SINGLE_VERSION_2, &[], false);
        let err = AppleSingle::parse(Bytes::from(data)).unwrap_err();
        assert!(err.to_string().contains("invalid magic number 0x12345678"));
    }

    #[test]
    fn test_unknown_version() {
        let data = container(APPLE_SINGLE_MAGIC, 0x0001_0000, &[], false);
        let err = AppleSingle::parse(Bytes::from(data)).unwrap_err();
        assert!(matches!(err, Error::Unsupported(ref m) if m == "unknown version 1"));
    }

    #[test]
    fn test_missing_entry() {
        let data = container(
            APPLE_SINGLE_MAGIC,
            APPLE_SINGLE_VERSION_2,
            &[(ENTRY_DATA_FORK, &b"data"[..])],
            false,
        );
        let file = AppleSingle::parse(Bytes::from(data)).unwrap();
        assert_eq!(file.data_fork().unwrap().as_ref(), b"data");
        assert!(matches!(file.resource_fork(), Err(Error::ComponentNotFound(_))));
        assert!(file.real_name().is_err());
    }

    #[test]
    fn test_entry_out_of_bounds() {
        let mut data = container(APPLE_SINGLE_MAGIC, APPLE_SINGLE_VERSION_2, &[(2, &b"abcd"[..])], false);
        data.truncate(data.len() - 2);
        assert!(matches!(
            AppleSingle::parse(Bytes::from(data)),
            Err(Error::Truncated { .. })
        ));
    }
}
