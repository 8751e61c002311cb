//! Color lookup tables ('clut' resources and inline pixmap tables).
//!
//! A table maps small integer ids to 48-bit RGB colors. Ids are stored with
//! each entry and need not match the entry's position, so the table is kept
//! as an id-keyed map.

use super::raster::AlphaColor;
use crate::common::error::{Error, Result};
use crate::common::BeReader;
#[cfg(feature = "json")]
use serde::Serialize;
use std::collections::BTreeMap;

/// RGB color with 16 bits per channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize))]
pub struct RgbColor {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl RgbColor {
    pub fn read(reader: &mut BeReader<'_>) -> Result<Self> {
        Ok(Self {
            red: reader.read_u16()?,
            green: reader.read_u16()?,
            blue: reader.read_u16()?,
        })
    }

    /// Opaque 8-bit color keeping the high byte of each channel.
    #[inline]
    pub fn to_alpha(self) -> AlphaColor {
        AlphaColor::rgb((self.red >> 8) as u8, (self.green >> 8) as u8, (self.blue >> 8) as u8)
    }
}

/// One table entry as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpec {
    pub id: u16,
    pub rgb: RgbColor,
}

/// What to do when an indexed pixel has no entry in its color table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingColorPolicy {
    /// Abort the decode with [`Error::MissingColor`]
    #[default]
    Error,
    /// Resolve the pixel to transparent black
    Transparent,
}

/// `flags` bit marking a device table, whose entries are addressed by position
pub const DEVICE_TABLE: u16 = 0x8000;

/// Color table header and entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    pub seed: u32,
    pub flags: u16,
    /// Entry count minus one, as stored
    pub size: u16,
    entries: BTreeMap<u16, RgbColor>,
}

impl ColorTable {
    /// Read a table header followed by `size + 1` entries.
    ///
    /// Device tables key entries by position and ignore the stored ids;
    /// other tables key by stored id, a repeated id replacing the earlier entry.
    pub fn read(reader: &mut BeReader<'_>) -> Result<Self> {
        let seed = reader.read_u32()?;
        let flags = reader.read_u16()?;
        let size = reader.read_u16()?;

        let mut entries = BTreeMap::new();
        for index in 0..=size as u32 {
            let stored_id = reader.read_u16()?;
            let rgb = RgbColor::read(reader)?;
            let id = if flags & DEVICE_TABLE != 0 {
                index as u16
            } else {
                stored_id
            };
            entries.insert(id, rgb);
        }

        log::trace!("color table: seed {seed:#010x}, {} entries", size as u32 + 1);
        Ok(Self {
            seed,
            flags,
            size,
            entries,
        })
    }

    /// Parse a standalone 'clut' resource, which must contain nothing else.
    pub fn parse_resource(data: &[u8]) -> Result<Self> {
        let mut reader = BeReader::new(data);
        let table = Self::read(&mut reader)?;
        if !reader.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "{} extra bytes at end of 'clut' resource",
                reader.remaining()
            )));
        }
        Ok(table)
    }

    pub fn lookup(&self, id: u16) -> Option<RgbColor> {
        self.entries.get(&id).copied()
    }

    /// Resolve an indexed pixel value under the given policy.
    #[inline]
    pub fn resolve(&self, id: u16, policy: MissingColorPolicy) -> Result<AlphaColor> {
        match (self.lookup(id), policy) {
            (Some(rgb), _) => Ok(rgb.to_alpha()),
            (None, MissingColorPolicy::Transparent) => Ok(AlphaColor::TRANSPARENT),
            (None, MissingColorPolicy::Error) => Err(Error::MissingColor(id)),
        }
    }

    /// Entries in ascending id order.
    pub fn specs(&self) -> impl Iterator<Item = ColorSpec> + '_ {
        self.entries.iter().map(|(&id, &rgb)| ColorSpec { id, rgb })
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON object keyed by id, with 16-bit channel values.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}
