//! Resource fork reader.
//!
//! A resource fork starts with a 16-byte header locating the resource data
//! section and the resource map. The map lists resource types, each with a
//! list of 12-byte references giving the resource id, an optional name and
//! the offset of the resource's length-prefixed data.
//!
//! All slicing is zero-copy: resource data is returned as [`Bytes`] views
//! into the fork passed to [`ResourceFork::parse`].

use crate::common::binary::{read_i16_be, read_slice, read_u16_be, read_u32_be};
use crate::common::encoding::{decode_mac_roman, decode_mac_text};
use crate::common::error::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

/// Offset of the type list offset within the map
const MAP_TYPE_LIST_OFFSET: usize = 24;
/// Offset of the name list offset within the map
const MAP_NAME_LIST_OFFSET: usize = 26;
/// Offset of the stored type count (minus one) within the map
const MAP_TYPE_COUNT: usize = 28;

const TYPE_RECORD_LEN: usize = 8;
const REFERENCE_LEN: usize = 12;

/// Name offset of an unnamed resource
const NO_NAME: u16 = 0xFFFF;
/// The low three bytes of a reference's packed attributes/offset word
const DATA_OFFSET_MASK: u32 = 0x00FF_FFFF;

/// Bounds-checked zero-copy subslice.
fn sub(data: &Bytes, offset: usize, len: usize) -> Result<Bytes> {
    read_slice(data, offset, len)?;
    Ok(data.slice(offset..offset + len))
}

/// Bounds-checked zero-copy tail starting at `offset`.
fn tail(data: &Bytes, offset: usize) -> Result<Bytes> {
    if offset > data.len() {
        return Err(Error::Truncated {
            needed: offset,
            available: data.len(),
        });
    }
    Ok(data.slice(offset..))
}

/// A single resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    id: i16,
    name: Option<String>,
    attributes: u8,
    data: Bytes,
}

impl ResourceEntry {
    fn parse(refs: &[u8], index: usize, names: &[u8], resources: &Bytes) -> Result<Self> {
        let base = index * REFERENCE_LEN;
        let id = read_i16_be(refs, base)?;
        let name_offset = read_u16_be(refs, base + 2)?;
        let packed = read_u32_be(refs, base + 4)?;
        let attributes = (packed >> 24) as u8;
        let data_offset = (packed & DATA_OFFSET_MASK) as usize;

        let name = if name_offset == NO_NAME {
            None
        } else {
            let offset = name_offset as usize;
            let len = *names.get(offset).ok_or(Error::Truncated {
                needed: offset + 1,
                available: names.len(),
            })? as usize;
            Some(decode_mac_text(read_slice(names, offset + 1, len)?))
        };

        let size = read_u32_be(resources, data_offset)? as usize;
        let data = sub(resources, data_offset + 4, size)?;

        Ok(Self {
            id,
            name,
            attributes,
            data,
        })
    }

    pub fn id(&self) -> i16 {
        self.id
    }

    /// Resource name, decoded from MacRoman with CR line endings replaced by LF
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attribute byte (system heap, purgeable, locked, protected, preload, changed)
    pub fn attributes(&self) -> u8 {
        self.attributes
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// All resources of one four-character type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    code: String,
    entries: BTreeMap<i16, ResourceEntry>,
}

impl ResourceType {
    fn parse(type_list: &Bytes, index: usize, names: &[u8], resources: &Bytes) -> Result<Self> {
        let record = 2 + index * TYPE_RECORD_LEN;
        let code = decode_mac_roman(read_slice(type_list, record, 4)?).into_owned();
        let count = read_u16_be(type_list, record + 4)?.wrapping_add(1);
        let refs_offset = read_u16_be(type_list, record + 6)? as usize;
        let refs = tail(type_list, refs_offset)?;

        let mut entries = BTreeMap::new();
        for i in 0..count as usize {
            let entry = ResourceEntry::parse(&refs, i, names, resources)?;
            // The first reference to an id wins.
            entries.entry(entry.id).or_insert(entry);
        }
        log::debug!("resource type '{}': {} entries", code, entries.len());
        Ok(Self { code, entries })
    }

    /// Four-character type code, decoded from MacRoman
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn get(&self, id: i16) -> Result<&ResourceEntry> {
        self.entries.get(&id).ok_or_else(|| {
            Error::ComponentNotFound(format!("no such resource entry '{}' {}", self.code, id))
        })
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed resource fork
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFork {
    types: BTreeMap<String, ResourceType>,
}

impl ResourceFork {
    /// Parse a resource fork. Resource data stays shared with `data`.
    pub fn parse(data: Bytes) -> Result<Self> {
        let data_offset = read_u32_be(&data, 0)? as usize;
        let map_offset = read_u32_be(&data, 4)? as usize;
        let data_length = read_u32_be(&data, 8)? as usize;
        let map_length = read_u32_be(&data, 12)? as usize;

        let map = sub(&data, map_offset, map_length)?;
        let resources = sub(&data, data_offset, data_length)?;

        let type_list_offset = read_u16_be(&map, MAP_TYPE_LIST_OFFSET)? as usize;
        let name_list_offset = read_u16_be(&map, MAP_NAME_LIST_OFFSET)? as usize;
        let type_count = read_u16_be(&map, MAP_TYPE_COUNT)?.wrapping_add(1);

        let type_list = tail(&map, type_list_offset)?;
        let names = tail(&map, name_list_offset)?;

        let mut types = BTreeMap::new();
        for index in 0..type_count as usize {
            let resource_type = ResourceType::parse(&type_list, index, &names, &resources)?;
            match types.entry(resource_type.code.clone()) {
                Entry::Occupied(_) => {
                    return Err(Error::InvalidFormat(format!(
                        "duplicate resource type in resource fork '{}'",
                        resource_type.code
                    )));
                },
                Entry::Vacant(slot) => {
                    slot.insert(resource_type);
                },
            }
        }
        Ok(Self { types })
    }

    /// Read and parse a resource fork stored as a plain file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(Bytes::from(std::fs::read(path)?))
    }

    pub fn get_type(&self, code: &str) -> Result<&ResourceType> {
        self.types
            .get(code)
            .ok_or_else(|| Error::ComponentNotFound(format!("no such resource type '{}'", code)))
    }

    /// Look up a resource by type code and id.
    pub fn get(&self, code: &str, id: i16) -> Result<&ResourceEntry> {
        self.get_type(code)?.get(id)
    }

    /// Types in ascending code order.
    pub fn types(&self) -> impl Iterator<Item = &ResourceType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct TestResource<'a> {
        pub id: i16,
        pub name: Option<&'a [u8]>,
        pub data: &'a [u8],
    }

    /// Lay out a resource fork: header, data section, then the map.
    pub(crate) fn build_fork(types: &[(&[u8; 4], Vec<TestResource<'_>>)]) -> Vec<u8> {
        let mut data_section = Vec::new();
        let mut type_records = Vec::new();
        let mut refs = Vec::new();
        let mut names = Vec::new();

        let refs_start = 2 + types.len() * TYPE_RECORD_LEN;
        for (code, resources) in types {
            type_records.extend_from_slice(&code[..]);
            type_records.extend_from_slice(&(resources.len() as u16).wrapping_sub(1).to_be_bytes());
            type_records.extend_from_slice(&((refs_start + refs.len()) as u16).to_be_bytes());
            for resource in resources {
                refs.extend_from_slice(&resource.id.to_be_bytes());
                match resource.name {
                    Some(name) => {
                        refs.extend_from_slice(&(names.len() as u16).to_be_bytes());
                        names.push(name.len() as u8);
                        names.extend_from_slice(name);
                    },
                    None => refs.extend_from_slice(&NO_NAME.to_be_bytes()),
                }
                let packed = 0x2000_0000u32 | data_section.len() as u32;
                refs.extend_from_slice(&packed.to_be_bytes());
                refs.extend_from_slice(&[0; 4]);
                data_section.extend_from_slice(&(resource.data.len() as u32).to_be_bytes());
                data_section.extend_from_slice(resource.data);
            }
        }

        let mut map = vec![0u8; 24];
        let type_list_len = 2 + type_records.len() + refs.len();
        map.extend_from_slice(&28u16.to_be_bytes());
        map.extend_from_slice(&((28 + type_list_len) as u16).to_be_bytes());
        map.extend_from_slice(&(types.len() as u16).wrapping_sub(1).to_be_bytes());
        map.extend_from_slice(&type_records);
        map.extend_from_slice(&refs);
        map.extend_from_slice(&names);

        let mut fork = Vec::new();
        fork.extend_from_slice(&16u32.to_be_bytes());
        fork.extend_from_slice(&((16 + data_section.len()) as u32).to_be_bytes());
        fork.extend_from_slice(&(data_section.len() as u32).to_be_bytes());
        fork.extend_from_slice(&(map.len() as u32).to_be_bytes());
        fork.extend_from_slice(&data_section);
        fork.extend_from_slice(&map);
        fork
    }

    fn sample() -> ResourceFork {
        let fork = build_fork(&[
            (
                b"PICT",
                vec![
                    TestResource { id: 129, name: Some(&b"Splash\rScreen"[..]), data: b"pict-129" },
                    TestResource { id: -4, name: None, data: b"" },
                ],
            ),
            (b"clut", vec![TestResource { id: 0, name: Some(&b"caf\x8e"[..]), data: b"\x01\x02" }]),
        ]);
        ResourceFork::parse(Bytes::from(fork)).unwrap()
    }

    #[test]
    fn test_lookup() {
        let fork = sample();
        assert_eq!(fork.len(), 2);
        let entry = fork.get("PICT", 129).unwrap();
        assert_eq!(entry.data().as_ref(), b"pict-129");
        assert_eq!(entry.name(), Some("Splash\nScreen"));
        assert_eq!(entry.attributes(), 0x20);
        assert_eq!(fork.get("clut", 0).unwrap().name(), Some("café"));
    }

    #[test]
    fn test_iteration_order() {
        let fork = sample();
        let codes: Vec<&str> = fork.types().map(|t| t.code()).collect();
        assert_eq!(codes, vec!["PICT", "clut"]);
        let ids: Vec<i16> = fork.get_type("PICT").unwrap().entries().map(|e| e.id()).collect();
        assert_eq!(ids, vec![-4, 129]);
    }

    #[test]
    fn test_unnamed_empty_resource() {
        let fork = sample();
        let entry = fork.get("PICT", -4).unwrap();
        assert_eq!(entry.name(), None);
        assert!(entry.data().is_empty());
    }

    #[test]
    fn test_missing_components() {
        let fork = sample();
        assert!(matches!(fork.get("snd ", 1), Err(Error::ComponentNotFound(_))));
        let err = fork.get("PICT", 1).unwrap_err();
        assert!(err.to_string().contains("no such resource entry 'PICT' 1"));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let fork = build_fork(&[
            (b"STR ", vec![TestResource { id: 1, name: None, data: b"a" }]),
            (b"STR ", vec![TestResource { id: 2, name: None, data: b"b" }]),
        ]);
        let err = ResourceFork::parse(Bytes::from(fork)).unwrap_err();
        assert!(err.to_string().contains("duplicate resource type"));
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let fork = build_fork(&[(
            b"STR ",
            vec![
                TestResource { id: 7, name: None, data: b"first" },
                TestResource { id: 7, name: None, data: b"second" },
            ],
        )]);
        let fork = ResourceFork::parse(Bytes::from(fork)).unwrap();
        assert_eq!(fork.get("STR ", 7).unwrap().data().as_ref(), b"first");
    }

    #[test]
    fn test_truncated_fork() {
        let mut fork = build_fork(&[(b"PICT", vec![TestResource { id: 1, name: None, data: b"x" }])]);
        fork.truncate(fork.len() - 1);
        assert!(matches!(
            ResourceFork::parse(Bytes::from(fork)),
            Err(Error::Truncated { .. })
        ));
        assert!(ResourceFork::parse(Bytes::from_static(&[0; 8])).is_err());
    }

    #[test]
    fn test_data_is_shared() {
        let raw = Bytes::from(build_fork(&[(
            b"PICT",
            vec![TestResource { id: 1, name: None, data: b"shared" }],
        )]));
        let fork = ResourceFork::parse(raw.clone()).unwrap();
        let data = fork.get("PICT", 1).unwrap().data();
        let start = data.as_ptr() as usize - raw.as_ptr() as usize;
        assert_eq!(&raw[start..start + data.len()], b"shared");
    }
}
