//! Resource containers.
//!
//! Resource forks map `(type, id)` pairs to byte ranges. On modern systems a
//! fork is usually found either as a raw `..namedfork/rsrc` dump or wrapped in
//! an AppleSingle/AppleDouble file; [`load_resource_fork`] accepts both.

pub mod apple_single;
pub mod fork;

pub use apple_single::{AppleContainerKind, AppleSingle};
pub use fork::{ResourceEntry, ResourceFork, ResourceType};

use crate::common::binary::read_u32_be;
use crate::common::error::Result;
use apple_single::{APPLE_DOUBLE_MAGIC, APPLE_SINGLE_MAGIC};
use bytes::Bytes;

/// True if `data` starts with an AppleSingle or AppleDouble magic number,
/// in either byte order.
pub fn is_apple_single(data: &[u8]) -> bool {
    matches!(read_u32_be(data, 0), Ok(magic) if [
        APPLE_SINGLE_MAGIC,
        APPLE_DOUBLE_MAGIC,
        APPLE_SINGLE_MAGIC.swap_bytes(),
        APPLE_DOUBLE_MAGIC.swap_bytes(),
    ]
    .contains(&magic))
}

/// Parse a resource fork, unwrapping an AppleSingle/AppleDouble envelope first if present.
pub fn load_resource_fork(data: Bytes) -> Result<ResourceFork> {
    if is_apple_single(&data) {
        let container = AppleSingle::parse(data)?;
        return ResourceFork::parse(container.resource_fork()?.clone());
    }
    ResourceFork::parse(data)
}
