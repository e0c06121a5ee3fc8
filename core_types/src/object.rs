//! Raw object attributes as reported by a device

use crate::{Handle, StorageId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline size value meaning "ask the device for the size separately"
///
/// Devices report sizes as 32-bit values; anything that does not fit is
/// flagged with this sentinel and must be fetched with a dedicated size query.
pub const SIZE_QUERY_SENTINEL: u32 = 0xFFFF_FFFF;

/// The two kinds of object a device exposes
///
/// Only directories support child enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Leaf object holding bytes
    File,
    /// Container object that may have children
    Directory,
}

impl ObjectKind {
    /// Returns true for directories
    pub fn is_dir(&self) -> bool {
        matches!(self, ObjectKind::Directory)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::File => write!(f, "File"),
            ObjectKind::Directory => write!(f, "Directory"),
        }
    }
}

/// Attributes fetched from the device for one handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Storage the object lives on
    pub storage: StorageId,
    /// Base name as reported by the device
    pub name: String,
    /// Parent handle ([`Handle::ROOT`] for top-level objects)
    pub parent: Handle,
    /// File or directory
    pub kind: ObjectKind,
    /// Last modification time, seconds since the Unix epoch
    pub modified_at: u64,
    /// Inline size, or [`SIZE_QUERY_SENTINEL`]
    pub compressed_size: u32,
}

impl ObjectMetadata {
    /// Returns the inline size, or `None` when the size must be queried
    pub fn inline_size(&self) -> Option<u64> {
        if self.compressed_size == SIZE_QUERY_SENTINEL {
            None
        } else {
            Some(u64::from(self.compressed_size))
        }
    }

    /// Returns true for directories
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Description of one storage container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    /// Storage identifier
    pub id: StorageId,
    /// Human readable label ("Internal shared storage", "SD card", ...)
    pub description: String,
    /// Total capacity in bytes
    pub max_capacity: u64,
    /// Free space in bytes
    pub free_space: u64,
}
