//! Device-assigned identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for one object (file or directory) on a device
///
/// Handles are assigned by the device and are only meaningful within the
/// storage container that produced them. Two reserved values exist:
/// [`Handle::UNSPECIFIED`] asks an operation to resolve the object from a path
/// instead, and [`Handle::ROOT`] names the top of a container's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u32);

impl Handle {
    /// "No handle given, resolve from the path"
    pub const UNSPECIFIED: Handle = Handle(0);

    /// The container root. Never returned by child enumeration.
    pub const ROOT: Handle = Handle(0xFFFF_FFFF);

    /// Creates a handle from its raw device value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw device value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns true for the "resolve from path" placeholder
    pub const fn is_unspecified(&self) -> bool {
        self.0 == Self::UNSPECIFIED.0
    }

    /// Returns true for the container root
    pub const fn is_root(&self) -> bool {
        self.0 == Self::ROOT.0
    }
}

impl From<u32> for Handle {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "Handle(root)")
        } else {
            write!(f, "Handle({})", self.0)
        }
    }
}

/// Identifier for one storage unit on a device
///
/// Every resolution, listing and mutation is scoped to exactly one storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageId(u32);

impl StorageId {
    /// Creates a storage ID from its raw device value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw device value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for StorageId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Storage({:#010x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_handles() {
        assert!(Handle::UNSPECIFIED.is_unspecified());
        assert!(!Handle::UNSPECIFIED.is_root());
        assert!(Handle::ROOT.is_root());
        assert!(!Handle::ROOT.is_unspecified());
        assert_ne!(Handle::ROOT, Handle::UNSPECIFIED);
    }

    #[test]
    fn test_handle_round_trip_raw() {
        let handle = Handle::new(42);
        assert_eq!(handle.as_u32(), 42);
        assert_eq!(Handle::from(42), handle);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(format!("{}", Handle::new(7)), "Handle(7)");
        assert_eq!(format!("{}", Handle::ROOT), "Handle(root)");
    }

    #[test]
    fn test_storage_id_display() {
        let id = StorageId::new(0x0001_0001);
        assert_eq!(format!("{}", id), "Storage(0x00010001)");
    }

    #[test]
    fn test_handle_serializes_as_raw_value() {
        let json = serde_json::to_string(&Handle::new(12)).unwrap();
        assert_eq!(json, "12");
    }
}
