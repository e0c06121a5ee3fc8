//! Derived, path-aware view of a device object
//!
//! The device only reports a name and a parent handle. [`FileInfo`] adds the
//! path context the caller resolved, so it can be handed to code that thinks
//! in paths.

use crate::extension::extension_of;
use crate::path::{join, normalize, ROOT_PATH};
use core_types::{Handle, ObjectMetadata};
use serde::{Deserialize, Serialize};

/// Path-decorated metadata for one object
///
/// `full_path` is always `join(parent_path, name)` and directories always
/// have an empty `extension`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Object handle
    pub handle: Handle,
    /// Handle of the parent object
    pub parent_handle: Handle,
    /// Normalized absolute path of the object
    pub full_path: String,
    /// Normalized absolute path of the parent
    pub parent_path: String,
    /// Base name
    pub name: String,
    /// Extension derived from `name` (empty for directories)
    pub extension: String,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Directory flag
    pub is_dir: bool,
    /// Last modification time, seconds since the Unix epoch
    pub modified_at: u64,
}

impl FileInfo {
    /// Builds a file info from device metadata and the caller's path context
    ///
    /// `size` is passed separately because it may have come from a secondary
    /// size query rather than the inline metadata field.
    pub fn from_metadata(
        handle: Handle,
        metadata: &ObjectMetadata,
        parent_path: &str,
        size: u64,
    ) -> Self {
        let parent_path = normalize(parent_path);
        let is_dir = metadata.is_dir();

        Self {
            handle,
            parent_handle: metadata.parent,
            full_path: join(&parent_path, &metadata.name),
            parent_path,
            name: metadata.name.clone(),
            extension: extension_of(&metadata.name, is_dir),
            size: if is_dir { 0 } else { size },
            is_dir,
            modified_at: metadata.modified_at,
        }
    }

    /// Synthesized entry for the container root, which has no device object
    pub fn root() -> Self {
        Self {
            handle: Handle::ROOT,
            parent_handle: Handle::ROOT,
            full_path: ROOT_PATH.to_string(),
            parent_path: ROOT_PATH.to_string(),
            name: String::new(),
            extension: String::new(),
            size: 0,
            is_dir: true,
            modified_at: 0,
        }
    }

    /// Returns true for dot-files
    pub fn is_hidden(&self) -> bool {
        crate::path::is_hidden_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ObjectKind, StorageId};

    fn metadata(name: &str, kind: ObjectKind) -> ObjectMetadata {
        ObjectMetadata {
            storage: StorageId::new(1),
            name: name.to_string(),
            parent: Handle::new(5),
            kind,
            modified_at: 1_700_000_000,
            compressed_size: 10,
        }
    }

    #[test]
    fn test_file_info_paths() {
        let info = FileInfo::from_metadata(
            Handle::new(9),
            &metadata("a.txt", ObjectKind::File),
            "x/",
            10,
        );

        assert_eq!(info.handle, Handle::new(9));
        assert_eq!(info.parent_handle, Handle::new(5));
        assert_eq!(info.parent_path, "/x");
        assert_eq!(info.full_path, "/x/a.txt");
        assert_eq!(info.extension, "txt");
        assert_eq!(info.size, 10);
        assert!(!info.is_dir);
    }

    #[test]
    fn test_file_info_under_root() {
        let info = FileInfo::from_metadata(
            Handle::new(2),
            &metadata("DCIM", ObjectKind::Directory),
            "",
            0,
        );

        assert_eq!(info.parent_path, "/");
        assert_eq!(info.full_path, "/DCIM");
    }

    #[test]
    fn test_directory_has_no_extension_or_size() {
        let info = FileInfo::from_metadata(
            Handle::new(3),
            &metadata("backup.tar.gz", ObjectKind::Directory),
            "/",
            4096,
        );

        assert!(info.is_dir);
        assert_eq!(info.extension, "");
        assert_eq!(info.size, 0);
    }

    #[test]
    fn test_root_info() {
        let root = FileInfo::root();
        assert_eq!(root.handle, Handle::ROOT);
        assert_eq!(root.full_path, "/");
        assert!(root.is_dir);
    }

    #[test]
    fn test_hidden() {
        let info = FileInfo::from_metadata(
            Handle::new(4),
            &metadata(".nomedia", ObjectKind::File),
            "/",
            0,
        );
        assert!(info.is_hidden());
        assert_eq!(info.extension, "nomedia");
    }

    #[test]
    fn test_serializes_to_json() {
        let info = FileInfo::root();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["full_path"], "/");
        assert_eq!(json["is_dir"], true);
    }
}
