//! Filesystem View Service implementation
//!
//! This module provides the actual service that implements filesystem
//! operations on top of an [`ObjectTransport`].

use crate::config::FsViewConfig;
use crate::operations::{FileSystemOperations, OperationError, WalkControl, WalkSummary};
use core_types::{Handle, ObjectMetadata, StorageId, StorageInfo};
use device_transport::ObjectTransport;
use fs_view::{path, FileInfo};
use log::{debug, warn};
use std::collections::HashSet;

/// The Filesystem View Service
///
/// Owns one device session. All path semantics live here; the device only
/// ever sees handle-level primitives.
#[derive(Debug)]
pub struct FsViewService<T: ObjectTransport> {
    pub(crate) transport: T,
    pub(crate) config: FsViewConfig,
}

impl<T: ObjectTransport> FsViewService<T> {
    /// Creates a service with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, FsViewConfig::default())
    }

    /// Creates a service with an explicit configuration
    pub fn with_config(transport: T, config: FsViewConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &FsViewConfig {
        &self.config
    }

    /// Gets the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets mutable access to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the service and returns the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Lists the storages of the device
    pub fn fetch_storages(&mut self) -> Result<Vec<StorageInfo>, OperationError> {
        let storages = self
            .transport
            .storages()
            .map_err(OperationError::StorageInfo)?;

        if storages.is_empty() {
            return Err(OperationError::NoStorage);
        }
        Ok(storages)
    }

    /// Fetches one object and decorates it with `parent_path`
    ///
    /// Issues the secondary size query when the inline size is the sentinel;
    /// a failure there is reported like a metadata failure.
    pub fn fetch_file_info(
        &mut self,
        handle: Handle,
        parent_path: &str,
    ) -> Result<FileInfo, OperationError> {
        let metadata = self.metadata(handle)?;
        let size = self.size_of(handle, &metadata)?;
        Ok(FileInfo::from_metadata(handle, &metadata, parent_path, size))
    }

    /// Probes for an object, swallowing every error
    ///
    /// With a handle, `path` only serves as the path context of the result;
    /// without one, the object is resolved from `path`.
    pub fn file_exists(
        &mut self,
        storage: StorageId,
        handle: Handle,
        path: &str,
    ) -> Option<FileInfo> {
        let found = if handle.is_unspecified() {
            self.resolve_to_info(storage, path)
        } else if handle.is_root() {
            Ok(FileInfo::root())
        } else if path.is_empty() {
            self.metadata(handle)
                .and_then(|metadata| self.path_of(metadata.parent))
                .and_then(|parent_path| self.fetch_file_info(handle, &parent_path))
        } else {
            self.fetch_file_info(handle, &path::parent_of(path))
        };

        match found {
            Ok(info) => Some(info),
            Err(err) => {
                debug!("{:?} (handle {}) does not exist: {}", path, handle, err);
                None
            }
        }
    }

    /// Reverse resolution: builds the absolute path of a handle
    ///
    /// Follows parent links up to the root. Devices that report `0` as the
    /// parent of top-level objects are handled like [`Handle::ROOT`]. A parent
    /// chain that loops has no path and yields `InvalidPath`.
    pub fn path_of(&mut self, handle: Handle) -> Result<String, OperationError> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = handle;

        while !current.is_root() && !current.is_unspecified() {
            if !seen.insert(current) {
                return Err(OperationError::InvalidPath(format!(
                    "parent chain of {} loops at {}",
                    handle, current
                )));
            }
            let metadata = self.metadata(current)?;
            names.push(metadata.name);
            current = metadata.parent;
        }

        names.reverse();
        Ok(path::normalize(&names.join("/")))
    }

    pub(crate) fn metadata(&mut self, handle: Handle) -> Result<ObjectMetadata, OperationError> {
        self.transport
            .object_metadata(handle)
            .map_err(|source| OperationError::ObjectMetadata { handle, source })
    }

    pub(crate) fn children(
        &mut self,
        storage: StorageId,
        parent: Handle,
    ) -> Result<Vec<Handle>, OperationError> {
        self.transport
            .list_children(storage, parent)
            .map_err(|source| OperationError::ListDirectory {
                handle: parent,
                source,
            })
    }

    fn size_of(&mut self, handle: Handle, metadata: &ObjectMetadata) -> Result<u64, OperationError> {
        if metadata.is_dir() {
            return Ok(0);
        }
        match metadata.inline_size() {
            Some(size) => Ok(size),
            None => self
                .transport
                .object_size(handle)
                .map_err(|source| OperationError::ObjectMetadata { handle, source }),
        }
    }

    /// Builds a [`FileInfo`] for every child, skipping the ones that fail
    ///
    /// Lossy on partial failure: a child whose metadata or size cannot be
    /// fetched is logged and left out; the rest of the listing goes on.
    /// This includes files whose inline size is the sentinel and whose
    /// secondary size query fails: such a file is missing from the result
    /// rather than reported with a guessed size.
    pub(crate) fn collect_best_effort(
        &mut self,
        children: Vec<Handle>,
        parent_path: &str,
    ) -> Vec<FileInfo> {
        children
            .into_iter()
            .filter_map(|child| match self.fetch_file_info(child, parent_path) {
                Ok(info) => Some(info),
                Err(err) => {
                    warn!("skipping {} under {:?}: {}", child, parent_path, err);
                    None
                }
            })
            .collect()
    }

    /// Scans the children of `parent` for an exact (case-sensitive) name match
    ///
    /// First match wins; devices may hold duplicates and their order is
    /// unspecified.
    fn find_child(
        &mut self,
        storage: StorageId,
        parent: Handle,
        name: &str,
    ) -> Result<Option<(Handle, ObjectMetadata)>, OperationError> {
        for child in self.children(storage, parent)? {
            let metadata = self.metadata(child)?;
            if metadata.name == name {
                return Ok(Some((child, metadata)));
            }
        }
        Ok(None)
    }

    /// Resolves a path, also returning the target's metadata (`None` for root)
    fn resolve_entry(
        &mut self,
        storage: StorageId,
        full_path: &str,
    ) -> Result<(Handle, Option<ObjectMetadata>), OperationError> {
        if path::is_root(full_path) {
            return Ok((Handle::ROOT, None));
        }

        debug!("resolving {:?} on {}", full_path, storage);

        let segments = path::segments(full_path);
        let mut current = (Handle::ROOT, None);

        for (idx, segment) in segments.iter().enumerate() {
            let (handle, metadata) = self
                .find_child(storage, current.0, segment)?
                .ok_or_else(|| OperationError::InvalidPath(full_path.to_string()))?;

            let more_segments = idx + 1 < segments.len();
            if more_segments && !metadata.is_dir() {
                return Err(OperationError::InvalidPath(full_path.to_string()));
            }

            current = (handle, Some(metadata));
        }
        Ok(current)
    }

    /// Locates a directory by handle or, when the handle is unspecified, by path
    ///
    /// An explicit handle the device rejects is a metadata failure; a target
    /// that is a file is an invalid path.
    pub(crate) fn directory_handle(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
    ) -> Result<Handle, OperationError> {
        if handle.is_root() {
            return Ok(Handle::ROOT);
        }

        let (dir, metadata) = if handle.is_unspecified() {
            self.resolve_entry(storage, full_path)?
        } else {
            (handle, Some(self.metadata(handle)?))
        };

        match metadata {
            Some(metadata) if !metadata.is_dir() => Err(OperationError::InvalidPath(
                describe(handle, full_path),
            )),
            _ => Ok(dir),
        }
    }

    /// Path used as the parent of listed entries
    ///
    /// An explicit handle without a path is reverse resolved.
    pub(crate) fn base_path(
        &mut self,
        handle: Handle,
        full_path: &str,
    ) -> Result<String, OperationError> {
        if full_path.is_empty() && !handle.is_unspecified() {
            self.path_of(handle)
        } else {
            Ok(path::normalize(full_path))
        }
    }

    /// Locates an existing non-root target for delete/rename
    ///
    /// `Ok(None)` means the target does not exist.
    fn existing_target(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
    ) -> Result<Option<Handle>, OperationError> {
        let target = if handle.is_unspecified() {
            match self.resolve(storage, full_path) {
                Ok(target) => target,
                Err(OperationError::InvalidPath(_)) => return Ok(None),
                Err(err) => return Err(err),
            }
        } else {
            handle
        };

        if target.is_root() {
            return Err(OperationError::InvalidPath(format!(
                "{}: the storage root cannot be modified",
                describe(handle, full_path)
            )));
        }

        if !handle.is_unspecified() {
            match self.transport.object_metadata(handle) {
                Ok(_) => {}
                Err(source) if source.is_not_found() => return Ok(None),
                Err(source) => return Err(OperationError::ObjectMetadata { handle, source }),
            }
        }

        Ok(Some(target))
    }
}

/// Human readable target of an operation for error messages
fn describe(handle: Handle, full_path: &str) -> String {
    if handle.is_unspecified() {
        full_path.to_string()
    } else {
        handle.to_string()
    }
}

impl<T: ObjectTransport> FileSystemOperations for FsViewService<T> {
    fn resolve(&mut self, storage: StorageId, path: &str) -> Result<Handle, OperationError> {
        self.resolve_entry(storage, path).map(|(handle, _)| handle)
    }

    fn resolve_to_info(
        &mut self,
        storage: StorageId,
        full_path: &str,
    ) -> Result<FileInfo, OperationError> {
        match self.resolve_entry(storage, full_path)? {
            (_, None) => Ok(FileInfo::root()),
            (handle, Some(metadata)) => {
                let size = self.size_of(handle, &metadata)?;
                Ok(FileInfo::from_metadata(
                    handle,
                    &metadata,
                    &path::parent_of(full_path),
                    size,
                ))
            }
        }
    }

    fn list_directory(
        &mut self,
        storage: StorageId,
        handle: Handle,
        parent_path: &str,
    ) -> Result<Vec<FileInfo>, OperationError> {
        let dir = if handle.is_unspecified() {
            self.resolve(storage, parent_path)?
        } else {
            handle
        };
        let base = self.base_path(handle, parent_path)?;

        let children = self.children(storage, dir)?;
        Ok(self.collect_best_effort(children, &base))
    }

    fn walk<F>(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
        recursive: bool,
        mut visitor: F,
    ) -> Result<WalkSummary, OperationError>
    where
        F: FnMut(&FileInfo),
    {
        self.walk_with_control(storage, handle, full_path, recursive, |info| {
            visitor(info);
            WalkControl::Continue
        })
    }

    fn walk_with_control<F>(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
        recursive: bool,
        mut visitor: F,
    ) -> Result<WalkSummary, OperationError>
    where
        F: FnMut(&FileInfo) -> WalkControl,
    {
        self.walk_tree(storage, handle, full_path, recursive, &mut visitor)
    }

    fn make_directory(
        &mut self,
        storage: StorageId,
        parent: Handle,
        parent_path: &str,
        name: &str,
    ) -> Result<Handle, OperationError> {
        let target = path::join(parent_path, name);
        if !path::is_valid_name(name) {
            return Err(OperationError::InvalidPath(target));
        }

        let parent = self.directory_handle(storage, parent, parent_path)?;

        match self.find_child(storage, parent, name)? {
            Some((existing, metadata)) if metadata.is_dir() => {
                debug!("directory {:?} already exists as {}", target, existing);
                Ok(existing)
            }
            Some(_) => Err(OperationError::InvalidPath(target)),
            None => {
                let created = self
                    .transport
                    .create_directory(storage, parent, name)
                    .map_err(|source| OperationError::Mutation {
                        handle: parent,
                        source,
                    })?;
                debug!("created directory {:?} as {}", target, created);
                Ok(created)
            }
        }
    }

    fn make_directory_recursive(
        &mut self,
        storage: StorageId,
        full_path: &str,
    ) -> Result<Handle, OperationError> {
        let mut parent = Handle::ROOT;
        let mut parent_path = path::ROOT_PATH.to_string();

        for segment in path::segments(full_path) {
            parent = self.make_directory(storage, parent, &parent_path, &segment)?;
            parent_path = path::join(&parent_path, &segment);
        }
        Ok(parent)
    }

    fn delete_file(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
    ) -> Result<(), OperationError> {
        let Some(target) = self.existing_target(storage, handle, full_path)? else {
            debug!("{} is already absent", describe(handle, full_path));
            return Ok(());
        };

        self.transport
            .delete_object(target)
            .map_err(|source| OperationError::Mutation {
                handle: target,
                source,
            })?;
        debug!("deleted {}", describe(handle, full_path));
        Ok(())
    }

    fn rename_file(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
        new_name: &str,
    ) -> Result<Handle, OperationError> {
        if !path::is_valid_name(new_name) {
            return Err(OperationError::InvalidPath(new_name.to_string()));
        }

        let target = self
            .existing_target(storage, handle, full_path)?
            .ok_or_else(|| OperationError::InvalidPath(describe(handle, full_path)))?;

        self.transport
            .rename_object(target, new_name)
            .map_err(|source| OperationError::Mutation {
                handle: target,
                source,
            })?;
        debug!("renamed {} to {:?}", describe(handle, full_path), new_name);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_transport::{FailingTransport, FailurePolicy, SimulatedDevice};

    const STORAGE: StorageId = StorageId::new(0x0001_0001);

    struct Tree {
        x: Handle,
        a_txt: Handle,
        big: Handle,
    }

    /// /x/a.txt, /x/big.bin (size needs a query), /x/y/
    fn device() -> (SimulatedDevice, Tree) {
        let mut device = SimulatedDevice::with_storage(STORAGE);
        let x = device.add_directory(STORAGE, Handle::ROOT, "x").unwrap();
        let a_txt = device.add_file(STORAGE, x, "a.txt", 5).unwrap();
        let big = device
            .add_file(STORAGE, x, "big.bin", u64::from(u32::MAX) + 10)
            .unwrap();
        device.add_directory(STORAGE, x, "y").unwrap();
        (device, Tree { x, a_txt, big })
    }

    #[test]
    fn test_resolve_root_without_device_calls() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        assert_eq!(service.resolve(STORAGE, "/").unwrap(), Handle::ROOT);
        assert_eq!(service.resolve(STORAGE, "").unwrap(), Handle::ROOT);
        assert_eq!(service.transport().stats().list_children, 0);
    }

    #[test]
    fn test_resolve_nested() {
        let (device, tree) = device();
        let mut service = FsViewService::new(device);

        assert_eq!(service.resolve(STORAGE, "/x").unwrap(), tree.x);
        assert_eq!(service.resolve(STORAGE, "x/a.txt").unwrap(), tree.a_txt);
        assert_eq!(service.resolve(STORAGE, "/x/./y/../a.txt").unwrap(), tree.a_txt);
    }

    #[test]
    fn test_resolve_missing_keeps_original_path() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        assert_eq!(
            service.resolve(STORAGE, "/x/missing/deeper"),
            Err(OperationError::InvalidPath("/x/missing/deeper".to_string()))
        );
    }

    #[test]
    fn test_resolve_through_file_fails() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        let result = service.resolve(STORAGE, "/x/a.txt/y");
        assert!(matches!(result, Err(OperationError::InvalidPath(_))));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        assert!(service.resolve(STORAGE, "/X").unwrap_err().is_invalid_path());
    }

    #[test]
    fn test_resolve_to_info() {
        let (device, tree) = device();
        let mut service = FsViewService::new(device);

        let info = service.resolve_to_info(STORAGE, "x/big.bin/").unwrap();
        assert_eq!(info.handle, tree.big);
        assert_eq!(info.full_path, "/x/big.bin");
        assert_eq!(info.parent_path, "/x");
        assert_eq!(info.size, u64::from(u32::MAX) + 10);
        assert_eq!(info.extension, "bin");

        let root = service.resolve_to_info(STORAGE, "/").unwrap();
        assert_eq!(root, FileInfo::root());
    }

    #[test]
    fn test_fetch_file_info_size_query_failure() {
        let (device, tree) = device();
        let mut service =
            FsViewService::new(FailingTransport::new(device, FailurePolicy::SizeFor(vec![tree.big])));

        let result = service.fetch_file_info(tree.big, "/x");
        assert!(matches!(
            result,
            Err(OperationError::ObjectMetadata { handle, .. }) if handle == tree.big
        ));
        assert!(service.fetch_file_info(tree.a_txt, "/x").is_ok());
    }

    #[test]
    fn test_path_of() {
        let (device, tree) = device();
        let mut service = FsViewService::new(device);

        assert_eq!(service.path_of(tree.a_txt).unwrap(), "/x/a.txt");
        assert_eq!(service.path_of(tree.x).unwrap(), "/x");
        assert_eq!(service.path_of(Handle::ROOT).unwrap(), "/");
    }

    #[test]
    fn test_path_of_parent_cycle() {
        let (mut device, tree) = device();
        device.set_parent(tree.x, tree.a_txt).unwrap();
        let mut service = FsViewService::new(device);

        assert!(service.path_of(tree.a_txt).unwrap_err().is_invalid_path());
    }

    #[test]
    fn test_path_of_zero_parent_is_root() {
        let (mut device, tree) = device();
        device.set_parent(tree.x, Handle::UNSPECIFIED).unwrap();
        let mut service = FsViewService::new(device);

        assert_eq!(service.path_of(tree.a_txt).unwrap(), "/x/a.txt");
    }

    #[test]
    fn test_file_exists() {
        let (device, tree) = device();
        let mut service = FsViewService::new(device);

        let by_path = service.file_exists(STORAGE, Handle::UNSPECIFIED, "/x/a.txt").unwrap();
        assert_eq!(by_path.handle, tree.a_txt);

        let by_handle = service.file_exists(STORAGE, tree.a_txt, "").unwrap();
        assert_eq!(by_handle.full_path, "/x/a.txt");

        assert!(service.file_exists(STORAGE, Handle::UNSPECIFIED, "/nope").is_none());
        assert!(service.file_exists(STORAGE, Handle::new(999), "").is_none());
    }

    #[test]
    fn test_fetch_storages() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);
        assert_eq!(service.fetch_storages().unwrap()[0].id, STORAGE);

        let mut empty = FsViewService::new(SimulatedDevice::new());
        assert_eq!(empty.fetch_storages(), Err(OperationError::NoStorage));
    }

    #[test]
    fn test_list_directory_by_path_and_handle() {
        let (device, tree) = device();
        let mut service = FsViewService::new(device);

        let by_path = service.list_directory(STORAGE, Handle::UNSPECIFIED, "/x/").unwrap();
        let by_handle = service.list_directory(STORAGE, tree.x, "").unwrap();

        assert_eq!(by_path.len(), 3);
        assert_eq!(by_path, by_handle);
        assert!(by_path.iter().all(|info| info.parent_path == "/x"));
    }

    #[test]
    fn test_list_directory_skips_broken_entries() {
        let (device, tree) = device();
        let failing = FailingTransport::new(device, FailurePolicy::MetadataFor(vec![tree.a_txt]));
        let mut service = FsViewService::new(failing);

        let entries = service.list_directory(STORAGE, tree.x, "/x").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["big.bin", "y"]);
    }

    #[test]
    fn test_list_directory_drops_entry_on_size_query_failure() {
        let (device, tree) = device();
        let failing = FailingTransport::new(device, FailurePolicy::SizeFor(vec![tree.big]));
        let mut service = FsViewService::new(failing);

        let entries = service.list_directory(STORAGE, tree.x, "/x").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "y"]);
    }

    #[test]
    fn test_list_directory_enumeration_failure() {
        let (device, tree) = device();
        let failing = FailingTransport::new(device, FailurePolicy::ListChildrenOf(vec![tree.x]));
        let mut service = FsViewService::new(failing);

        let result = service.list_directory(STORAGE, tree.x, "/x");
        assert!(matches!(result, Err(OperationError::ListDirectory { .. })));
    }

    #[test]
    fn test_list_directory_missing_path() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        let result = service.list_directory(STORAGE, Handle::UNSPECIFIED, "/ghost");
        assert_eq!(result, Err(OperationError::InvalidPath("/ghost".to_string())));
    }

    #[test]
    fn test_make_directory_rejects_bad_names() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        for name in ["", ".", "..", "a/b"] {
            let result = service.make_directory(STORAGE, Handle::UNSPECIFIED, "/x", name);
            assert!(result.unwrap_err().is_invalid_path(), "name {:?}", name);
        }
    }

    #[test]
    fn test_make_directory_unknown_parent_handle() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        let result = service.make_directory(STORAGE, Handle::new(1_234_561), "/x", "test");
        assert!(matches!(result, Err(OperationError::ObjectMetadata { .. })));
    }

    #[test]
    fn test_make_directory_under_file_parent() {
        let (device, tree) = device();
        let mut service = FsViewService::new(device);

        let by_path = service.make_directory(STORAGE, Handle::UNSPECIFIED, "/x/a.txt", "y");
        assert!(by_path.unwrap_err().is_invalid_path());

        let by_handle = service.make_directory(STORAGE, tree.a_txt, "", "y");
        assert!(by_handle.unwrap_err().is_invalid_path());

        assert!(service
            .resolve(STORAGE, "/x/a.txt/y")
            .unwrap_err()
            .is_invalid_path());
        assert_eq!(service.transport().stats().create_directory, 0);
    }

    #[test]
    fn test_make_directory_mutation_failure() {
        let (device, tree) = device();
        let mut service = FsViewService::new(FailingTransport::new(device, FailurePolicy::Mutations));

        let result = service.make_directory(STORAGE, tree.x, "", "new");
        assert!(matches!(
            result,
            Err(OperationError::Mutation { handle, .. }) if handle == tree.x
        ));
    }

    #[test]
    fn test_delete_root_is_rejected() {
        let (device, _) = device();
        let mut service = FsViewService::new(device);

        assert!(service
            .delete_file(STORAGE, Handle::UNSPECIFIED, "/")
            .unwrap_err()
            .is_invalid_path());
        assert!(service
            .delete_file(STORAGE, Handle::ROOT, "")
            .unwrap_err()
            .is_invalid_path());
    }

    #[test]
    fn test_delete_surfaces_device_rejection() {
        let (device, tree) = device();
        let mut service = FsViewService::new(FailingTransport::new(device, FailurePolicy::Mutations));

        let result = service.delete_file(STORAGE, tree.a_txt, "");
        assert!(matches!(result, Err(OperationError::Mutation { .. })));
    }

    #[test]
    fn test_rename_rejects_paths_as_names() {
        let (device, tree) = device();
        let mut service = FsViewService::new(device);

        let result = service.rename_file(STORAGE, tree.a_txt, "", "sub/b.txt");
        assert!(result.unwrap_err().is_invalid_path());
    }
}
