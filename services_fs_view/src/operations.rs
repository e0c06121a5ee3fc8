//! Filesystem operations
//!
//! This module defines the operations provided by the filesystem view service.

use core_types::{Handle, StorageId};
use device_transport::TransportError;
use fs_view::FileInfo;
use thiserror::Error;

/// Errors that can occur during filesystem operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    /// The path does not lead to an object, is malformed, or runs through a file
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Metadata or size of an otherwise known handle could not be fetched
    #[error("failed to fetch metadata of {handle}: {source}")]
    ObjectMetadata {
        handle: Handle,
        #[source]
        source: TransportError,
    },

    /// Children of a directory could not be enumerated
    #[error("failed to list directory {handle}: {source}")]
    ListDirectory {
        handle: Handle,
        #[source]
        source: TransportError,
    },

    /// The device rejected a create, delete or rename
    #[error("device rejected change to {handle}: {source}")]
    Mutation {
        handle: Handle,
        #[source]
        source: TransportError,
    },

    /// The storage list could not be fetched
    #[error("failed to fetch storages: {0}")]
    StorageInfo(#[source] TransportError),

    /// The device reports no storage at all
    #[error("no storage found")]
    NoStorage,
}

impl OperationError {
    /// Returns true for [`OperationError::InvalidPath`]
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, OperationError::InvalidPath(_))
    }
}

/// Outcome of a directory walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Handle the walk started from
    pub root: Handle,
    /// Number of visitor invocations
    pub total: usize,
}

/// Visitor verdict for [`FileSystemOperations::walk_with_control`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Keep walking
    Continue,
    /// End the walk after this entry
    Stop,
}

/// Filesystem operations trait
///
/// Every operation is scoped to one storage and re-resolves paths from the
/// storage root; nothing is cached between calls. Where an operation takes
/// both a handle and a path, a handle other than [`Handle::UNSPECIFIED`] wins.
pub trait FileSystemOperations {
    /// Resolve a path to a handle
    ///
    /// The root path resolves to [`Handle::ROOT`] without touching the device.
    fn resolve(&mut self, storage: StorageId, path: &str) -> Result<Handle, OperationError>;

    /// Resolve a path and fetch the full metadata of its target
    fn resolve_to_info(&mut self, storage: StorageId, path: &str)
        -> Result<FileInfo, OperationError>;

    /// List directory contents
    ///
    /// Entries whose metadata cannot be fetched are skipped.
    fn list_directory(
        &mut self,
        storage: StorageId,
        handle: Handle,
        parent_path: &str,
    ) -> Result<Vec<FileInfo>, OperationError>;

    /// Walk a directory depth-first, calling `visitor` once per entry
    fn walk<F>(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
        recursive: bool,
        visitor: F,
    ) -> Result<WalkSummary, OperationError>
    where
        F: FnMut(&FileInfo);

    /// Walk a directory, letting the visitor end the walk early
    fn walk_with_control<F>(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
        recursive: bool,
        visitor: F,
    ) -> Result<WalkSummary, OperationError>
    where
        F: FnMut(&FileInfo) -> WalkControl;

    /// Create a directory, or return the existing one of the same name
    fn make_directory(
        &mut self,
        storage: StorageId,
        parent: Handle,
        parent_path: &str,
        name: &str,
    ) -> Result<Handle, OperationError>;

    /// Create every missing directory along a path
    fn make_directory_recursive(
        &mut self,
        storage: StorageId,
        full_path: &str,
    ) -> Result<Handle, OperationError>;

    /// Delete an object; deleting something absent succeeds
    fn delete_file(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
    ) -> Result<(), OperationError>;

    /// Rename an object in place and return its (unchanged) handle
    fn rename_file(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
        new_name: &str,
    ) -> Result<Handle, OperationError>;
}
