//! Transport collaborator contract
//!
//! The path view never talks to a device directly; it consumes exactly the
//! handle-level primitives listed on [`ObjectTransport`].

use core_types::{Handle, ObjectMetadata, StorageId, StorageInfo};
use thiserror::Error;

/// Errors reported by a transport
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The device does not know this handle (deleted, stale or never existed)
    #[error("invalid object handle: {0}")]
    InvalidObjectHandle(Handle),

    /// The parent handle of a create request is unknown or not a directory
    #[error("invalid parent object: {0}")]
    InvalidParentObject(Handle),

    /// The storage ID is unknown to the device
    #[error("invalid storage: {0}")]
    InvalidStorage(StorageId),

    /// The device refused the request
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Session-level failure (timeout, disconnect, protocol error)
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Returns true when the error means "this object does not exist"
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::InvalidObjectHandle(_))
    }
}

/// Handle-level primitives offered by a device session
///
/// One implementation represents one serial command channel, so every
/// primitive takes `&mut self` and blocks until the device answers.
pub trait ObjectTransport {
    /// Lists the storage containers of the device
    fn storages(&mut self) -> Result<Vec<StorageInfo>, TransportError>;

    /// Lists the direct children of `parent` within `storage`
    ///
    /// Files and directories are both returned, in no particular order.
    /// `Handle::ROOT` lists the top level of the storage.
    fn list_children(
        &mut self,
        storage: StorageId,
        parent: Handle,
    ) -> Result<Vec<Handle>, TransportError>;

    /// Fetches the metadata of one object
    fn object_metadata(&mut self, handle: Handle) -> Result<ObjectMetadata, TransportError>;

    /// Secondary size query for objects whose inline size is the sentinel
    fn object_size(&mut self, handle: Handle) -> Result<u64, TransportError>;

    /// Creates a directory named `name` under `parent`
    ///
    /// Devices do not reject duplicate names; callers that need create-or-get
    /// semantics must check first.
    fn create_directory(
        &mut self,
        storage: StorageId,
        parent: Handle,
        name: &str,
    ) -> Result<Handle, TransportError>;

    /// Deletes an object (directories are deleted with their contents)
    fn delete_object(&mut self, handle: Handle) -> Result<(), TransportError>;

    /// Changes the base name of an object
    fn rename_object(&mut self, handle: Handle, new_name: &str) -> Result<(), TransportError>;
}
