//! # Filesystem View Service
//!
//! This service provides path-based filesystem operations over a device that
//! only understands object handles.
//!
//! ## Philosophy
//!
//! - Paths are resolved fresh for every call; no handle cache can go stale
//! - The storage root is virtual and never sent to the device as an object
//! - Mutations are idempotent where the outcome already holds
//! - Listings are lossy on partial failure, walks are not
//!
//! ## Operations
//!
//! - `resolve(path)`: Walk a path down from the root to a handle
//! - `list_directory(dir)`: List the entries of one directory
//! - `walk(dir, recursive, visitor)`: Visit a subtree depth-first
//! - `make_directory(parent, name)`: Create a directory unless it exists
//! - `make_directory_recursive(path)`: Create every missing directory of a path
//! - `delete_file(target)`: Delete an object if it exists
//! - `rename_file(target, name)`: Rename an object in place

pub mod config;
pub mod operations;
pub mod service;
mod walk;

pub use config::{ConfigError, FsViewConfig};
pub use operations::{FileSystemOperations, OperationError, WalkControl, WalkSummary};
pub use service::FsViewService;
