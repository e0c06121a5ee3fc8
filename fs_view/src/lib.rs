//! # Filesystem View
//!
//! This crate holds the pure, device-independent part of the path view over
//! handle-addressed storage.
//!
//! ## Philosophy
//!
//! - **Paths are views, not identity**: the device only knows handles; a path
//!   is a string the caller resolves, never something the device stores
//! - **Pure functions**: nothing here talks to a device or can fail
//!
//! ## Design
//!
//! - [`path`]: normalization, joining and segmenting of `/`-separated paths
//! - [`extension`]: extension classification, including compound extensions
//! - [`FileInfo`]: device metadata decorated with resolved path context

pub mod extension;
pub mod file_info;
pub mod path;

pub use extension::{extension_of, COMPOUND_EXTENSION_HEADS};
pub use file_info::FileInfo;
pub use path::{
    common_parent_path, is_hidden_name, is_valid_name, join, normalize, parent_of, segments,
    PATH_SEP, ROOT_PATH,
};
