//! # Core Types
//!
//! This crate defines the fundamental types shared by every MtpView crate.
//!
//! ## Philosophy
//!
//! - **Handles, not paths**: The device only knows opaque handles; paths are
//!   synthesized on top of them by `services_fs_view`.
//! - **Type safety first**: Handles and storage IDs are distinct newtypes and
//!   cannot be confused with each other or with plain integers.
//!
//! ## Key Types
//!
//! - [`Handle`]: Device-assigned object identifier (with `ROOT`/`UNSPECIFIED`)
//! - [`StorageId`]: Identifier for a storage container
//! - [`ObjectMetadata`]: Raw attributes of one object
//! - [`StorageInfo`]: Description of a storage container

pub mod ids;
pub mod object;

pub use ids::{Handle, StorageId};
pub use object::{ObjectKind, ObjectMetadata, StorageInfo, SIZE_QUERY_SENTINEL};
