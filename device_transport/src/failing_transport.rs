//! # Failing Transport
//!
//! An [`ObjectTransport`] wrapper that can simulate device-side failures.
//! Useful for testing how the path view reacts to flaky sessions and stale
//! handles without real hardware.

use crate::transport::{ObjectTransport, TransportError};
use core_types::{Handle, ObjectMetadata, StorageId, StorageInfo};

/// Policy for when failures should occur
#[derive(Debug, Clone)]
pub enum FailurePolicy {
    /// Never fail (passthrough)
    Never,
    /// Fail metadata fetches for these handles
    MetadataFor(Vec<Handle>),
    /// Fail secondary size queries for these handles
    SizeFor(Vec<Handle>),
    /// Fail child enumeration of these parents
    ListChildrenOf(Vec<Handle>),
    /// Fail every create, delete and rename
    Mutations,
    /// Fail every primitive once N calls have been served
    AfterCalls(usize),
}

/// Wrapper around a transport that can simulate failures
pub struct FailingTransport<T: ObjectTransport> {
    inner: T,
    policy: FailurePolicy,
    call_count: usize,
}

impl<T: ObjectTransport> FailingTransport<T> {
    /// Create a new failing transport with the given policy
    pub fn new(inner: T, policy: FailurePolicy) -> Self {
        Self {
            inner,
            policy,
            call_count: 0,
        }
    }

    /// Counts the call and returns an error if the policy says so
    fn gate(&mut self, fails: impl FnOnce(&FailurePolicy) -> bool) -> Result<(), TransportError> {
        let over_budget = matches!(self.policy, FailurePolicy::AfterCalls(n) if self.call_count >= n);
        self.call_count += 1;

        if over_budget || fails(&self.policy) {
            return Err(TransportError::Io("injected failure".to_string()));
        }
        Ok(())
    }

    /// Get the underlying transport (for inspection)
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Get mutable access to the underlying transport
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Get the number of primitive calls that have been attempted
    pub fn call_count(&self) -> usize {
        self.call_count
    }

    /// Reset the failure policy
    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
        self.call_count = 0;
    }
}

impl<T: ObjectTransport> ObjectTransport for FailingTransport<T> {
    fn storages(&mut self) -> Result<Vec<StorageInfo>, TransportError> {
        self.gate(|_| false)?;
        self.inner.storages()
    }

    fn list_children(
        &mut self,
        storage: StorageId,
        parent: Handle,
    ) -> Result<Vec<Handle>, TransportError> {
        self.gate(|p| matches!(p, FailurePolicy::ListChildrenOf(hs) if hs.contains(&parent)))?;
        self.inner.list_children(storage, parent)
    }

    fn object_metadata(&mut self, handle: Handle) -> Result<ObjectMetadata, TransportError> {
        self.gate(|p| matches!(p, FailurePolicy::MetadataFor(hs) if hs.contains(&handle)))?;
        self.inner.object_metadata(handle)
    }

    fn object_size(&mut self, handle: Handle) -> Result<u64, TransportError> {
        self.gate(|p| matches!(p, FailurePolicy::SizeFor(hs) if hs.contains(&handle)))?;
        self.inner.object_size(handle)
    }

    fn create_directory(
        &mut self,
        storage: StorageId,
        parent: Handle,
        name: &str,
    ) -> Result<Handle, TransportError> {
        self.gate(|p| matches!(p, FailurePolicy::Mutations))?;
        self.inner.create_directory(storage, parent, name)
    }

    fn delete_object(&mut self, handle: Handle) -> Result<(), TransportError> {
        self.gate(|p| matches!(p, FailurePolicy::Mutations))?;
        self.inner.delete_object(handle)
    }

    fn rename_object(&mut self, handle: Handle, new_name: &str) -> Result<(), TransportError> {
        self.gate(|p| matches!(p, FailurePolicy::Mutations))?;
        self.inner.rename_object(handle, new_name)
    }
}
