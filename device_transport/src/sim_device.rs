//! # Simulated Device
//!
//! An in-memory [`ObjectTransport`] that behaves like a media device: a flat
//! arena of handles linked by parent pointers, no paths, no duplicate-name
//! checks. Used to exercise the path view without hardware.

use crate::transport::{ObjectTransport, TransportError};
use core_types::{Handle, ObjectKind, ObjectMetadata, StorageId, StorageInfo, SIZE_QUERY_SENTINEL};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// First handle value handed out by a fresh device
const FIRST_HANDLE: u32 = 1;

/// Modification time stamped on objects of a fresh device
const EPOCH_START: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
struct SimObject {
    storage: StorageId,
    parent: Handle,
    name: String,
    kind: ObjectKind,
    size: u64,
    modified_at: u64,
}

/// Number of primitive calls served, per primitive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub storages: usize,
    pub list_children: usize,
    pub object_metadata: usize,
    pub object_size: usize,
    pub create_directory: usize,
    pub delete_object: usize,
    pub rename_object: usize,
}

/// Errors raised while seeding a device from a fixture
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture is not valid JSON for [`DeviceFixture`]
    #[error("invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),

    /// The fixture describes an impossible tree
    #[error("fixture rejected by device: {0}")]
    Transport(#[from] TransportError),
}

/// Declarative description of a device's contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceFixture {
    pub storages: Vec<FixtureStorage>,
}

/// One storage container of a fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStorage {
    pub id: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<FixtureNode>,
}

/// One object of a fixture
///
/// A node with `children` (even an empty list) is a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureNode {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub children: Option<Vec<FixtureNode>>,
}

/// In-memory device
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    storages: Vec<StorageInfo>,
    objects: BTreeMap<Handle, SimObject>,
    /// Extra (storage, parent, child) listing entries, for listing anomalies
    aliases: Vec<(StorageId, Handle, Handle)>,
    next_handle: u32,
    clock: u64,
    stats: CallStats,
}

impl SimulatedDevice {
    /// Creates a device with no storages
    pub fn new() -> Self {
        Self {
            storages: Vec::new(),
            objects: BTreeMap::new(),
            aliases: Vec::new(),
            next_handle: FIRST_HANDLE,
            clock: EPOCH_START,
            stats: CallStats::default(),
        }
    }

    /// Creates a device with a single empty storage
    pub fn with_storage(id: StorageId) -> Self {
        let mut device = Self::new();
        device.add_storage(id, "Internal shared storage");
        device
    }

    /// Builds a device from a fixture
    pub fn from_fixture(fixture: &DeviceFixture) -> Result<Self, TransportError> {
        let mut device = Self::new();
        for storage in &fixture.storages {
            let id = StorageId::new(storage.id);
            device.add_storage(id, &storage.description);
            device.add_fixture_nodes(id, Handle::ROOT, &storage.entries)?;
        }
        Ok(device)
    }

    /// Builds a device from a JSON fixture
    pub fn from_fixture_json(json: &str) -> Result<Self, FixtureError> {
        let fixture: DeviceFixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(&fixture)?)
    }

    fn add_fixture_nodes(
        &mut self,
        storage: StorageId,
        parent: Handle,
        nodes: &[FixtureNode],
    ) -> Result<(), TransportError> {
        for node in nodes {
            match &node.children {
                Some(children) => {
                    let handle = self.add_directory(storage, parent, &node.name)?;
                    self.add_fixture_nodes(storage, handle, children)?;
                }
                None => {
                    self.add_file(storage, parent, &node.name, node.size)?;
                }
            }
        }
        Ok(())
    }

    /// Registers a storage container
    pub fn add_storage(&mut self, id: StorageId, description: &str) {
        self.storages.push(StorageInfo {
            id,
            description: description.to_string(),
            max_capacity: 64 * 1024 * 1024 * 1024,
            free_space: 32 * 1024 * 1024 * 1024,
        });
    }

    /// Adds a directory, bypassing call accounting
    pub fn add_directory(
        &mut self,
        storage: StorageId,
        parent: Handle,
        name: &str,
    ) -> Result<Handle, TransportError> {
        self.insert(storage, parent, name, ObjectKind::Directory, 0)
    }

    /// Adds a file of the given size, bypassing call accounting
    pub fn add_file(
        &mut self,
        storage: StorageId,
        parent: Handle,
        name: &str,
        size: u64,
    ) -> Result<Handle, TransportError> {
        self.insert(storage, parent, name, ObjectKind::File, size)
    }

    /// Makes `child` additionally appear in the listing of `parent`
    ///
    /// Simulates devices that report one object under several parents. An
    /// alias of an ancestor inside its own subtree forms a cycle.
    pub fn add_alias(&mut self, storage: StorageId, parent: Handle, child: Handle) {
        self.aliases.push((storage, parent, child));
    }

    /// Rewrites the parent pointer of an object without any validation
    pub fn set_parent(&mut self, handle: Handle, parent: Handle) -> Result<(), TransportError> {
        let object = self
            .objects
            .get_mut(&handle)
            .ok_or(TransportError::InvalidObjectHandle(handle))?;
        object.parent = parent;
        Ok(())
    }

    /// Returns true if the device knows this handle
    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    /// Number of objects on the device (all storages)
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Handles of the children of `parent` named `name`
    pub fn children_named(&self, storage: StorageId, parent: Handle, name: &str) -> Vec<Handle> {
        self.objects
            .iter()
            .filter(|(_, o)| o.storage == storage && o.parent == parent && o.name == name)
            .map(|(h, _)| *h)
            .collect()
    }

    /// Call counters since creation or the last [`reset_stats`](Self::reset_stats)
    pub fn stats(&self) -> CallStats {
        self.stats
    }

    /// Resets call counters
    pub fn reset_stats(&mut self) {
        self.stats = CallStats::default();
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn has_storage(&self, storage: StorageId) -> bool {
        self.storages.iter().any(|s| s.id == storage)
    }

    fn check_parent(&self, storage: StorageId, parent: Handle) -> Result<(), TransportError> {
        if parent.is_root() {
            return Ok(());
        }
        match self.objects.get(&parent) {
            Some(o) if o.storage == storage && o.kind.is_dir() => Ok(()),
            _ => Err(TransportError::InvalidParentObject(parent)),
        }
    }

    fn insert(
        &mut self,
        storage: StorageId,
        parent: Handle,
        name: &str,
        kind: ObjectKind,
        size: u64,
    ) -> Result<Handle, TransportError> {
        if !self.has_storage(storage) {
            return Err(TransportError::InvalidStorage(storage));
        }
        if name.is_empty() {
            return Err(TransportError::AccessDenied("empty object name".to_string()));
        }
        self.check_parent(storage, parent)?;

        let handle = Handle::new(self.next_handle);
        self.next_handle += 1;
        let modified_at = self.tick();

        self.objects.insert(
            handle,
            SimObject {
                storage,
                parent,
                name: name.to_string(),
                kind,
                size,
                modified_at,
            },
        );
        Ok(handle)
    }

    fn descendants_of(&self, handle: Handle) -> Vec<Handle> {
        let mut found = vec![handle];
        let mut idx = 0;
        while idx < found.len() {
            let current = found[idx];
            for (child, object) in &self.objects {
                if object.parent == current && !found.contains(child) {
                    found.push(*child);
                }
            }
            idx += 1;
        }
        found
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTransport for SimulatedDevice {
    fn storages(&mut self) -> Result<Vec<StorageInfo>, TransportError> {
        self.stats.storages += 1;
        Ok(self.storages.clone())
    }

    fn list_children(
        &mut self,
        storage: StorageId,
        parent: Handle,
    ) -> Result<Vec<Handle>, TransportError> {
        self.stats.list_children += 1;

        if !self.has_storage(storage) {
            return Err(TransportError::InvalidStorage(storage));
        }
        if !parent.is_root() && !self.objects.contains_key(&parent) {
            return Err(TransportError::InvalidObjectHandle(parent));
        }
        self.check_parent(storage, parent)?;

        let mut children: Vec<Handle> = self
            .objects
            .iter()
            .filter(|(_, o)| o.storage == storage && o.parent == parent)
            .map(|(h, _)| *h)
            .collect();

        children.extend(
            self.aliases
                .iter()
                .filter(|(s, p, c)| *s == storage && *p == parent && self.objects.contains_key(c))
                .map(|(_, _, c)| *c),
        );

        Ok(children)
    }

    fn object_metadata(&mut self, handle: Handle) -> Result<ObjectMetadata, TransportError> {
        self.stats.object_metadata += 1;

        let object = self
            .objects
            .get(&handle)
            .ok_or(TransportError::InvalidObjectHandle(handle))?;

        let compressed_size = match object.kind {
            ObjectKind::Directory => 0,
            ObjectKind::File => u32::try_from(object.size)
                .ok()
                .filter(|size| *size != SIZE_QUERY_SENTINEL)
                .unwrap_or(SIZE_QUERY_SENTINEL),
        };

        Ok(ObjectMetadata {
            storage: object.storage,
            name: object.name.clone(),
            parent: object.parent,
            kind: object.kind,
            modified_at: object.modified_at,
            compressed_size,
        })
    }

    fn object_size(&mut self, handle: Handle) -> Result<u64, TransportError> {
        self.stats.object_size += 1;

        self.objects
            .get(&handle)
            .map(|o| o.size)
            .ok_or(TransportError::InvalidObjectHandle(handle))
    }

    fn create_directory(
        &mut self,
        storage: StorageId,
        parent: Handle,
        name: &str,
    ) -> Result<Handle, TransportError> {
        self.stats.create_directory += 1;

        let handle = self.insert(storage, parent, name, ObjectKind::Directory, 0)?;
        debug!("sim: created directory {:?} as {} under {}", name, handle, parent);
        Ok(handle)
    }

    fn delete_object(&mut self, handle: Handle) -> Result<(), TransportError> {
        self.stats.delete_object += 1;

        if handle.is_root() {
            return Err(TransportError::AccessDenied(
                "storage root cannot be deleted".to_string(),
            ));
        }
        if !self.objects.contains_key(&handle) {
            return Err(TransportError::InvalidObjectHandle(handle));
        }

        let doomed = self.descendants_of(handle);
        for gone in &doomed {
            self.objects.remove(gone);
        }
        self.aliases
            .retain(|(_, p, c)| !doomed.contains(p) && !doomed.contains(c));

        debug!("sim: deleted {} ({} objects)", handle, doomed.len());
        Ok(())
    }

    fn rename_object(&mut self, handle: Handle, new_name: &str) -> Result<(), TransportError> {
        self.stats.rename_object += 1;

        if new_name.is_empty() {
            return Err(TransportError::AccessDenied("empty object name".to_string()));
        }
        let modified_at = self.tick();
        let object = self
            .objects
            .get_mut(&handle)
            .ok_or(TransportError::InvalidObjectHandle(handle))?;

        object.name = new_name.to_string();
        object.modified_at = modified_at;
        Ok(())
    }
}
