//! Depth-first directory walk
//!
//! Entries are visited in pre-order: a directory is reported before anything
//! below it. Unlike listing, a walk aborts on the first enumeration failure;
//! a child whose metadata cannot be fetched is still only skipped.
//!
//! Pending siblings are kept on an explicit heap stack, one frame per open
//! directory, so tree depth is bounded by memory rather than the call stack.

use crate::operations::{OperationError, WalkControl, WalkSummary};
use crate::service::FsViewService;
use core_types::{Handle, StorageId};
use device_transport::ObjectTransport;
use fs_view::FileInfo;
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::vec;

impl<T: ObjectTransport> FsViewService<T> {
    pub(crate) fn walk_tree<F>(
        &mut self,
        storage: StorageId,
        handle: Handle,
        full_path: &str,
        recursive: bool,
        visitor: &mut F,
    ) -> Result<WalkSummary, OperationError>
    where
        F: FnMut(&FileInfo) -> WalkControl,
    {
        if handle.is_unspecified() && full_path.is_empty() {
            return Err(OperationError::InvalidPath(
                "walk needs a handle or a path".to_string(),
            ));
        }

        let start = self.directory_handle(storage, handle, full_path)?;
        let base = self.base_path(handle, full_path)?;
        debug!("walking {:?} ({}), recursive: {}", base, start, recursive);

        let total = self.walk_from(storage, start, &base, recursive, visitor)?;
        Ok(WalkSummary { root: start, total })
    }

    /// Visits everything below `start`, returning the number of visits
    fn walk_from<F>(
        &mut self,
        storage: StorageId,
        start: Handle,
        base: &str,
        recursive: bool,
        visitor: &mut F,
    ) -> Result<usize, OperationError>
    where
        F: FnMut(&FileInfo) -> WalkControl,
    {
        let mut total = 0;
        // Directories already entered; a device that lists an ancestor below
        // itself would otherwise never terminate
        let mut visited = HashSet::from([start]);
        // The frame at index `d` holds the unvisited entries at depth `d`
        let mut stack: Vec<vec::IntoIter<FileInfo>> =
            vec![self.entries_of(storage, start, base)?];

        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.next() else {
                stack.pop();
                continue;
            };
            let depth = stack.len() - 1;

            if self.config.skip_hidden && entry.is_hidden() {
                trace!("skipping hidden {:?}", entry.full_path);
                continue;
            }

            trace!("visiting {:?}", entry.full_path);
            total += 1;
            if visitor(&entry) == WalkControl::Stop {
                debug!("walk stopped at {:?}", entry.full_path);
                break;
            }

            if !entry.is_dir || !recursive || !self.config.may_descend(depth) {
                continue;
            }
            if !visited.insert(entry.handle) {
                warn!(
                    "{:?} ({}) was already walked, not descending again",
                    entry.full_path, entry.handle
                );
                continue;
            }

            stack.push(self.entries_of(storage, entry.handle, &entry.full_path)?);
        }

        Ok(total)
    }

    fn entries_of(
        &mut self,
        storage: StorageId,
        dir: Handle,
        dir_path: &str,
    ) -> Result<vec::IntoIter<FileInfo>, OperationError> {
        let children = self.children(storage, dir)?;
        Ok(self.collect_best_effort(children, dir_path).into_iter())
    }
}
