//! `FrameRegistry`: the process-wide arena of frames.
//!
//! Frames are stored in a `Vec` (the arena); every other component refers to
//! a frame by its stable [`FrameHandle`] index rather than an owning
//! reference, which is what lets `TransformStorage` point at both a parent
//! and a child frame without a reference cycle.

use std::collections::HashMap;

use log::debug;
use parking_lot::RwLock;

use crate::frame::Frame;
use crate::ids::FrameId;

/// A stable index into the `FrameRegistry` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub usize);

pub struct FrameRegistry {
    default_cache_duration_nanos: i64,
    frame_prefix: Option<String>,
    frames: RwLock<Vec<Frame>>,
    by_id: RwLock<HashMap<String, FrameHandle>>,
}

impl FrameRegistry {
    pub fn new(default_cache_duration_nanos: i64, frame_prefix: Option<String>) -> Self {
        Self {
            default_cache_duration_nanos,
            frame_prefix,
            frames: RwLock::new(Vec::new()),
            by_id: RwLock::new(HashMap::new()),
        }
    }

    pub fn canonicalize(&self, raw: &str) -> FrameId {
        let (id, rewritten) = FrameId::canonicalize(raw, self.frame_prefix.as_deref());
        if rewritten {
            debug!("canonicalized frame id `{raw}` to `{id}`");
        }
        id
    }

    /// Look up a frame by canonical id without creating it.
    pub fn get(&self, id: &FrameId) -> Option<FrameHandle> {
        self.by_id.read().get(id.as_str()).copied()
    }

    /// Get-or-create, race-safe: on a concurrent double-insert, the losing
    /// writer's proposed frame is discarded and the winner's handle is
    /// returned instead.
    pub fn resolve_or_insert(&self, id: &FrameId) -> FrameHandle {
        if let Some(handle) = self.get(id) {
            return handle;
        }

        let mut by_id = self.by_id.write();
        // Re-check under the exclusive guard: someone may have inserted
        // between our read-guard lookup and acquiring this one.
        if let Some(handle) = by_id.get(id.as_str()).copied() {
            return handle;
        }

        let mut frames = self.frames.write();
        let handle = FrameHandle(frames.len());
        frames.push(Frame::new(id.as_str().to_string(), self.default_cache_duration_nanos));
        by_id.insert(id.as_str().to_string(), handle);
        handle
    }

    pub fn frame(&self, handle: FrameHandle) -> parking_lot::MappedRwLockReadGuard<'_, Frame> {
        parking_lot::RwLockReadGuard::map(self.frames.read(), |frames| &frames[handle.0])
    }

    pub fn frame_id_str(&self, handle: FrameHandle) -> String {
        self.frames.read()[handle.0].id().to_string()
    }

    pub fn len(&self) -> usize {
        self.frames.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
