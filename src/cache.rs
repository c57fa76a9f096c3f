// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Last aggregated model per (view, identity). Process-local only.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::views::{Snapshot, ViewId};

type Key = (ViewId, String);

#[derive(Debug, Default)]
pub struct ViewModelCache {
    entries: RwLock<HashMap<Key, Arc<Snapshot>>>,
}

impl ViewModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, view: ViewId, identity: &str) -> Option<Arc<Snapshot>> {
        self.entries
            .read()
            .get(&(view, identity.to_string()))
            .cloned()
    }

    /// Swaps in a complete snapshot; readers see either the old one or the new one.
    pub fn put(&self, view: ViewId, identity: &str, snapshot: Snapshot) {
        self.entries
            .write()
            .insert((view, identity.to_string()), Arc::new(snapshot));
    }

    pub fn remove(&self, view: ViewId, identity: &str) {
        self.entries.write().remove(&(view, identity.to_string()));
    }

    /// Drops every entry owned by `identity`, returning how many went.
    pub fn invalidate(&self, identity: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(_, owner), _| owner != identity);
        let dropped = before - entries.len();
        debug!(identity, dropped, "view cache invalidated");
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
