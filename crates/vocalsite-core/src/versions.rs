//! Version history
//!
//! Append-only capped snapshot store. The in-memory list is the source of
//! truth for the running session; every mutation serializes the whole history
//! to the persistence collaborator under one fixed key. A failed write is
//! logged and does not roll back memory.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::buffers::SourceBuffers;
use crate::error::StudioError;
use crate::storage::Persistence;

/// Maximum retained snapshots
pub const HISTORY_CAP: usize = 50;

/// Fixed persistence key for the serialized history
pub const HISTORY_KEY: &str = "version_history";

/// One immutable saved copy of the three buffers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: u64,
    pub label: String,
    pub markup: String,
    pub style: String,
    pub script: String,
}

/// Issues strictly increasing snapshot ids.
///
/// Seeded from wall-clock millis but always bumped past the last issued id,
/// so rapid calls inside one clock tick still get unique ids.
#[derive(Debug, Default)]
pub struct SnapshotIdGen {
    last: u64,
}

impl SnapshotIdGen {
    /// Next unique id
    pub fn next(&mut self) -> u64 {
        self.last = unix_millis().max(self.last + 1);
        self.last
    }

    /// Never issue an id at or below `floor` (used after loading history)
    pub fn seed(&mut self, floor: u64) {
        self.last = self.last.max(floor);
    }
}

/// Current Unix timestamp in milliseconds
fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Capped, persisted list of snapshots, most-recent-first
pub struct VersionStore {
    history: Vec<Snapshot>,
    ids: SnapshotIdGen,
    persistence: Box<dyn Persistence>,
}

impl VersionStore {
    /// Load the history from the persistence collaborator.
    ///
    /// Corrupt persisted data is non-fatal: the store logs it and starts
    /// with an empty history.
    pub fn load(persistence: Box<dyn Persistence>) -> Self {
        let history = match persistence.get(HISTORY_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<Snapshot>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    warn!("{}", StudioError::PersistenceCorrupt(e.to_string()));
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut ids = SnapshotIdGen::default();
        if let Some(max) = history.iter().map(|s| s.id).max() {
            ids.seed(max);
        }

        Self {
            history,
            ids,
            persistence,
        }
    }

    /// Record a snapshot of the given buffers.
    ///
    /// Prepends to the history, truncates to the cap, then writes the whole
    /// updated history through to persistence.
    pub fn snapshot(&mut self, buffers: &SourceBuffers, label: &str) -> Snapshot {
        let snap = Snapshot {
            id: self.ids.next(),
            label: label.to_string(),
            markup: buffers.markup.clone(),
            style: buffers.style.clone(),
            script: buffers.script.clone(),
        };

        self.history.insert(0, snap.clone());
        self.history.truncate(HISTORY_CAP);
        self.persist();
        snap
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.history) {
            Ok(json) => json,
            Err(e) => {
                warn!("version history serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.persistence.set(HISTORY_KEY, &json) {
            // In-memory history stays authoritative for the session
            warn!("version history write failed: {}", e);
        }
    }

    /// Exact copy of the buffers stored under `id`
    pub fn restore(&self, id: u64) -> Result<SourceBuffers, StudioError> {
        self.history
            .iter()
            .find(|s| s.id == id)
            .map(|s| SourceBuffers {
                markup: s.markup.clone(),
                style: s.style.clone(),
                script: s.script.clone(),
            })
            .ok_or(StudioError::SnapshotNotFound(id))
    }

    /// One snapshot by id
    pub fn get(&self, id: u64) -> Option<&Snapshot> {
        self.history.iter().find(|s| s.id == id)
    }

    /// All snapshots, most-recent-first
    pub fn list(&self) -> &[Snapshot] {
        &self.history
    }
}
