use crate::types::{OptimizationResult, Piece, Project, SheetPiece};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::SyncSender;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Deep copy of the piece set a run was asked to pack. Owned by the entry,
/// so later edits to the caller's working list never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceSnapshot {
    Linear(Vec<Piece>),
    Rect(Vec<SheetPiece>),
}

/// One completed run. Created once, appended, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub project: Project,
    pub pieces: PieceSnapshot,
    pub result: OptimizationResult,
    pub capacity: u64,
    pub created_at: String,
}

/// One-way message for the leftover-inventory service: this run produced
/// enough offcut material to be worth keeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffcutNotice {
    pub material: Option<String>,
    pub total_waste: u64,
    pub project: String,
}

/// Append-only, insertion-ordered record of completed runs. Appends are
/// serialized behind a mutex; reads hand out snapshots. The inventory
/// notification goes through a bounded channel with `try_send`, so a slow
/// or dead consumer can never stall or fail a recording.
pub struct HistoryLedger {
    entries: Mutex<Vec<HistoryEntry>>,
    next_id: AtomicU64,
    notifier: Option<SyncSender<OffcutNotice>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            notifier: None,
        }
    }

    pub fn with_notifier(notifier: SyncSender<OffcutNotice>) -> Self {
        Self {
            notifier: Some(notifier),
            ..Self::new()
        }
    }

    pub fn record(
        &self,
        project: &Project,
        pieces: PieceSnapshot,
        result: &OptimizationResult,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            project: project.clone(),
            pieces,
            result: result.clone(),
            capacity: project.stock.capacity(),
            created_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        };

        {
            let mut entries = self.entries.lock().expect("history lock poisoned");
            entries.push(entry.clone());
        }

        self.notify_offcuts(project, result);
        entry
    }

    /// Most-recent-first snapshot of the ledger.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().expect("history lock poisoned");
        entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("history lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify_offcuts(&self, project: &Project, result: &OptimizationResult) {
        if !project.send_offcuts_to_inventory || result.total_waste <= project.reuse_threshold {
            return;
        }
        let Some(notifier) = &self.notifier else {
            return;
        };
        let notice = OffcutNotice {
            material: project.material.clone(),
            total_waste: result.total_waste,
            project: project.name.clone(),
        };
        if let Err(err) = notifier.try_send(notice) {
            tracing::warn!("offcut notification dropped: {err}");
        }
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}
