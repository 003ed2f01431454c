//! TransferJournal - stage trace of one invocation

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Which workflow an invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Export,
    Import,
    Status,
}

/// States of the transfer state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    ToolingCheck,
    ServiceBindingCheck,
    Dump,
    ValidateOutput,
    ValidateInput,
    Confirm,
    Encode,
    RemoteRestore,
    Cleanup,
    Succeeded,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Succeeded | Stage::Failed)
    }

    /// Stages that may directly follow `self`
    ///
    /// `Failed` may follow any non-terminal stage. Import validates its local
    /// input before touching the remote CLI.
    pub fn successors(self, direction: Direction) -> &'static [Stage] {
        use Stage::*;
        match (direction, self) {
            (_, Succeeded) | (_, Failed) => &[],
            (Direction::Import, Init) => &[ValidateInput, Failed],
            (_, Init) => &[ToolingCheck, Failed],
            (Direction::Import, ValidateInput) => &[ToolingCheck, Failed],
            (_, ToolingCheck) => &[ServiceBindingCheck, Failed],
            (Direction::Export, ServiceBindingCheck) => &[Dump, Failed],
            (Direction::Import, ServiceBindingCheck) => &[Confirm, Failed],
            (Direction::Status, ServiceBindingCheck) => &[Succeeded, Failed],
            (Direction::Export, Dump) => &[ValidateOutput, Failed],
            (Direction::Export, ValidateOutput) => &[Succeeded, Failed],
            (Direction::Import, Confirm) => &[Encode, Failed],
            (Direction::Import, Encode) => &[RemoteRestore, Failed],
            (Direction::Import, RemoteRestore) => &[Cleanup, Failed],
            (Direction::Import, Cleanup) => &[Succeeded, Failed],
            _ => &[Failed],
        }
    }
}

/// One journal entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub stage: Stage,
    pub note: Option<String>,
}

/// Summary of a finished (or running) invocation
#[derive(Debug, Clone)]
pub struct JournalStats {
    pub entries: usize,
    pub remote_calls: usize,
    pub out_of_order: usize,
}

/// Journal of stage transitions
#[derive(Debug)]
pub struct TransferJournal {
    direction: Direction,
    entries: VecDeque<JournalEntry>,
    max_entries: usize,
    remote_calls: usize,
    out_of_order: usize,
}

impl TransferJournal {
    /// Start a journal in `Init`
    pub fn new(direction: Direction) -> Self {
        Self::with_capacity(direction, 64)
    }

    pub fn with_capacity(direction: Direction, max_entries: usize) -> Self {
        let mut journal = Self {
            direction,
            entries: VecDeque::with_capacity(max_entries.min(64)),
            max_entries: max_entries.max(1),
            remote_calls: 0,
            out_of_order: 0,
        };
        journal.push(Stage::Init, None);
        journal
    }

    fn push(&mut self, stage: Stage, note: Option<String>) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            timestamp: Utc::now(),
            stage,
            note,
        });
    }

    /// Move to `stage`; unexpected transitions are recorded and logged
    pub fn enter(&mut self, stage: Stage) {
        self.enter_with_note(stage, None);
    }

    pub fn enter_with_note(&mut self, stage: Stage, note: Option<String>) {
        let current = self.current();
        if !current.successors(self.direction).contains(&stage) {
            self.out_of_order += 1;
            warn!(?current, next = ?stage, direction = ?self.direction, "unexpected stage transition");
        }
        debug!(?stage, direction = ?self.direction, "stage");
        self.push(stage, note);
    }

    /// Count a data-moving remote command
    pub fn record_remote_call(&mut self) {
        self.remote_calls += 1;
    }

    pub fn succeed(&mut self) {
        self.enter(Stage::Succeeded);
    }

    pub fn fail(&mut self, reason: &str) {
        if self.current().is_terminal() {
            return;
        }
        self.enter_with_note(Stage::Failed, Some(reason.to_string()));
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current(&self) -> Stage {
        self.entries.back().map(|e| e.stage).unwrap_or(Stage::Init)
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.entries.iter().map(|e| e.stage).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn remote_calls(&self) -> usize {
        self.remote_calls
    }

    pub fn get_stats(&self) -> JournalStats {
        JournalStats {
            entries: self.entries.len(),
            remote_calls: self.remote_calls,
            out_of_order: self.out_of_order,
        }
    }

    /// Export as JSON, for debug logging
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }
}
