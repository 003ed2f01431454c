//! TransferWorkflow - export/import orchestration

use crate::confirm::Confirmer;
use audit::{Direction, Stage, TransferJournal};
use gateway::RemoteSession;
use shared::{FailureMarkers, Result, StatusReporter, TransferConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub database: String,
    pub service: String,
}

/// What to import
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub archive: Option<PathBuf>,
    /// Database the archive was dumped from; read from the file name when unset
    pub source_database: Option<String>,
    /// Drop existing collections before restoring
    pub drop_existing: bool,
}

impl ImportRequest {
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: Some(archive.into()),
            source_database: None,
            drop_existing: false,
        }
    }

    pub fn with_source(mut self, database: impl Into<String>) -> Self {
        self.source_database = Some(database.into());
        self
    }

    pub fn with_drop(mut self, drop_existing: bool) -> Self {
        self.drop_existing = drop_existing;
        self
    }
}

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub archive: PathBuf,
    pub size_bytes: u64,
    pub source_database: String,
    pub database: String,
    pub service: String,
    pub drop_existing: bool,
    /// Remote output, sentinel removed
    pub remote_output: String,
}

/// Result of the precondition checks
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub program: String,
    pub service: String,
    pub available: Vec<String>,
    pub database: String,
}

/// The transfer workflow, bound to one remote session and one operator
pub struct TransferWorkflow<'a, S: RemoteSession + ?Sized, C: Confirmer + ?Sized> {
    pub(crate) config: TransferConfig,
    pub(crate) session: &'a S,
    pub(crate) confirmer: &'a C,
    pub(crate) reporter: Arc<dyn StatusReporter>,
    pub(crate) markers: FailureMarkers,
    last_journal: Option<TransferJournal>,
}

impl<'a, S: RemoteSession + ?Sized, C: Confirmer + ?Sized> TransferWorkflow<'a, S, C> {
    /// Create a workflow; fails on an unusable configuration
    pub fn new(
        config: TransferConfig,
        session: &'a S,
        confirmer: &'a C,
        reporter: Arc<dyn StatusReporter>,
    ) -> Result<Self> {
        config.validate()?;
        let markers = FailureMarkers::new(&config.failure_markers)?;
        Ok(Self {
            config,
            session,
            confirmer,
            reporter,
            markers,
            last_journal: None,
        })
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Journal of the most recent invocation
    pub fn last_journal(&self) -> Option<&TransferJournal> {
        self.last_journal.as_ref()
    }

    /// Run the preconditions only and describe the remote binding
    pub fn status(&mut self) -> Result<StatusReport> {
        let mut journal = TransferJournal::new(Direction::Status);
        let result = self.run_status(&mut journal);
        self.finish(journal, result)
    }

    fn run_status(&self, journal: &mut TransferJournal) -> Result<StatusReport> {
        let service = self.preflight(journal)?;
        let available = self.session.available_services().unwrap_or_default();
        Ok(StatusReport {
            program: self.session.program().to_string(),
            service,
            available,
            database: self.config.database().to_string(),
        })
    }

    /// Close the journal with the invocation's result
    pub(crate) fn finish<T>(&mut self, mut journal: TransferJournal, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => journal.succeed(),
            Err(e) => journal.fail(&e.to_string()),
        }
        debug!(
            direction = ?journal.direction(),
            remote_calls = journal.remote_calls(),
            journal = %journal.export_json(),
            "invocation finished"
        );
        debug_assert!(journal.current() == Stage::Succeeded || journal.current() == Stage::Failed);
        self.last_journal = Some(journal);
        result
    }
}
