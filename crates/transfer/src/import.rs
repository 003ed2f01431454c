//! Import path: vet locally, confirm, stream as text, restore remotely

use crate::confirm::{is_confirmed, Confirmer, Prompt};
use crate::script::{self, RestoreScript};
use crate::workflow::{ImportReport, ImportRequest, TransferWorkflow};
use audit::{Direction, Stage, TransferJournal};
use gateway::{RemoteOutput, RemoteSession};
use shared::{
    format_size, ArchiveFormat, ArchiveName, FormatMismatchError, RemoteFailure, Result, TransferError,
};
use std::fs;
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Local archive that passed input validation
struct ValidInput {
    archive: PathBuf,
    size_bytes: u64,
    source_database: String,
}

impl<S: RemoteSession + ?Sized, C: Confirmer + ?Sized> TransferWorkflow<'_, S, C> {
    /// Restore a local archive into the remote database
    pub fn import(&mut self, request: ImportRequest) -> Result<ImportReport> {
        let mut journal = TransferJournal::new(Direction::Import);
        let result = self.run_import(&mut journal, request);
        self.finish(journal, result)
    }

    fn run_import(&self, journal: &mut TransferJournal, request: ImportRequest) -> Result<ImportReport> {
        journal.enter(Stage::ValidateInput);
        let ValidInput {
            archive,
            size_bytes,
            source_database,
        } = self.validate_input(request.archive, request.source_database)?;

        let service = self.preflight(journal)?;
        let database = self.config.database().to_string();

        journal.enter(Stage::Confirm);
        self.confirm(&Prompt::Destructive {
            source_database: source_database.clone(),
            database: database.clone(),
            service: service.clone(),
            archive: archive.clone(),
            size_bytes,
            drop_existing: request.drop_existing,
        })?;
        if size_bytes > self.config.size_threshold_bytes {
            self.confirm(&Prompt::Oversize {
                size_bytes,
                threshold_bytes: self.config.size_threshold_bytes,
            })?;
        }

        journal.enter(Stage::Encode);
        self.reporter
            .step(&format!("Encoding {} ({})", archive.display(), format_size(size_bytes)));
        let artifact = self.encode_artifact(&archive)?;

        journal.enter(Stage::RemoteRestore);
        self.reporter.step(&format!(
            "Restoring into '{}' via service '{}'{}",
            database,
            service,
            if request.drop_existing { " (dropping existing collections)" } else { "" }
        ));
        journal.record_remote_call();
        let executed = fs::read_to_string(artifact.path())
            .map_err(TransferError::from)
            .and_then(|payload| self.restore(&payload, &source_database, request.drop_existing));

        journal.enter(Stage::Cleanup);
        let artifact_path = artifact.path().to_path_buf();
        if let Err(e) = artifact.close() {
            warn!(path = %artifact_path.display(), error = %e, "could not remove encoded artifact");
        }

        let output = executed?;
        self.evaluate_restore(&output)?;

        let remote_output = script::strip_sentinel(&String::from_utf8_lossy(&output.stdout));
        info!(
            archive = %archive.display(),
            size_bytes,
            database = %database,
            source = %source_database,
            "import complete"
        );
        self.reporter.success(&format!("Restored '{}' from {}", database, archive.display()));
        if !remote_output.trim().is_empty() {
            self.reporter.detail(remote_output.trim());
        }

        Ok(ImportReport {
            archive,
            size_bytes,
            source_database,
            database,
            service,
            drop_existing: request.drop_existing,
            remote_output,
        })
    }

    /// Reject bad input before anything remote is touched
    fn validate_input(&self, archive: Option<PathBuf>, source_database: Option<String>) -> Result<ValidInput> {
        let archive = archive.ok_or_else(|| {
            TransferError::Usage("dbtransfer import <path> [--from-db <name>] [--drop]".to_string())
        })?;

        let meta = fs::metadata(&archive).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TransferError::FileNotFound(archive.clone()),
            _ => TransferError::Io(e),
        })?;
        if meta.is_dir() {
            return Err(TransferError::Usage(format!(
                "{} is a directory; pass an archive file",
                archive.display()
            )));
        }

        match ArchiveFormat::detect(&archive, &self.config) {
            ArchiveFormat::Remote => {}
            ArchiveFormat::Alternate(format) => {
                return Err(FormatMismatchError {
                    path: archive,
                    format,
                    alternate_tool: self.config.alternate_tool.clone(),
                }
                .into());
            }
            ArchiveFormat::Unknown => {
                self.reporter.warn(&format!(
                    "{} does not end in .{}; importing anyway",
                    archive.display(),
                    self.config.extension()
                ));
            }
        }

        if meta.len() == 0 {
            return Err(TransferError::EmptyArchive {
                path: archive,
                diagnostic: String::new(),
            });
        }

        let source_database = source_database
            .map(|db| db.trim().to_string())
            .filter(|db| !db.is_empty())
            .or_else(|| {
                archive
                    .file_name()
                    .and_then(|n| ArchiveName::parse(&n.to_string_lossy()))
                    .map(|name| name.database)
            })
            .ok_or_else(|| {
                TransferError::Usage(format!(
                    "cannot tell which database {} was dumped from; pass --from-db <name>",
                    archive.display()
                ))
            })?;
        if source_database != self.config.database() {
            self.reporter.warn(&format!(
                "Archive holds database '{}'; it will be restored as '{}'",
                source_database,
                self.config.database()
            ));
        }

        Ok(ValidInput {
            size_bytes: meta.len(),
            archive,
            source_database,
        })
    }

    fn confirm(&self, prompt: &Prompt) -> Result<()> {
        let token = &self.config.confirm_token;
        let answer = self.confirmer.ask(prompt, token)?;
        if is_confirmed(&answer, token) {
            return Ok(());
        }
        debug!(answer = answer.trim(), "confirmation declined");
        let what = match prompt {
            Prompt::Destructive { .. } => "import not confirmed",
            Prompt::Oversize { .. } => "oversize import not confirmed",
        };
        Err(TransferError::Cancelled(what.to_string()))
    }

    /// Base64 text of the archive in a scratch file, removed when dropped
    fn encode_artifact(&self, archive: &Path) -> Result<NamedTempFile> {
        let dir = self
            .config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        fs::create_dir_all(&dir)?;

        let artifact = tempfile::Builder::new()
            .prefix("dbtransfer-")
            .suffix(".b64")
            .tempfile_in(&dir)?;
        let input = fs::File::open(archive)?;
        let written = script::encode_payload(input, BufWriter::new(artifact.as_file()))?;
        debug!(path = %artifact.path().display(), bytes = written, "encoded artifact");
        Ok(artifact)
    }

    fn restore(&self, payload: &str, source_database: &str, drop_existing: bool) -> Result<RemoteOutput> {
        let id = Uuid::new_v4();
        let remote_path = format!(
            "{}/dbtransfer-{}.{}",
            self.config.remote_tmp_dir.trim_end_matches('/'),
            id,
            self.config.extension()
        );
        let delimiter = format!("DBTRANSFER_PAYLOAD_{}", id.simple());

        let command = RestoreScript {
            remote_path: &remote_path,
            delimiter: &delimiter,
            payload,
            source_database,
            drop_existing,
        }
        .render(&self.config);
        debug!(remote_path, script_bytes = command.len(), "sending restore");
        self.session.execute(&command)
    }

    /// Gates, in order: exit status, completion sentinel
    fn evaluate_restore(&self, output: &RemoteOutput) -> Result<()> {
        if !output.success() {
            return Err(TransferError::RemoteCommandFailure(RemoteFailure {
                summary: match output.exit_code {
                    Some(script::EXIT_BAD_PAYLOAD) => "remote side could not decode the archive payload".to_string(),
                    Some(script::EXIT_NO_URI) => "no connection URI in the service environment".to_string(),
                    Some(code) => format!("restore exited with status {}", code),
                    None => "restore was terminated by a signal".to_string(),
                },
                exit_code: output.exit_code,
                diagnostic: output.diagnostic(),
            }));
        }
        if !script::restore_completed(&output.stdout) {
            return Err(TransferError::DisguisedFailure {
                reason: "the restore did not report completion".to_string(),
                diagnostic: output.diagnostic(),
            });
        }
        Ok(())
    }
}
