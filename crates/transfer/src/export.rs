//! Export path: dump remotely, write locally, validate

use crate::catalog::marker_failure;
use crate::confirm::Confirmer;
use crate::script;
use crate::workflow::{ExportReport, TransferWorkflow};
use audit::{Direction, Stage, TransferJournal};
use chrono::{Local, NaiveDateTime};
use gateway::{RemoteOutput, RemoteSession};
use shared::{format_size, ArchiveName, Outcome, RemoteFailure, Result, TransferError};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

impl<S: RemoteSession + ?Sized, C: Confirmer + ?Sized> TransferWorkflow<'_, S, C> {
    /// Dump the remote database into a new local archive
    pub fn export(&mut self) -> Result<ExportReport> {
        self.export_at(Local::now().naive_local())
    }

    /// Same as [`export`](Self::export) with an explicit timestamp for the filename
    pub fn export_at(&mut self, now: NaiveDateTime) -> Result<ExportReport> {
        let mut journal = TransferJournal::new(Direction::Export);
        let result = self.run_export(&mut journal, now);
        self.finish(journal, result)
    }

    fn run_export(&self, journal: &mut TransferJournal, now: NaiveDateTime) -> Result<ExportReport> {
        let service = self.preflight(journal)?;
        let database = self.config.database().to_string();

        journal.enter(Stage::Dump);
        let name = ArchiveName::new(&database, &self.config.platform_tag, now, self.config.extension());
        fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join(name.file_name());

        self.reporter.step(&format!(
            "Dumping '{}' from service '{}' to {}",
            database,
            service,
            path.display()
        ));
        journal.record_remote_call();
        let output = self.session.execute(&script::dump_script(&self.config))?;
        write_archive(&path, &output.stdout)?;

        journal.enter(Stage::ValidateOutput);
        if let Err(e) = self.validate_export(&path, &output) {
            discard(&path);
            self.reporter.warn(&format!("Removed incomplete archive {}", path.display()));
            return Err(e);
        }

        let size_bytes = fs::metadata(&path)?.len();
        info!(path = %path.display(), size_bytes, "export complete");
        self.reporter
            .success(&format!("Archive saved: {} ({})", path.display(), format_size(size_bytes)));

        Ok(ExportReport {
            path,
            size_bytes,
            database,
            service,
        })
    }

    /// Gates, in order: exit status, non-empty file, no failure markers
    ///
    /// Markers are checked on the captured stdout, which is exactly what was
    /// written; an empty capture never carries a marker, so the order holds.
    fn validate_export(&self, path: &Path, output: &RemoteOutput) -> Result<()> {
        match Outcome::classify(output.success(), output.exit_code, &output.stdout, &self.markers) {
            Outcome::HardFailure { exit_code } => Err(TransferError::RemoteCommandFailure(RemoteFailure {
                summary: match exit_code {
                    Some(script::EXIT_NO_URI) => "no connection URI in the service environment".to_string(),
                    Some(code) => format!("dump exited with status {}", code),
                    None => "dump was terminated by a signal".to_string(),
                },
                exit_code,
                diagnostic: output.diagnostic(),
            })),
            Outcome::SoftFailure { marker } => Err(marker_failure(&marker, &output.stdout)),
            Outcome::Success => {
                let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                if size == 0 {
                    return Err(TransferError::EmptyArchive {
                        path: path.to_path_buf(),
                        diagnostic: output.diagnostic(),
                    });
                }
                Ok(())
            }
        }
    }
}

fn write_archive(path: &Path, content: &[u8]) -> Result<()> {
    let written = fs::File::create(path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = written {
        discard(path);
        return Err(e.into());
    }
    Ok(())
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "could not remove archive");
        }
    }
}
