//! dbtransfer export command

use super::{console_reporter, remote_session};
use crate::context::GlobalArgs;
use crate::prompt::DialoguerConfirmer;
use clap::Args;
use console::style;
use std::path::Path;
use transfer::script::shell_quote;
use transfer::TransferWorkflow;

#[derive(Debug, Args)]
pub struct ExportCommand {}

impl ExportCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = global.load_config()?;
        let session = remote_session(&config, "Dumping remote database");
        let confirmer = DialoguerConfirmer::default();
        let reporter = console_reporter();
        let mut workflow = TransferWorkflow::new(config, &session, &confirmer, reporter.clone())?;

        let report = workflow.export()?;

        reporter.detail(&format!(
            "Restore with: {}",
            style(companion_command(global, &report.database, &report.path)).bold()
        ));
        println!("{}", report.path.display());
        Ok(())
    }
}

/// Import invocation that restores `path` with the same settings the export ran with
///
/// `database` is the resolved name, so environment overrides carry over as `--db`.
fn companion_command(global: &GlobalArgs, database: &str, path: &Path) -> String {
    let mut words = vec!["dbtransfer".to_string()];
    if let Some(config) = &global.config {
        words.push("--config".to_string());
        words.push(shell_word(&config.to_string_lossy()));
    }
    words.push("--db".to_string());
    words.push(shell_word(database));
    if let Some(dir) = &global.output_dir {
        words.push("--output-dir".to_string());
        words.push(shell_word(&dir.to_string_lossy()));
    }
    words.push("import".to_string());
    words.push(shell_word(&path.to_string_lossy()));
    words.push("--drop".to_string());
    words.join(" ")
}

/// Quote only when the shell would otherwise split or expand the value
fn shell_word(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if plain {
        value.to_string()
    } else {
        shell_quote(value)
    }
}
