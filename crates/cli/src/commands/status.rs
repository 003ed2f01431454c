//! dbtransfer status command

use super::{console_reporter, remote_session};
use crate::context::GlobalArgs;
use crate::prompt::DialoguerConfirmer;
use clap::Args;
use console::style;
use transfer::TransferWorkflow;

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = global.load_config()?;
        let output_dir = config.output_dir.clone();
        let session = remote_session(&config, "Checking remote");
        let confirmer = DialoguerConfirmer::default();
        let mut workflow = TransferWorkflow::new(config, &session, &confirmer, console_reporter())?;

        let status = workflow.status()?;

        println!("{:<10} {}", style("CLI").bold(), status.program);
        println!("{:<10} {}", style("Service").bold(), status.service);
        println!("{:<10} {}", style("Database").bold(), status.database);
        println!("{:<10} {}", style("Backups").bold(), output_dir.display());
        if !status.available.is_empty() {
            println!("{:<10} {}", style("Services").bold(), status.available.join(", "));
        }
        Ok(())
    }
}
