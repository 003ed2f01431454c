//! dbtransfer import command

use super::{console_reporter, remote_session};
use crate::context::GlobalArgs;
use crate::prompt::DialoguerConfirmer;
use clap::Args;
use std::path::PathBuf;
use transfer::{ImportRequest, TransferWorkflow};

#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Archive produced by `dbtransfer export`
    pub path: Option<PathBuf>,

    /// Database the archive was dumped from; defaults to the one in its file name
    #[arg(long = "from-db", value_name = "NAME")]
    pub from_db: Option<String>,

    /// Drop existing collections before restoring
    #[arg(long)]
    pub drop: bool,
}

impl ImportCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = global.load_config()?;
        let session = remote_session(&config, "Restoring into remote database");
        let confirmer = DialoguerConfirmer::default();
        let mut workflow = TransferWorkflow::new(config, &session, &confirmer, console_reporter())?;

        let request = ImportRequest {
            archive: self.path.clone(),
            source_database: self.from_db.clone(),
            drop_existing: self.drop,
        };
        workflow.import(request)?;
        Ok(())
    }
}
