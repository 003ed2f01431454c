//! dbtransfer verify command

use super::console_reporter;
use crate::context::GlobalArgs;
use clap::Args;
use shared::format_size;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// Local archive to check
    pub path: PathBuf,
}

impl VerifyCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = global.load_config()?;
        let report = transfer::verify_archive(&self.path, &config)?;

        let reporter = console_reporter();
        reporter.success(&format!(
            "{} looks like a usable archive ({})",
            report.path.display(),
            format_size(report.size_bytes)
        ));
        match report.name {
            Some(name) => reporter.detail(&format!(
                "database '{}', platform '{}', created {}",
                name.database,
                name.platform_tag,
                name.created_at.format("%Y-%m-%d %H:%M:%S")
            )),
            None => reporter.warn("File name does not follow the export naming scheme"),
        }
        Ok(())
    }
}
