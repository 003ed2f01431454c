//! dbtransfer list command

use crate::context::GlobalArgs;
use clap::Args;
use console::style;
use shared::{format_size, ArchiveFormat};

#[derive(Debug, Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let config = global.load_config()?;
        let entries = transfer::list_archives(&config)?;

        if entries.is_empty() {
            println!("No archives in {}", config.output_dir.display());
            return Ok(());
        }

        println!(
            "{:<19}  {:>10}  {}",
            style("CREATED").bold(),
            style("SIZE").bold(),
            style("FILE").bold()
        );
        for entry in &entries {
            let created = entry
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            let file = entry
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let note = match &entry.format {
                ArchiveFormat::Remote => String::new(),
                ArchiveFormat::Alternate(_) => format!("  {}", style("(admin panel backup)").dim()),
                ArchiveFormat::Unknown => format!("  {}", style("(unrecognized)").dim()),
            };
            println!("{:<19}  {:>10}  {}{}", created, format_size(entry.size_bytes), file, note);
        }
        Ok(())
    }
}
