//! Global options and configuration loading

use clap::Args;
use shared::{TransferConfig, TransferError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "dbtransfer.json";

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Target database name
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Local directory for archives
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Defaults < config file < environment < flags
    pub fn load_config(&self) -> Result<TransferConfig, TransferError> {
        self.resolve(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
    }

    fn resolve<F>(&self, fallback_file: &Path, lookup: F) -> Result<TransferConfig, TransferError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match &self.config {
            Some(path) => TransferConfig::from_file(path)
                .map_err(|e| TransferError::Config(format!("{}: {}", path.display(), e)))?,
            None if fallback_file.is_file() => {
                debug!(path = %fallback_file.display(), "using config file from working directory");
                TransferConfig::from_file(fallback_file)
                    .map_err(|e| TransferError::Config(format!("{}: {}", fallback_file.display(), e)))?
            }
            None => TransferConfig::default(),
        };

        let mut config = base.with_env_overrides(lookup);
        if let Some(db) = &self.db {
            config.database_name = db.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}
