//! Configuration types for dbtransfer

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Database name used when nothing else is configured
pub const DEFAULT_DATABASE: &str = "miniapp";

/// Size above which an import asks for a second confirmation (100 MB)
pub const DEFAULT_SIZE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Kept below the kernel's single-argument limit (128 KiB on Linux)
pub const DEFAULT_MAX_INLINE_SCRIPT: usize = 64 * 1024;

/// How the remote CLI is invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelConfig {
    /// Remote CLI executable
    pub program: String,

    /// Arguments placed before `sh -c <script>` to run inside the selected service
    pub exec_args: Vec<String>,

    /// Longest script passed as an argument; larger ones go through stdin (`sh -s`)
    pub max_inline_script: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            program: "railway".to_string(),
            exec_args: vec!["ssh".to_string(), "--".to_string()],
            max_inline_script: DEFAULT_MAX_INLINE_SCRIPT,
        }
    }
}

/// Everything the transfer workflow needs, passed in explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferConfig {
    /// Target database name
    pub database_name: String,

    /// Connection URI variables, checked in order on the remote side
    pub uri_variables: Vec<String>,

    /// Local directory holding all archives
    pub output_dir: PathBuf,

    /// Platform tag embedded in archive filenames
    pub platform_tag: String,

    /// Extension of archives produced by the remote dump tool
    pub archive_extension: String,

    /// Extensions produced by the admin panel backup endpoints
    pub alternate_extensions: Vec<String>,

    /// Where operators should take alternate-format backups instead
    pub alternate_tool: String,

    /// Import size above which a second confirmation is required
    pub size_threshold_bytes: u64,

    /// Case-insensitive substrings that mark captured output as an error transcript
    pub failure_markers: Vec<String>,

    /// Service names that host the database itself and must never be targeted
    pub database_service_names: Vec<String>,

    pub dump_program: String,
    pub restore_program: String,

    /// Remote directory for the decoded archive during import
    pub remote_tmp_dir: String,

    /// Exact answer accepted at confirmation prompts
    pub confirm_token: String,

    /// Local directory for the transient base64 artifact; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,

    pub channel: ChannelConfig,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE.to_string(),
            uri_variables: vec!["MONGO_URL".to_string(), "MONGO_URI".to_string()],
            output_dir: PathBuf::from("backups"),
            platform_tag: "railway".to_string(),
            archive_extension: "archive".to_string(),
            alternate_extensions: vec![
                ".tar.gz".to_string(),
                ".json.gz".to_string(),
                ".json".to_string(),
            ],
            alternate_tool: "the admin panel backup import (POST /admin/backup/import)".to_string(),
            size_threshold_bytes: DEFAULT_SIZE_THRESHOLD,
            failure_markers: vec![
                "error".to_string(),
                "failed".to_string(),
                "not found".to_string(),
            ],
            database_service_names: vec!["MongoDB".to_string(), "Mongo".to_string()],
            dump_program: "mongodump".to_string(),
            restore_program: "mongorestore".to_string(),
            remote_tmp_dir: "/tmp".to_string(),
            confirm_token: "yes".to_string(),
            scratch_dir: None,
            channel: ChannelConfig::default(),
        }
    }
}

impl TransferConfig {
    /// Load configuration from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides through an injected lookup
    ///
    /// Recognized keys: `MONGO_DB`, `BACKUP_DIR`, `DBTRANSFER_REMOTE_CLI`.
    /// Empty values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(db) = get("MONGO_DB") {
            self.database_name = db;
        }
        if let Some(dir) = get("BACKUP_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(program) = get("DBTRANSFER_REMOTE_CLI") {
            self.channel.program = program;
        }
        self
    }

    /// Reject configurations the workflow cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.uri_variables.is_empty() {
            return Err(crate::TransferError::Config(
                "uriVariables must name at least one variable".to_string(),
            ));
        }
        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
            .map_err(|e| crate::TransferError::Config(e.to_string()))?;
        if let Some(bad) = self.uri_variables.iter().find(|v| !identifier.is_match(v)) {
            return Err(crate::TransferError::Config(format!(
                "uriVariables entry '{}' is not a valid environment variable name",
                bad
            )));
        }
        if self.confirm_token.trim().is_empty() {
            return Err(crate::TransferError::Config("confirmToken must not be empty".to_string()));
        }
        if self.failure_markers.iter().all(|m| m.is_empty()) {
            return Err(crate::TransferError::Config(
                "failureMarkers must contain at least one marker".to_string(),
            ));
        }
        if self.size_threshold_bytes == 0 {
            return Err(crate::TransferError::Config(
                "sizeThresholdBytes must be greater than zero".to_string(),
            ));
        }
        if self.archive_extension.trim_start_matches('.').is_empty() {
            return Err(crate::TransferError::Config("archiveExtension must not be empty".to_string()));
        }
        if self.channel.program.trim().is_empty() {
            return Err(crate::TransferError::Config("channel.program must not be empty".to_string()));
        }
        Ok(())
    }

    /// Target database, falling back to the default when blank
    pub fn database(&self) -> &str {
        match self.database_name.trim() {
            "" => DEFAULT_DATABASE,
            name => name,
        }
    }

    /// Archive extension without a leading dot
    pub fn extension(&self) -> &str {
        self.archive_extension.trim_start_matches('.')
    }

    /// Whether a remote service name refers to the database host itself
    pub fn is_database_service(&self, service: &str) -> bool {
        let service = service.trim();
        self.database_service_names
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.database_name, "miniapp");
        assert_eq!(config.uri_variables, vec!["MONGO_URL", "MONGO_URI"]);
        assert_eq!(config.size_threshold_bytes, 100 * 1024 * 1024);
        assert_eq!(config.extension(), "archive");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_partial() {
        let json = r#"{
            "databaseName": "shop",
            "outputDir": "/var/backups",
            "channel": { "program": "rw" }
        }"#;

        let config: TransferConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.database_name, "shop");
        assert_eq!(config.output_dir, PathBuf::from("/var/backups"));
        assert_eq!(config.channel.program, "rw");
        assert_eq!(config.channel.exec_args, vec!["ssh", "--"]);
        assert_eq!(config.platform_tag, "railway");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbtransfer.json");
        std::fs::write(&path, r#"{ "sizeThresholdBytes": 1024 }"#).unwrap();

        let config = TransferConfig::from_file(&path).unwrap();
        assert_eq!(config.size_threshold_bytes, 1024);
    }

    #[test]
    fn test_from_file_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = TransferConfig::from_file(&path);
        assert!(matches!(result, Err(crate::TransferError::Json(_))));
    }

    // ============== Environment Overrides ==============

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MONGO_DB", "shop"),
            ("BACKUP_DIR", "/srv/dumps"),
            ("DBTRANSFER_REMOTE_CLI", "/opt/railway"),
        ]
        .into_iter()
        .collect();

        let config = TransferConfig::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_name, "shop");
        assert_eq!(config.output_dir, PathBuf::from("/srv/dumps"));
        assert_eq!(config.channel.program, "/opt/railway");
    }

    #[test]
    fn test_env_overrides_ignore_blank_values() {
        let config = TransferConfig::default()
            .with_env_overrides(|key| (key == "MONGO_DB").then(|| "   ".to_string()));
        assert_eq!(config.database_name, DEFAULT_DATABASE);
    }

    // ============== Validation ==============

    #[test]
    fn test_blank_database_falls_back_to_default() {
        let config = TransferConfig {
            database_name: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.database(), "miniapp");
    }

    #[test]
    fn test_validate_rejects_missing_uri_variables() {
        let config = TransferConfig {
            uri_variables: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_identifier_variables() {
        let config = TransferConfig {
            uri_variables: vec!["MONGO_URL".to_string(), "MONGO-URI; rm -rf /".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MONGO-URI"));
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let config = TransferConfig {
            size_threshold_bytes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_service_is_case_insensitive() {
        let config = TransferConfig::default();
        assert!(config.is_database_service("mongodb"));
        assert!(config.is_database_service(" MongoDB "));
        assert!(!config.is_database_service("backend"));
    }
}
