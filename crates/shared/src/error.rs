//! Error types for dbtransfer

use std::path::PathBuf;
use thiserror::Error;

/// Error raised when the selected remote service cannot be used for transfers
#[derive(Debug, Error)]
#[error(
    "Remote service {} cannot be used. Available services: {}",
    describe_selection(.selected),
    describe_services(.available)
)]
pub struct WrongServiceSelectedError {
    pub selected: Option<String>,
    pub available: Vec<String>,
    pub select_command: String,
}

fn describe_selection(selected: &Option<String>) -> String {
    match selected {
        Some(name) => format!("'{}'", name),
        None => "(none selected)".to_string(),
    }
}

fn describe_services(available: &[String]) -> String {
    if available.is_empty() {
        "(unknown)".to_string()
    } else {
        available.join(", ")
    }
}

/// Error raised when an archive belongs to another backup pathway
#[derive(Debug, Error)]
#[error("'{}' looks like a {format} backup, not a remote dump archive", .path.display())]
pub struct FormatMismatchError {
    pub path: PathBuf,
    pub format: String,
    pub alternate_tool: String,
}

/// Error raised when a remote command did not produce what was expected
#[derive(Debug, Error)]
#[error("{summary}")]
pub struct RemoteFailure {
    pub summary: String,
    pub exit_code: Option<i32>,
    /// Captured remote output, shown to the operator as diagnostic
    pub diagnostic: String,
}

/// General transfer error type
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Remote CLI '{program}' is not installed")]
    ToolingMissing { program: String },

    #[error("Remote CLI '{program}' is not authenticated")]
    NotAuthenticated { program: String },

    #[error(transparent)]
    WrongServiceSelected(#[from] WrongServiceSelectedError),

    #[error("Usage: {0}")]
    Usage(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(transparent)]
    FormatMismatch(#[from] FormatMismatchError),

    #[error("Cancelled by operator: {0}")]
    Cancelled(String),

    #[error("Remote command failed: {0}")]
    RemoteCommandFailure(RemoteFailure),

    #[error("Archive '{}' is missing or empty", .path.display())]
    EmptyArchive { path: PathBuf, diagnostic: String },

    #[error("Remote command reported success but {reason}")]
    DisguisedFailure { reason: String, diagnostic: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransferError {
    /// Operator-facing remediation hint
    pub fn remediation(&self) -> Option<String> {
        match self {
            TransferError::ToolingMissing { program } => Some(format!(
                "Install the '{}' CLI and make sure it is on PATH (npm i -g @railway/cli)",
                program
            )),
            TransferError::NotAuthenticated { program } => {
                Some(format!("Log in first: {} login", program))
            }
            TransferError::WrongServiceSelected(e) => Some(format!(
                "Select the application service that holds the database variable: {}",
                e.select_command
            )),
            TransferError::Usage(_) => Some("Run with --help to see usage".to_string()),
            TransferError::FileNotFound(_) => {
                Some("Check the path, or run 'dbtransfer list' to see local archives".to_string())
            }
            TransferError::FormatMismatch(e) => Some(format!("Use {} instead", e.alternate_tool)),
            TransferError::RemoteCommandFailure(_) | TransferError::DisguisedFailure { .. } => Some(
                "Check the remote service logs and the connection variables, then re-run".to_string(),
            ),
            TransferError::EmptyArchive { .. } => {
                Some("The dump produced no data; check that the database name is correct".to_string())
            }
            TransferError::Cancelled(_)
            | TransferError::Config(_)
            | TransferError::Io(_)
            | TransferError::Json(_) => None,
        }
    }

    /// Captured remote output attached to this error, if any
    pub fn diagnostic(&self) -> Option<&str> {
        let text = match self {
            TransferError::RemoteCommandFailure(f) => f.diagnostic.as_str(),
            TransferError::EmptyArchive { diagnostic, .. } => diagnostic.as_str(),
            TransferError::DisguisedFailure { diagnostic, .. } => diagnostic.as_str(),
            _ => return None,
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
