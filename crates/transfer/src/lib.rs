//! # dbtransfer Transfer
//!
//! Export and import of database archives through a text-only remote
//! command channel.
//!
//! ```text
//! Init → ToolingCheck → ServiceBindingCheck
//!   export: → Dump → ValidateOutput
//!   import: → Confirm → Encode → RemoteRestore → Cleanup
//! → Succeeded | Failed
//! ```
//!
//! Import validates its local input right after `Init`, before the remote
//! CLI is consulted.

pub mod catalog;
pub mod confirm;
pub mod script;
mod export;
mod import;
mod preflight;
mod workflow;

pub use catalog::{check_archive, list_archives, verify_archive, ArchiveEntry, VerifyReport};
pub use confirm::{Confirmer, Prompt, ScriptedConfirmer};
pub use workflow::{ExportReport, ImportReport, ImportRequest, StatusReport, TransferWorkflow};

// Re-export dependencies
pub use audit::{Direction, Stage, TransferJournal};
pub use gateway::{RemoteChannel, RemoteCli, RemoteOutput, RemoteSession, ServiceDirectory, ToolingStatus};
