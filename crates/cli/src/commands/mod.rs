//! CLI Commands

pub mod export;
pub mod import;
pub mod list;
pub mod status;
pub mod verify;

pub use export::ExportCommand;
pub use import::ImportCommand;
pub use list::ListCommand;
pub use status::StatusCommand;
pub use verify::VerifyCommand;

use crate::spinner::SpinnerSession;
use gateway::RemoteCli;
use shared::{ConsoleReporter, StatusReporter, TransferConfig};
use std::sync::Arc;

fn console_reporter() -> Arc<dyn StatusReporter> {
    Arc::new(ConsoleReporter)
}

/// Remote CLI session with a spinner while commands run
fn remote_session(config: &TransferConfig, message: &str) -> SpinnerSession {
    SpinnerSession::new(RemoteCli::new(config.channel.clone()), message)
}
