//! # dbtransfer Gateway
//!
//! The only way the workflow reaches the remote side: a text command channel
//! plus a directory of remote services, and the CLI-backed adapter for both.

mod channel;
mod remote_cli;

pub use channel::{RemoteChannel, RemoteOutput, RemoteSession, ServiceDirectory, ToolingStatus};
pub use remote_cli::{parse_selected_service, parse_service_names, RemoteCli};
