//! Ports for reaching the remote environment

use shared::{diagnostic_text, Result};

/// Captured result of one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl RemoteOutput {
    pub fn new(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>, exit_code: Option<i32>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Combined stdout and stderr as lossy text, truncated for display
    pub fn diagnostic(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with(b"\n") {
                combined.push(b'\n');
            }
            combined.extend_from_slice(&self.stderr);
        }
        diagnostic_text(&combined)
    }
}

/// Runs a shell command text inside the selected remote service
///
/// The service's environment variables are visible to the command.
pub trait RemoteChannel {
    fn execute(&self, command: &str) -> Result<RemoteOutput>;
}

/// State of the local remote-CLI installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolingStatus {
    Ready,
    Missing,
    NotAuthenticated,
}

/// Read-only view of the remote project: tooling and service selection
pub trait ServiceDirectory {
    fn check_tooling(&self) -> ToolingStatus;

    /// Currently selected service, `None` when nothing is linked
    fn selected_service(&self) -> Result<Option<String>>;

    fn available_services(&self) -> Result<Vec<String>>;

    /// Command an operator runs to change the selection
    fn select_command(&self) -> String;

    /// Name of the remote CLI, for messages
    fn program(&self) -> &str;
}

/// Everything the workflow needs from the remote side
pub trait RemoteSession: RemoteChannel + ServiceDirectory {}

impl<T: RemoteChannel + ServiceDirectory + ?Sized> RemoteSession for T {}
