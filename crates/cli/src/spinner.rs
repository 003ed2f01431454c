//! Spinner around long-running remote commands

use gateway::{RemoteChannel, RemoteCli, RemoteOutput, ServiceDirectory, ToolingStatus};
use indicatif::{ProgressBar, ProgressStyle};
use shared::Result;
use std::time::Duration;

/// Shows elapsed time while a remote command runs; otherwise delegates
pub struct SpinnerSession {
    inner: RemoteCli,
    message: String,
}

impl SpinnerSession {
    pub fn new(inner: RemoteCli, message: impl Into<String>) -> Self {
        Self {
            inner,
            message: message.into(),
        }
    }

    fn spinner(&self) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
            pb.set_style(style);
        }
        pb.set_message(self.message.clone());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

impl RemoteChannel for SpinnerSession {
    fn execute(&self, command: &str) -> Result<RemoteOutput> {
        let pb = self.spinner();
        let result = self.inner.execute(command);
        pb.finish_and_clear();
        result
    }
}

impl ServiceDirectory for SpinnerSession {
    fn check_tooling(&self) -> ToolingStatus {
        self.inner.check_tooling()
    }

    fn selected_service(&self) -> Result<Option<String>> {
        self.inner.selected_service()
    }

    fn available_services(&self) -> Result<Vec<String>> {
        self.inner.available_services()
    }

    fn select_command(&self) -> String {
        self.inner.select_command()
    }

    fn program(&self) -> &str {
        self.inner.program()
    }
}
