//! RemoteCli - remote execution through the platform CLI

use crate::channel::{RemoteChannel, RemoteOutput, ServiceDirectory, ToolingStatus};
use shared::{ChannelConfig, Result, TransferError};
use std::io::{ErrorKind, Write};
use std::process::{Command, Output, Stdio};
use std::thread;
use tracing::{debug, warn};

/// Adapter over the platform CLI (`railway` by default)
///
/// Remote commands run as `<program> <exec_args..> sh -c <script>`.
#[derive(Debug, Clone)]
pub struct RemoteCli {
    config: ChannelConfig,
}

impl RemoteCli {
    pub fn new(config: ChannelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run a local CLI subcommand (status, whoami, ...)
    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(program = %self.config.program, ?args, "running remote CLI");
        self.command().args(args).output().map_err(|e| self.spawn_error(e))
    }

    fn spawn_error(&self, e: std::io::Error) -> TransferError {
        if e.kind() == ErrorKind::NotFound {
            TransferError::ToolingMissing {
                program: self.config.program.clone(),
            }
        } else {
            TransferError::Io(e)
        }
    }
}

impl RemoteChannel for RemoteCli {
    fn execute(&self, command: &str) -> Result<RemoteOutput> {
        let inline = command.len() <= self.config.max_inline_script;
        debug!(
            program = %self.config.program,
            script_bytes = command.len(),
            inline,
            "executing remote command"
        );

        let output = if inline {
            self.command()
                .args(&self.config.exec_args)
                .arg("sh")
                .arg("-c")
                .arg(command)
                .output()
                .map_err(|e| self.spawn_error(e))?
        } else {
            self.execute_piped(command)?
        };

        let result = RemoteOutput::new(output.stdout, output.stderr, output.status.code());
        debug!(
            exit_code = ?result.exit_code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "remote command finished"
        );
        Ok(result)
    }
}

impl RemoteCli {
    /// Feed the script to `sh -s` on stdin while capturing output
    fn execute_piped(&self, command: &str) -> Result<Output> {
        let mut child = self
            .command()
            .args(&self.config.exec_args)
            .arg("sh")
            .arg("-s")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdin = child.stdin.take();
        let script = command.as_bytes().to_vec();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&script)?;
            }
            Ok(())
        });

        let output = child.wait_with_output()?;
        match writer.join() {
            Ok(Ok(())) => {}
            // The remote side may exit before reading everything; its status says why
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("remote shell closed stdin early");
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(TransferError::Io(std::io::Error::new(
                    ErrorKind::Other,
                    "stdin writer panicked",
                )))
            }
        }
        Ok(output)
    }
}

impl ServiceDirectory for RemoteCli {
    fn check_tooling(&self) -> ToolingStatus {
        match self.command().arg("--version").output() {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                debug!(status = ?output.status.code(), "remote CLI --version failed");
                return ToolingStatus::Missing;
            }
            Err(e) => {
                debug!(error = %e, "remote CLI not runnable");
                return ToolingStatus::Missing;
            }
        }

        match self.run(&["whoami"]) {
            Ok(output) if output.status.success() => ToolingStatus::Ready,
            Ok(_) => ToolingStatus::NotAuthenticated,
            Err(e) => {
                warn!(error = %e, "whoami could not be run");
                ToolingStatus::NotAuthenticated
            }
        }
    }

    fn selected_service(&self) -> Result<Option<String>> {
        let output = self.run(&["status"])?;
        if !output.status.success() {
            // An unlinked project makes `status` fail; treat it as no selection
            debug!(stderr = %String::from_utf8_lossy(&output.stderr), "status failed");
            return Ok(None);
        }
        Ok(parse_selected_service(&String::from_utf8_lossy(&output.stdout)))
    }

    fn available_services(&self) -> Result<Vec<String>> {
        let output = self.run(&["status", "--json"])?;
        if !output.status.success() {
            return Ok(Vec::new());
        }
        match serde_json::from_slice::<serde_json::Value>(&output.stdout) {
            Ok(value) => Ok(parse_service_names(&value)),
            Err(e) => {
                warn!(error = %e, "could not parse service list");
                Ok(Vec::new())
            }
        }
    }

    fn select_command(&self) -> String {
        format!("{} service", self.config.program)
    }

    fn program(&self) -> &str {
        &self.config.program
    }
}

/// Extract the `Service: <name>` line from human-readable status output
pub fn parse_selected_service(status: &str) -> Option<String> {
    status.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("service") {
            return None;
        }
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Collect service names from JSON status output
///
/// Accepts both `services: [{name}]` and GraphQL-style
/// `services: {edges: [{node: {name}}]}`, at any depth.
pub fn parse_service_names(value: &serde_json::Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_service_names(value, &mut names);
    names
}

fn collect_service_names(value: &serde_json::Value, names: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                if key == "services" {
                    push_service_entries(child, names);
                } else {
                    collect_service_names(child, names);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_service_names(item, names);
            }
        }
        _ => {}
    }
}

fn push_service_entries(services: &serde_json::Value, names: &mut Vec<String>) {
    let entries: Vec<&serde_json::Value> = match services {
        serde_json::Value::Array(items) => items.iter().collect(),
        serde_json::Value::Object(map) => match map.get("edges") {
            Some(serde_json::Value::Array(edges)) => edges
                .iter()
                .map(|edge| edge.get("node").unwrap_or(edge))
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    for entry in entries {
        let name = entry
            .get("name")
            .or_else(|| entry.get("serviceName"))
            .and_then(|n| n.as_str());
        if let Some(name) = name {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
}
