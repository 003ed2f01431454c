//! Fake remote session backed by an in-memory database

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use shared::{NullReporter, Result, StatusReporter, TransferConfig};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use transfer::script::RESTORE_SENTINEL;
use transfer::{RemoteChannel, RemoteOutput, ServiceDirectory, ToolingStatus};

pub type Collections = BTreeMap<String, Vec<String>>;

/// Remote side double: service directory state plus a tiny document store
///
/// The store is keyed by namespace (`<database>.<collection>`). Without
/// canned responses, dump scripts return the `--db` namespaces serialized as
/// JSON and restore scripts decode their heredoc payload back into it,
/// honouring `--nsInclude`, `--nsFrom`/`--nsTo` and `--drop`.
pub struct FakeSession {
    pub tooling: ToolingStatus,
    pub selected: Option<String>,
    pub services: Vec<String>,
    pub db: RefCell<Collections>,
    responses: RefCell<VecDeque<Result<RemoteOutput>>>,
    commands: RefCell<Vec<String>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            tooling: ToolingStatus::Ready,
            selected: Some("backend".to_string()),
            services: vec!["backend".to_string(), "MongoDB".to_string()],
            db: RefCell::new(Collections::new()),
            responses: RefCell::new(VecDeque::new()),
            commands: RefCell::new(Vec::new()),
        }
    }

    pub fn with_selected(mut self, selected: Option<&str>) -> Self {
        self.selected = selected.map(str::to_string);
        self
    }

    pub fn with_tooling(mut self, tooling: ToolingStatus) -> Self {
        self.tooling = tooling;
        self
    }

    /// Seed a collection under its full namespace, e.g. `miniapp.users`
    pub fn with_collection(self, namespace: &str, docs: &[&str]) -> Self {
        self.db
            .borrow_mut()
            .insert(namespace.to_string(), docs.iter().map(|d| d.to_string()).collect());
        self
    }

    /// Queue a canned reply for the next `execute`
    pub fn respond(&self, reply: Result<RemoteOutput>) {
        self.responses.borrow_mut().push_back(reply);
    }

    pub fn executions(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn snapshot(&self) -> Collections {
        self.db.borrow().clone()
    }

    fn emulate(&self, command: &str) -> RemoteOutput {
        if command.contains("exec mongodump") {
            let prefix = quoted_arg(command, "--db=").map(|db| format!("{}.", db));
            let dumped: Collections = self
                .db
                .borrow()
                .iter()
                .filter(|(ns, _)| prefix.as_deref().map_or(true, |p| ns.starts_with(p)))
                .map(|(ns, docs)| (ns.clone(), docs.clone()))
                .collect();
            let body = serde_json::to_vec(&dumped).unwrap_or_default();
            return RemoteOutput::new(body, "", Some(0));
        }
        if command.contains("mongorestore") {
            return self.emulate_restore(command);
        }
        RemoteOutput::new("", format!("sh: unknown command: {}", command), Some(127))
    }

    fn emulate_restore(&self, command: &str) -> RemoteOutput {
        let mut lines = command.lines();
        let delimiter = lines
            .by_ref()
            .find_map(|l| l.strip_prefix("base64 -d > \"$tmp\" <<'"))
            .and_then(|rest| rest.strip_suffix('\''));
        let Some(delimiter) = delimiter else {
            return RemoteOutput::new("", "missing payload", Some(65));
        };

        let encoded: String = lines.take_while(|l| *l != delimiter).collect();
        let Ok(bytes) = STANDARD.decode(encoded) else {
            return RemoteOutput::new("", "base64: invalid input", Some(65));
        };
        let Ok(incoming) = serde_json::from_slice::<Collections>(&bytes) else {
            return RemoteOutput::new("", "Failed: archive header is corrupt", Some(1));
        };

        let include = quoted_arg(command, "--nsInclude=").map(namespace_prefix);
        let rename = quoted_arg(command, "--nsFrom=")
            .map(namespace_prefix)
            .zip(quoted_arg(command, "--nsTo=").map(namespace_prefix));

        let mut db = self.db.borrow_mut();
        let drop_existing = command.contains(" --drop");
        for (namespace, docs) in incoming {
            if include.as_deref().is_some_and(|p| !namespace.starts_with(p)) {
                continue;
            }
            let namespace = match &rename {
                Some((from, to)) if namespace.starts_with(from.as_str()) => {
                    format!("{}{}", to, &namespace[from.len()..])
                }
                _ => namespace,
            };
            let target = db.entry(namespace).or_default();
            if drop_existing {
                target.clear();
            }
            target.extend(docs);
        }

        let stdout = format!(
            "remote archive: {} bytes\n0 document(s) failed to restore.\n{}\n",
            bytes.len(),
            RESTORE_SENTINEL
        );
        RemoteOutput::new(stdout, "", Some(0))
    }
}

impl RemoteChannel for FakeSession {
    fn execute(&self, command: &str) -> Result<RemoteOutput> {
        self.commands.borrow_mut().push(command.to_string());
        match self.responses.borrow_mut().pop_front() {
            Some(reply) => reply,
            None => Ok(self.emulate(command)),
        }
    }
}

impl ServiceDirectory for FakeSession {
    fn check_tooling(&self) -> ToolingStatus {
        self.tooling
    }

    fn selected_service(&self) -> Result<Option<String>> {
        Ok(self.selected.clone())
    }

    fn available_services(&self) -> Result<Vec<String>> {
        Ok(self.services.clone())
    }

    fn select_command(&self) -> String {
        "railway service".to_string()
    }

    fn program(&self) -> &str {
        "railway"
    }
}

/// Value of a single-quoted `--flag='value'` argument
fn quoted_arg<'a>(command: &'a str, flag: &str) -> Option<&'a str> {
    let start = command.find(&format!("{}'", flag))? + flag.len() + 1;
    let len = command[start..].find('\'')?;
    Some(&command[start..start + len])
}

/// `shop.*` becomes `shop.`
fn namespace_prefix(pattern: &str) -> String {
    pattern.trim_end_matches('*').to_string()
}

/// Config rooted in temporary directories
pub fn config_in(output_dir: &Path, scratch_dir: &Path) -> TransferConfig {
    TransferConfig {
        output_dir: output_dir.to_path_buf(),
        scratch_dir: Some(scratch_dir.to_path_buf()),
        ..Default::default()
    }
}

pub fn null_reporter() -> Arc<dyn StatusReporter> {
    Arc::new(NullReporter)
}

/// Number of entries in a directory
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Step,
    Success,
    Warn,
    Failure,
    Detail,
}

/// Reporter that keeps every line, tagged by level
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<(ReportLevel, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Whether any line at `level` contains `needle`
    pub fn contains(&self, level: ReportLevel, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, text)| *l == level && text.contains(needle))
    }

    fn push(&self, level: ReportLevel, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}

impl StatusReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push(ReportLevel::Step, message);
    }

    fn success(&self, message: &str) {
        self.push(ReportLevel::Success, message);
    }

    fn warn(&self, message: &str) {
        self.push(ReportLevel::Warn, message);
    }

    fn failure(&self, message: &str) {
        self.push(ReportLevel::Failure, message);
    }

    fn detail(&self, message: &str) {
        self.push(ReportLevel::Detail, message);
    }
}
