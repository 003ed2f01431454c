//! Operator confirmation port

use shared::{format_size, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Question put to the operator before a risky step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Restoring overwrites remote data
    Destructive {
        source_database: String,
        database: String,
        service: String,
        archive: PathBuf,
        size_bytes: u64,
        drop_existing: bool,
    },
    /// Archive is past the size the text transfer handles reliably
    Oversize { size_bytes: u64, threshold_bytes: u64 },
}

impl Prompt {
    /// Text shown to the operator, asking for `token`
    pub fn message(&self, token: &str) -> String {
        match self {
            Prompt::Destructive {
                source_database,
                database,
                service,
                archive,
                size_bytes,
                drop_existing,
            } => {
                let mode = if *drop_existing {
                    "DROP existing collections and restore"
                } else {
                    "restore (merging into existing collections)"
                };
                let origin = if source_database == database {
                    String::new()
                } else {
                    format!(" with the contents of '{}'", source_database)
                };
                format!(
                    "About to {} database '{}'{} via service '{}' from {} ({}). Type '{}' to continue",
                    mode,
                    database,
                    origin,
                    service,
                    archive.display(),
                    format_size(*size_bytes),
                    token
                )
            }
            Prompt::Oversize {
                size_bytes,
                threshold_bytes,
            } => format!(
                "Archive is {} (over {}); the text transfer may be slow or fail. Type '{}' to continue anyway",
                format_size(*size_bytes),
                format_size(*threshold_bytes),
                token
            ),
        }
    }
}

/// Supplies the operator's free-text answer to a prompt
pub trait Confirmer {
    fn ask(&self, prompt: &Prompt, token: &str) -> Result<String>;
}

/// Confirmer with pre-recorded answers; answers `""` once they run out
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<Prompt>>,
}

impl ScriptedConfirmer {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Prompts asked so far, in order
    pub fn asked(&self) -> Vec<Prompt> {
        self.asked.borrow().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn ask(&self, prompt: &Prompt, _token: &str) -> Result<String> {
        self.asked.borrow_mut().push(prompt.clone());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or_default())
    }
}

/// Whether `answer` is exactly the confirmation token (surrounding whitespace ignored)
pub fn is_confirmed(answer: &str, token: &str) -> bool {
    answer.trim() == token
}
