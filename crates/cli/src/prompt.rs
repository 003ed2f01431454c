//! Terminal confirmation prompts

use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use shared::{Result, TransferError};
use std::io;
use transfer::{Confirmer, Prompt};

/// Asks the operator on the terminal; any answer is returned verbatim
#[derive(Default)]
pub struct DialoguerConfirmer {
    theme: ColorfulTheme,
}

impl Confirmer for DialoguerConfirmer {
    fn ask(&self, prompt: &Prompt, token: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt.message(token))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| TransferError::Io(io::Error::new(io::ErrorKind::Other, e)))
    }
}
