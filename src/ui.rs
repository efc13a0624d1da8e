// UI layer: terminal prompts through `dialoguer` and the progress bar shown
// while submitting. Nothing here talks to the API.

use std::io::{self, IsTerminal};

use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::credentials::Prompter;
use crate::error::{QpiError, Result};

/// Prompts on the controlling terminal. Refuses to prompt when stdin is
/// not a terminal so piped or scheduled runs fail instead of hanging.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn ensure_terminal(field: &'static str, env: &'static str) -> Result<()> {
        if io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(QpiError::NotInteractive { field, env })
        }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, field: &'static str, env: &'static str) -> Result<String> {
        Self::ensure_terminal(field, env)?;
        Input::<String>::new()
            .with_prompt(capitalize(field))
            .allow_empty(true)
            .interact_text()
            .map_err(|source| QpiError::Prompt { field, source })
    }

    fn password(&mut self, field: &'static str, env: &'static str) -> Result<String> {
        Self::ensure_terminal(field, env)?;
        // `Password` keeps the input hidden.
        Password::new()
            .with_prompt(capitalize(field))
            .allow_empty_password(true)
            .interact()
            .map_err(|source| QpiError::Prompt { field, source })
    }
}

/// Progress bar with one tick per request.
pub fn submission_progress(requests: u64) -> ProgressBar {
    let bar = ProgressBar::new(requests);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
