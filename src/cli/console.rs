// ============================================================
// Layer 1 — Terminal Input
// ============================================================
// rustyline-backed InputSource for interactive terminals:
// arrow-key editing and an in-memory history of questions.
// Ctrl-D and Ctrl-C both end input, which the session treats
// like `exit`.

use anyhow::Result;
use rustyline::{error::ReadlineError, DefaultEditor};

use crate::application::session::InputSource;

pub struct ReadlineInput {
    editor: DefaultEditor,
}

impl ReadlineInput {
    pub fn new() -> Result<Self> {
        Ok(Self { editor: DefaultEditor::new()? })
    }
}

impl InputSource for ReadlineInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
