//! Interactive question loop input using rustyline
//!
//! Reads one question per line with editing and persistent history, and
//! recognizes a few control words.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// One line of chat input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    Help,
    Exit,
    Empty,
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => ChatInput::Empty,
            "exit" | "quit" | "/exit" | "/quit" => ChatInput::Exit,
            "help" | "/help" | "?" => ChatInput::Help,
            _ => ChatInput::Question(trimmed.to_string()),
        }
    }
}

pub const HELP_TEXT: &str = "Type a question and press Enter. Commands: help, exit (or Ctrl-D).";

/// Input handler managing the readline editor and history file
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(InputHandler {
            editor: DefaultEditor::new()?,
            history_path: None,
            prompt: "kbqa> ".to_string(),
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: "kbqa> ".to_string(),
        })
    }

    /// ~/.kbqa/history
    pub fn default_history_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kbqa").join("history"))
    }

    /// Read and classify one line.
    ///
    /// Ctrl-D and Ctrl-C both end the session.
    pub fn read(&mut self) -> Result<ChatInput> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let input = ChatInput::parse(&line);
                if let ChatInput::Question(ref q) = input {
                    let _ = self.editor.add_history_entry(q.as_str());
                }
                Ok(input)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(ChatInput::Exit),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}
