//! No-echo password prompt.
//!
//! Puts the terminal in raw mode for the duration of the prompt so typed
//! characters are never shown.

use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::{self, Write};

/// Result of a single key press.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Submit,
    Cancel,
}

/// Prompt on stderr and read a password from the terminal.
pub fn read_password(prompt: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    enable_raw_mode()?;
    let result = read_loop();
    disable_raw_mode()?;

    // Raw mode swallowed the newline.
    writeln!(stderr)?;
    result
}

fn read_loop() -> Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            // Only handle key press events (not release)
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match apply_key(&mut password, key) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submit => return Ok(password),
                KeyOutcome::Cancel => bail!("Password entry cancelled"),
            }
        }
    }
}

fn apply_key(password: &mut String, key: KeyEvent) -> KeyOutcome {
    match key.code {
        KeyCode::Enter => KeyOutcome::Submit,
        KeyCode::Esc => KeyOutcome::Cancel,
        KeyCode::Char('c') | KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyOutcome::Cancel
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            password.clear();
            KeyOutcome::Continue
        }
        KeyCode::Backspace => {
            password.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) => {
            password.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}
