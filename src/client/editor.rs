//! Line editor with command keyword completion.

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, EditMode, Editor, Helper};

/// Words offered on Tab, in display order.
const KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "truncate", "create", "drop", "desc", "describe",
    "execute", "exit", "\\x", ":",
];

/// The editor type used by the interactive loop.
pub type LineEditor = Editor<OracliHelper, DefaultHistory>;

/// rustyline helper providing keyword completion.
#[derive(Default)]
pub struct OracliHelper;

impl Completer for OracliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        let candidates = complete_word(&line[start..pos])
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for OracliHelper {
    type Hint = String;
}

impl Highlighter for OracliHelper {}

impl Validator for OracliHelper {}

impl Helper for OracliHelper {}

/// Byte offset where the word under the cursor begins.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

/// Keywords starting with `word`, ignoring case.
///
/// An all-uppercase word gets uppercase suggestions.
fn complete_word(word: &str) -> Vec<String> {
    let lower = word.to_lowercase();
    let upper = word.chars().any(char::is_alphabetic) && word == word.to_uppercase();
    KEYWORDS
        .iter()
        .filter(|k| k.starts_with(&lower))
        .map(|k| if upper { k.to_uppercase() } else { k.to_string() })
        .collect()
}

/// Build the editor and seed its recall buffer with `history`.
pub fn new_editor(history: &[String]) -> Result<LineEditor> {
    let config = Config::builder()
        .edit_mode(EditMode::Emacs)
        .auto_add_history(false)
        .build();
    let mut editor: LineEditor = Editor::with_config(config)?;
    editor.set_helper(Some(OracliHelper));
    for line in history {
        editor.add_history_entry(line.as_str())?;
    }
    Ok(editor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_prefix() {
        assert_eq!(complete_word("sel"), vec!["select"]);
        assert_eq!(complete_word("de"), vec!["delete", "desc", "describe"]);
        assert_eq!(complete_word("ex"), vec!["execute", "exit"]);
        assert!(complete_word("zzz").is_empty());
    }

    #[test]
    fn test_complete_keeps_case() {
        assert_eq!(complete_word("SEL"), vec!["SELECT"]);
        assert_eq!(complete_word("Sel"), vec!["select"]);
    }

    #[test]
    fn test_complete_symbols() {
        assert_eq!(complete_word("\\"), vec!["\\x"]);
        assert_eq!(complete_word(":"), vec![":"]);
    }

    #[test]
    fn test_empty_word_offers_everything() {
        assert_eq!(complete_word("").len(), KEYWORDS.len());
    }

    #[test]
    fn test_word_start() {
        assert_eq!(word_start("select * fr", 11), 9);
        assert_eq!(word_start("sel", 3), 0);
        assert_eq!(word_start("select ", 7), 7);
    }

    #[test]
    fn test_word_start_after_multibyte_space() {
        for line in ["select\u{a0}se", "select\u{3000}se"] {
            let start = word_start(line, line.len());
            assert_eq!(&line[start..], "se");
            assert_eq!(complete_word(&line[start..]), vec!["select"]);
        }
    }
}
