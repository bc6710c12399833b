//! Input classification.
//!
//! Each submitted line maps to exactly one [`Action`]. Rules are tried in
//! order and the first pattern that matches decides the action, even when the
//! rule's builder rejects the captured text.

use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Kind of schema statement, used for the success message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlKind {
    Create,
    Drop,
}

impl DdlKind {
    pub fn label(self) -> &'static str {
        match self {
            DdlKind::Create => "Create",
            DdlKind::Drop => "Drop",
        }
    }
}

/// What a line of input asks the client to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `:<program> <args...>`
    Shell(Vec<String>),
    /// `select ...`
    Query(String),
    /// `insert|update|delete|truncate ...`
    Mutate(String),
    /// `create ...` / `drop ...`
    Ddl { statement: String, kind: DdlKind },
    /// `desc <table>` / `describe <table>`
    Describe(String),
    /// `execute <file>`
    ExecuteFile(PathBuf),
    /// `\<c>`
    Meta(char),
    Exit,
    /// Anything else, trimmed. Empty for blank input.
    Unrecognized(String),
}

struct Rule {
    pattern: Regex,
    build: fn(&str, &Captures<'_>) -> Option<Action>,
}

impl Rule {
    fn new(pattern: &str, build: fn(&str, &Captures<'_>) -> Option<Action>) -> Self {
        Self {
            // Patterns are literals below; a bad one is caught by the tests.
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("bad rule {pattern:?}: {e}")),
            build,
        }
    }
}

fn capture(caps: &Captures<'_>, group: usize) -> Option<String> {
    caps.get(group)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(r"^:(.*)$", |_, caps| {
            let argv: Vec<String> = caps
                .get(1)
                .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            (!argv.is_empty()).then_some(Action::Shell(argv))
        }),
        Rule::new(r"(?i)^select\s", |line, _| Some(Action::Query(line.to_string()))),
        Rule::new(r"(?i)^(insert|update|delete|truncate)\s", |line, _| {
            Some(Action::Mutate(line.to_string()))
        }),
        Rule::new(r"(?i)^create\s", |line, _| {
            Some(Action::Ddl {
                statement: line.to_string(),
                kind: DdlKind::Create,
            })
        }),
        Rule::new(r"(?i)^drop\s", |line, _| {
            Some(Action::Ddl {
                statement: line.to_string(),
                kind: DdlKind::Drop,
            })
        }),
        Rule::new(r"(?is)^desc(?:ribe)?\s+(.*)$", |_, caps| {
            capture(caps, 1).map(Action::Describe)
        }),
        Rule::new(r"(?is)^execute\s+(.*)$", |_, caps| {
            capture(caps, 1).map(|path| Action::ExecuteFile(PathBuf::from(path)))
        }),
        Rule::new(r"^\\(.)", |_, caps| {
            caps.get(1)
                .and_then(|m| m.as_str().chars().next())
                .map(Action::Meta)
        }),
        Rule::new(r"(?i)^exit$", |_, _| Some(Action::Exit)),
    ]
});

/// Classify one line of raw input.
///
/// Surrounding whitespace is ignored; statements are passed on trimmed.
pub fn classify(line: &str) -> Action {
    let line = line.trim();
    let unrecognized = || Action::Unrecognized(line.to_string());
    if line.is_empty() {
        return unrecognized();
    }

    RULES
        .iter()
        .find_map(|rule| {
            rule.pattern
                .captures(line)
                .map(|caps| (rule.build)(line, &caps).unwrap_or_else(unrecognized))
        })
        .unwrap_or_else(unrecognized)
}
