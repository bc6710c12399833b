//! Action dispatch.
//!
//! Runs a classified [`Action`] against the session or the local shell and
//! writes whatever it produces. Every branch is independent; one line never
//! triggers more than one action.

use crate::classify::Action;
use crate::error::{Error, Result, StatementError};
use crate::render::{render, DisplayMode};
use crate::session::{ResultSet, Session};
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

const HELP: &str = "\
Commands:
  select ...                        Run a query and show the rows
  insert|update|delete|truncate ... Run a statement and show affected rows
  create ... / drop ...             Run a schema statement
  desc <table>                      Show the columns of a table
  execute <file>                    Run the query stored in a file
  :<program> [args...]              Run a shell command
  \\x                                Toggle table/expanded display
  \\?                                Show this help
  exit, \\q                          Quit
";

/// Owns the session and the display mode for the lifetime of the loop.
pub struct Dispatcher<S> {
    session: S,
    mode: DisplayMode,
    timeout: Duration,
}

impl<S: Session> Dispatcher<S> {
    pub fn new(session: S, timeout: Duration) -> Self {
        Self {
            session,
            mode: DisplayMode::default(),
            timeout,
        }
    }

    /// Hand the session back, e.g. to close it.
    pub fn into_session(self) -> S {
        self.session
    }

    /// Run an action, reporting any failure as one line on `err`.
    pub async fn dispatch<O, E>(&mut self, action: Action, out: &mut O, err: &mut E) -> Flow
    where
        O: Write,
        E: Write,
    {
        match self.run(action, out).await {
            Ok(flow) => flow,
            Err(e) => {
                let _ = writeln!(err, "{e}");
                Flow::Continue
            }
        }
    }

    /// Run an action, returning failures to the caller.
    pub async fn run<O>(&mut self, action: Action, out: &mut O) -> Result<Flow>
    where
        O: Write,
    {
        debug!("Dispatching {:?}", action);
        match action {
            Action::Shell(argv) => {
                run_shell(&argv).await?;
            }
            Action::Query(sql) => {
                let result = self.query(&sql).await?;
                self.print(&result, out)?;
            }
            Action::Mutate(sql) => {
                let affected = self.execute(&sql).await?;
                writeln!(out, "RowsAffected: {affected}")?;
            }
            Action::Ddl { statement, kind } => {
                self.execute(&statement).await?;
                writeln!(out, "{}: success", kind.label())?;
            }
            Action::Describe(table) => {
                let sql = describe_query(&table)?;
                let result = self.query(&sql).await?;
                if result.is_empty() {
                    return Err(StatementError::Database(format!("no such table: {table}")).into());
                }
                self.print(&result, out)?;
            }
            Action::ExecuteFile(path) => {
                let sql = read_script(&path).await?;
                let result = self.query(&sql).await?;
                self.print(&result, out)?;
            }
            Action::Meta('x') => {
                self.mode = self.mode.toggled();
                writeln!(out, "Change Mode: {}", self.mode)?;
            }
            Action::Meta('?') => {
                write!(out, "{HELP}")?;
            }
            Action::Meta('q') | Action::Exit => return Ok(Flow::Exit),
            Action::Meta(c) => return Err(Error::UnknownMeta(c)),
            Action::Unrecognized(line) if line.is_empty() => {}
            Action::Unrecognized(line) => return Err(Error::Unrecognized(line)),
        }
        Ok(Flow::Continue)
    }

    fn print<O: Write>(&self, result: &ResultSet, out: &mut O) -> Result<()> {
        out.write_all(render(result, self.mode).as_bytes())?;
        out.flush()?;
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<ResultSet> {
        self.bounded(self.session.query(sql)).await
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        self.bounded(self.session.execute(sql)).await
    }

    /// Await a session call, cancelling it once the timeout elapses.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StatementError>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                debug!("Statement exceeded {:?}, cancelling", self.timeout);
                self.session.cancel();
                Err(StatementError::Timeout(self.timeout).into())
            }
        }
    }
}

/// Run an external program with the terminal's stdio.
async fn run_shell(argv: &[String]) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| Error::Shell(format!("{program}: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Shell(format!("{program}: {status}")))
    }
}

/// Read a script file as a single statement.
async fn read_script(path: &Path) -> Result<String> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(contents.trim().to_string())
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#'))
}

/// Build the column listing query for `table` (`name` or `owner.name`).
///
/// An unqualified name is looked up in the session's current schema.
pub fn describe_query(table: &str) -> Result<String, StatementError> {
    let invalid = || StatementError::InvalidIdentifier(table.to_string());
    let (owner, name) = match table.split_once('.') {
        Some((owner, name)) => (Some(owner), name),
        None => (None, table),
    };
    if !is_identifier(name) || owner.is_some_and(|o| !is_identifier(o)) {
        return Err(invalid());
    }

    let owner_filter = match owner {
        Some(o) => format!("owner = UPPER('{o}')"),
        None => "owner = SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA')".to_string(),
    };
    Ok(format!(
        "SELECT column_name, data_type, data_length, nullable \
         FROM all_tab_columns \
         WHERE {owner_filter} AND table_name = UPPER('{name}') \
         ORDER BY column_id"
    ))
}
