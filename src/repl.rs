//! Input loops.
//!
//! Three ways to feed the dispatcher: an interactive editor with persistent
//! history, a non-terminal stdin read line by line, and a single `--query`.

use crate::classify::classify;
use crate::client::LineEditor;
use crate::dispatch::{Dispatcher, Flow};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::session::Session;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Interactive loop. Returns on `exit`, `\q` or end of input.
pub async fn run_interactive<S: Session>(
    dispatcher: &mut Dispatcher<S>,
    editor: &mut LineEditor,
    history: &mut HistoryStore,
    prompt: &str,
) -> anyhow::Result<()> {
    debug!("Recording history to {}", history.path().display());
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    loop {
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            // Ctrl-C drops the current line only.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        if record(history, &line, &mut stderr) {
            editor.add_history_entry(line.as_str())?;
        }

        if dispatcher.dispatch(classify(&line), &mut stdout, &mut stderr).await == Flow::Exit {
            break;
        }
    }
    Ok(())
}

/// Append a non-blank `line` to `history`, reporting a write failure on `err`.
///
/// Returns false for blank lines, which are not kept.
fn record<E: Write>(history: &mut HistoryStore, line: &str, err: &mut E) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    if let Err(e) = history.append(line) {
        let _ = writeln!(err, "{e}");
    }
    true
}

/// Dispatch every line of `input` in order, reporting failures on `err`.
pub async fn run_lines<S, R, O, E>(
    dispatcher: &mut Dispatcher<S>,
    input: R,
    out: &mut O,
    err: &mut E,
) -> Result<()>
where
    S: Session,
    R: BufRead,
    O: Write,
    E: Write,
{
    for line in input.lines() {
        let line = line?;
        if dispatcher.dispatch(classify(&line), out, err).await == Flow::Exit {
            break;
        }
    }
    Ok(())
}

/// Run a single line, returning its failure to the caller.
pub async fn run_once<S, O>(dispatcher: &mut Dispatcher<S>, line: &str, out: &mut O) -> Result<()>
where
    S: Session,
    O: Write,
{
    dispatcher.run(classify(line), out).await.map(|_| ())
}
