//! oracli - Yet another Oracle command-line client.
//!
//! Reads a line, works out whether it is a query, a DML or DDL statement, a
//! describe request, a shell command or a meta-command, runs it, and prints
//! the result as a table or as expanded records.

mod classify;
mod client;
mod config;
mod dispatch;
mod error;
mod history;
mod render;
mod repl;
mod session;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Config, ConnectionOverrides, ConnectionParams};
use dispatch::Dispatcher;
use history::HistoryStore;
use session::{OracleSession, Session};
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oracli")]
#[command(author, version, about = "Yet another Oracle CLI client")]
struct Cli {
    /// Database host
    #[arg(short = 'H', long, env = "ORACLE_HOSTNAME")]
    hostname: Option<String>,

    /// Database user
    #[arg(short = 'u', long, env = "ORACLE_USERNAME")]
    username: Option<String>,

    /// Listener port
    #[arg(short = 'p', long, env = "ORACLE_PORT")]
    port: Option<u16>,

    /// Service name
    #[arg(short = 's', long, env = "ORACLE_SERVICE")]
    service: Option<String>,

    /// Run a single statement and exit
    #[arg(short = 'q', long, value_name = "STATEMENT")]
    query: Option<String>,

    /// Config file (default: ~/.config/oracli/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let overrides = ConnectionOverrides {
        hostname: cli.hostname,
        port: cli.port,
        username: cli.username,
        service: cli.service,
        password: std::env::var("ORACLE_PASSWORD").ok(),
    };
    let mut params = ConnectionParams::resolve(overrides, &config.connection)?;
    if params.password.is_empty() {
        params.password = prompt_password()?;
    }

    let session = OracleSession::connect(&params, config.client.timeout(), config.client.autocommit)
        .await
        .with_context(|| format!("Could not connect to {}", params.redacted()))?;

    let mut dispatcher = Dispatcher::new(session, config.client.timeout());
    let result = run(&mut dispatcher, cli.query.as_deref(), &config).await;

    let session = dispatcher.into_session();
    if let Err(e) = session.close().await {
        warn!("Close failed: {}", e);
    }
    result
}

/// Initialize logging. Logs go to stderr so they never mix with results.
fn init_logging(verbose: bool) {
    let default = if verbose { "oracli=debug" } else { "oracli=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Ask for the password when stdin is a terminal.
fn prompt_password() -> Result<String> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("No password given. Set ORACLE_PASSWORD or add it to the config file");
    }
    client::read_password("Input your password: ")
}

/// Pick the run mode and drive the dispatcher until it is done.
async fn run<S: Session>(
    dispatcher: &mut Dispatcher<S>,
    query: Option<&str>,
    config: &Config,
) -> Result<()> {
    if let Some(query) = query {
        debug!("One-shot mode");
        repl::run_once(dispatcher, query, &mut io::stdout()).await?;
        return Ok(());
    }

    if !atty::is(atty::Stream::Stdin) {
        debug!("Reading statements from stdin");
        let stdin = io::stdin();
        repl::run_lines(dispatcher, stdin.lock(), &mut io::stdout(), &mut io::stderr()).await?;
        return Ok(());
    }

    let history_path = Config::history_path()?;
    let mut editor = client::new_editor(&history::load(&history_path))?;
    let mut history = HistoryStore::open(&history_path)
        .context("Could not open history file")?;

    repl::run_interactive(dispatcher, &mut editor, &mut history, &config.client.prompt).await
}
