//! Oracle session backed by the `oracle` crate (ODPI-C).
//!
//! The driver is blocking, so every call runs on tokio's blocking pool. The
//! driver-side call timeout is set to the same bound the dispatcher enforces,
//! so a call that outlives the dispatcher is also stopped at the server.
//!
//! Calls are serialized on a lock whose guard travels with the blocking task,
//! so a call the dispatcher gave up on still excludes the next one until the
//! driver returns.

use crate::config::ConnectionParams;
use crate::error::{Error, StatementError};
use crate::session::{Cell, ResultSet, Session};
use ::oracle::sql_type::OracleType;
use ::oracle::{Connection, SqlValue};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Oracle connection owned by the interactive loop.
pub struct OracleSession {
    conn: Arc<Connection>,
    lock: Arc<Mutex<()>>,
    timeout: Duration,
    autocommit: bool,
}

impl OracleSession {
    /// Open a connection.
    pub async fn connect(
        params: &ConnectionParams,
        timeout: Duration,
        autocommit: bool,
    ) -> Result<Self, Error> {
        debug!("Connecting to {}", params.redacted());

        let username = params.username.clone();
        let password = params.password.clone();
        let connect_string = params.connect_string();

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::connect(&username, &password, &connect_string)?;
            conn.set_call_timeout(Some(timeout))?;
            Ok::<_, ::oracle::Error>(conn)
        })
        .await
        .map_err(|e| Error::Connection(e.to_string()))?
        .map_err(|e| Error::Connection(e.to_string()))?;

        debug!("Connected");
        Ok(Self {
            conn: Arc::new(conn),
            lock: Arc::new(Mutex::new(())),
            timeout,
            autocommit,
        })
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, StatementError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ::oracle::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let timeout = self.timeout;
        serialized(&self.lock, move || f(&conn))
            .await
            .map_err(|e| StatementError::Database(e.to_string()))?
            .map_err(|e| statement_error(e, timeout))
    }
}

#[async_trait]
impl Session for OracleSession {
    async fn query(&self, sql: &str) -> Result<ResultSet, StatementError> {
        let sql = sql.to_string();
        self.blocking(move |conn| {
            let rows = conn.query(&sql, &[])?;
            let columns = rows
                .column_info()
                .iter()
                .map(|info| info.name().to_string())
                .collect();
            let mut result = ResultSet::new(columns);
            for row in rows {
                let row = row?;
                let cells = row
                    .sql_values()
                    .iter()
                    .map(to_cell)
                    .collect::<Result<Vec<_>, _>>()?;
                result.push_cells(&cells);
            }
            Ok(result)
        })
        .await
    }

    async fn execute(&self, sql: &str) -> Result<u64, StatementError> {
        let sql = sql.to_string();
        let autocommit = self.autocommit;
        self.blocking(move |conn| {
            let stmt = conn.execute(&sql, &[])?;
            let affected = if stmt.is_dml() { stmt.row_count()? } else { 0 };
            if autocommit {
                conn.commit()?;
            }
            Ok(affected)
        })
        .await
    }

    /// Sends the break without taking the call lock, since the call being
    /// broken holds it.
    fn cancel(&self) {
        debug!("Breaking current call");
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = conn.break_execution() {
                warn!("Failed to break execution: {}", e);
            }
        });
    }

    async fn close(&self) -> Result<(), StatementError> {
        self.blocking(|conn| conn.close()).await
    }
}

/// Run `f` on the blocking pool once `lock` is free.
///
/// The guard is owned by the blocking task, so dropping the returned future
/// does not release the lock while `f` is still running.
async fn serialized<T, F>(lock: &Arc<Mutex<()>>, f: F) -> Result<T, JoinError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let guard = Arc::clone(lock).lock_owned().await;
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        f()
    })
    .await
}

/// Convert a driver value into a cell.
fn to_cell(value: &SqlValue) -> Result<Cell, ::oracle::Error> {
    if value.is_null()? {
        return Ok(Cell::Null);
    }
    let ty = value.oracle_type()?;
    if let Some(text) = placeholder(ty) {
        return Ok(Cell::Text(text.to_string()));
    }
    match ty {
        OracleType::Raw(_) | OracleType::LongRaw | OracleType::BLOB => {
            Ok(Cell::Bytes(value.get::<Vec<u8>>()?))
        }
        _ => Ok(Cell::Text(value.get::<String>()?)),
    }
}

/// Fixed text for column types that have no string form.
fn placeholder(ty: &OracleType) -> Option<&'static str> {
    match ty {
        OracleType::Object(_) => Some("<OBJECT>"),
        OracleType::RefCursor => Some("<CURSOR>"),
        OracleType::BFILE => Some("<BFILE>"),
        _ => None,
    }
}

/// Map a driver error, recognising call timeouts and user cancellation.
fn statement_error(err: ::oracle::Error, timeout: Duration) -> StatementError {
    classify_driver_message(&err.to_string(), timeout)
}

fn classify_driver_message(message: &str, timeout: Duration) -> StatementError {
    if message.contains("DPI-1067") || message.contains("ORA-01013") {
        StatementError::Timeout(timeout)
    } else {
        StatementError::Database(message.to_string())
    }
}
