//! In-memory session for tests.
//!
//! Every query answers with columns `A, B` and two rows, except that SQL
//! containing `MISSING` returns no rows, `bogus` fails like an invalid column,
//! and `slow` sleeps for the configured delay first.

use crate::error::StatementError;
use crate::session::{Cell, ResultSet, Session};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeSession {
    statements: Mutex<Vec<String>>,
    pub cancels: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeSession {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Statements received so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    async fn record(&self, sql: &str) -> Result<(), StatementError> {
        self.statements.lock().unwrap().push(sql.to_string());
        if let Some(delay) = self.delay {
            if sql.contains("slow") {
                tokio::time::sleep(delay).await;
            }
        }
        if sql.contains("bogus") {
            return Err(StatementError::Database(
                "ORA-00904: \"BOGUS\": invalid identifier".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn query(&self, sql: &str) -> Result<ResultSet, StatementError> {
        self.record(sql).await?;
        let mut rs = ResultSet::new(vec!["A".to_string(), "B".to_string()]);
        if !sql.contains("MISSING") {
            rs.push_cells(&[Cell::Text("1".to_string()), Cell::Text("2".to_string())]);
            rs.push_cells(&[Cell::Text("3".to_string()), Cell::Null]);
        }
        Ok(rs)
    }

    async fn execute(&self, sql: &str) -> Result<u64, StatementError> {
        self.record(sql).await?;
        Ok(3)
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(&self) -> Result<(), StatementError> {
        Ok(())
    }
}
