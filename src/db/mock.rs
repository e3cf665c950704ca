//! Scripted in-memory connector for tests.
//!
//! Statements containing `BAD` or starting with a prefix registered through
//! [`MockConnector::fail_on`] fail. Statements starting with a prefix
//! registered through [`MockConnector::rows_for`] return those rows.
//! `SELECT <n>` yields one row `{"?column?": n}`; everything else succeeds
//! with no rows.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;

use super::{Connector, Session};
use crate::models::{ConnectionOptions, Row};

#[derive(Debug, Default)]
pub struct MockState {
    pub connects: usize,
    pub closes: usize,
    pub databases: Vec<String>,
    pub executed: Vec<String>,
    fail_prefixes: Vec<String>,
    scripted_rows: Vec<(String, Vec<Row>)>,
}

#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
    refuse_connections: bool,
    fail_close: bool,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        Self {
            refuse_connections: true,
            ..Self::default()
        }
    }

    pub fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    /// Makes every statement starting with `prefix` fail.
    pub fn fail_on(self, prefix: &str) -> Self {
        self.state().fail_prefixes.push(prefix.to_owned());
        self
    }

    /// Makes every statement starting with `prefix` return `rows`.
    pub fn rows_for(self, prefix: &str, rows: Vec<Row>) -> Self {
        self.state().scripted_rows.push((prefix.to_owned(), rows));
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

pub struct MockSession {
    state: Arc<Mutex<MockState>>,
    fail_close: bool,
}

impl Connector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, options: &ConnectionOptions) -> Result<MockSession, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        state.databases.push(options.target_database().to_owned());
        if self.refuse_connections {
            return Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        Ok(MockSession {
            state: Arc::clone(&self.state),
            fail_close: self.fail_close,
        })
    }
}

impl Session for MockSession {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(sql.to_owned());

        if sql.contains("BAD") || state.fail_prefixes.iter().any(|p| sql.starts_with(p.as_str())) {
            return Err(sqlx::Error::Protocol(format!("statement rejected: {sql:?}")));
        }
        if let Some((_, rows)) = state.scripted_rows.iter().find(|(p, _)| sql.starts_with(p.as_str())) {
            return Ok(rows.clone());
        }
        drop(state);

        let rows = sql
            .trim()
            .trim_end_matches(';')
            .strip_prefix("SELECT ")
            .and_then(|n| n.trim().parse::<i64>().ok())
            .map(|n| {
                let mut row = Row::new();
                row.insert("?column?".into(), json!(n));
                vec![row]
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn end(self) -> Result<(), sqlx::Error> {
        self.state.lock().unwrap().closes += 1;
        if self.fail_close {
            return Err(sqlx::Error::Protocol("terminate failed".into()));
        }
        Ok(())
    }
}
