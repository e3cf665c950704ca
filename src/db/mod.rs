pub mod rows;

#[cfg(test)]
pub mod mock;

use std::future::Future;

use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::Connection;

use crate::models::{ConnectionOptions, Row};

/// Opens database sessions.
pub trait Connector: Send + Sync {
    type Session: Session;

    fn connect(
        &self,
        options: &ConnectionOptions,
    ) -> impl Future<Output = Result<Self::Session, sqlx::Error>> + Send;
}

/// One open connection. Dropping a session without calling [`Session::end`]
/// still tears down the socket, but only `end` closes it gracefully.
pub trait Session: Send + Sized {
    fn query(&mut self, sql: &str) -> impl Future<Output = Result<Vec<Row>, sqlx::Error>> + Send;

    fn end(self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// PostgreSQL connector backed by a single `PgConnection` per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

pub struct PgSession {
    conn: PgConnection,
}

impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, options: &ConnectionOptions) -> Result<PgSession, sqlx::Error> {
        let opts = connect_options(options)?;
        let conn = PgConnection::connect_with(&opts).await?;
        Ok(PgSession { conn })
    }
}

impl Session for PgSession {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, sqlx::Error> {
        // Simple-query protocol: one statement text may hold several commands.
        let rows = sqlx::Executor::fetch_all(&mut self.conn, sqlx::raw_sql(sql)).await?;
        Ok(rows.iter().map(rows::to_json).collect())
    }

    async fn end(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

/// Builds sqlx connect options. Unset host/port/user/password fall back to the
/// libpq environment variables read by `PgConnectOptions::new()`.
pub fn connect_options(options: &ConnectionOptions) -> Result<PgConnectOptions, sqlx::Error> {
    let mut opts = PgConnectOptions::new().database(options.target_database());

    if let Some(host) = options.host.as_deref() {
        opts = opts.host(host);
    }
    if let Some(port) = options.port {
        opts = opts.port(port);
    }
    if let Some(user) = options.user.as_deref() {
        opts = opts.username(user);
    }
    if let Some(password) = options.password.as_deref() {
        opts = opts.password(password);
    }

    for (key, value) in &options.extra {
        opts = apply_passthrough(opts, key, value)?;
    }

    Ok(opts)
}

fn apply_passthrough(
    opts: PgConnectOptions,
    key: &str,
    value: &Value,
) -> Result<PgConnectOptions, sqlx::Error> {
    let opts = match (key, value) {
        ("application_name", Value::String(name)) => opts.application_name(name),
        ("ssl", Value::Bool(true)) | ("ssl", Value::Object(_)) => opts.ssl_mode(PgSslMode::Require),
        ("ssl", Value::Bool(false)) => opts.ssl_mode(PgSslMode::Disable),
        ("sslmode", Value::String(mode)) => opts.ssl_mode(mode.parse()?),
        ("options", Value::String(raw)) => opts.options(parse_runtime_options(raw)?),
        ("statement_timeout", Value::Number(ms)) => {
            opts.options([("statement_timeout", ms.to_string())])
        }
        ("statement_timeout", Value::String(ms)) => opts.options([("statement_timeout", ms.as_str())]),
        (
            "application_name" | "ssl" | "sslmode" | "options" | "statement_timeout",
            other,
        ) => {
            return Err(sqlx::Error::Configuration(
                format!("unsupported value for connection option `{key}`: {other}").into(),
            ));
        }
        _ => {
            tracing::debug!(option = key, "ignoring unrecognised connection option");
            opts
        }
    };
    Ok(opts)
}

/// Parses a libpq-style `options` string (`-c key=value --key=value ...`).
fn parse_runtime_options(raw: &str) -> Result<Vec<(String, String)>, sqlx::Error> {
    let mut pairs = Vec::new();
    let mut tokens = raw.split_whitespace();

    while let Some(token) = tokens.next() {
        let setting = if token == "-c" {
            tokens.next().unwrap_or_default()
        } else if let Some(rest) = token.strip_prefix("-c") {
            rest
        } else if let Some(rest) = token.strip_prefix("--") {
            rest
        } else {
            token
        };

        match setting.split_once('=') {
            Some((k, v)) if !k.is_empty() => pairs.push((k.replace('-', "_"), v.to_owned())),
            _ => {
                return Err(sqlx::Error::Configuration(
                    format!("malformed runtime option: {token:?}").into(),
                ))
            }
        }
    }

    Ok(pairs)
}
