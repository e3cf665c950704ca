use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::postgres::PgDatabaseError;

/// A result row, keyed by column name.
pub type Row = Map<String, Value>;

/// What happened to one statement in `queries` mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Rows(Vec<Row>),
    #[serde(rename = "error")]
    Failure(FailureInfo),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }
}

/// A captured database error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureInfo {
    pub message: String,
    /// SQLSTATE, when the server reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&sqlx::Error> for FailureInfo {
    fn from(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let pg = db_err.try_downcast_ref::<PgDatabaseError>();
                FailureInfo {
                    message: db_err.message().to_owned(),
                    code: db_err.code().map(|c| c.into_owned()),
                    detail: pg.and_then(|e| e.detail()).map(str::to_owned),
                    hint: pg.and_then(|e| e.hint()).map(str::to_owned),
                }
            }
            other => FailureInfo {
                message: other.to_string(),
                code: None,
                detail: None,
                hint: None,
            },
        }
    }
}

/// Credentials returned in default mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The invocation result: per-statement outcomes when the caller supplied its
/// own statements, otherwise the tenant credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProvisioningResult {
    Outcomes(Vec<Outcome>),
    Credentials(Credentials),
}
