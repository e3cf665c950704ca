use thiserror::Error;

/// Everything that can abort a provisioning invocation.
///
/// Tolerated (non-required) statement failures are not errors: they are
/// recorded as data in the result instead.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid {field} identifier: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("failed to connect to database `{database}`: {source}")]
    Connect {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    // Statement text is left out on purpose: it can carry a password.
    #[error("required statement #{index} failed: {source}")]
    Statement {
        index: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to close connection: {0}")]
    Close(#[source] sqlx::Error),
}

impl ProvisionError {
    /// True for errors raised before a connection was ever attempted.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            ProvisionError::MissingField(_) | ProvisionError::InvalidIdentifier { .. }
        )
    }

    /// The underlying database error, if any.
    pub fn database_error(&self) -> Option<&sqlx::Error> {
        match self {
            ProvisionError::Connect { source, .. }
            | ProvisionError::Statement { source, .. }
            | ProvisionError::Close(source) => Some(source),
            _ => None,
        }
    }
}
