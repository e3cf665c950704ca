use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Administrative database the role/database statements run against when the
/// request does not name one.
pub const DEFAULT_DATABASE: &str = "postgres";

/// Connection parameters handed to the connection layer.
///
/// Recognised options are typed; anything else in the event lands in `extra`
/// and is passed through untouched.
#[derive(Clone, Default, Deserialize)]
pub struct ConnectionOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Connecting principal. In default mode this is also the principal that
    /// receives membership in the tenant role.
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConnectionOptions {
    /// The database to connect to. Empty strings count as unset.
    pub fn target_database(&self) -> &str {
        self.database
            .as_deref()
            .filter(|db| !db.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One SQL statement plus its failure policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub query: String,
    /// A failing required statement aborts the run; otherwise the failure is
    /// recorded and execution continues.
    #[serde(default)]
    pub required: bool,
}

impl Statement {
    pub fn required(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            required: true,
        }
    }

    pub fn optional(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            required: false,
        }
    }
}

/// The invocation event.
#[derive(Clone, Default, Deserialize)]
pub struct ProvisionRequest {
    /// Tenant database name.
    pub schema: Option<String>,
    /// Tenant role name; falls back to `schema`.
    pub schema_role: Option<String>,
    /// Password set on the tenant role.
    pub schema_password: Option<String>,
    /// Caller-supplied statements. When present the planner is skipped and the
    /// per-statement outcomes are returned.
    pub queries: Option<Vec<Statement>>,
    #[serde(flatten)]
    pub connection: ConnectionOptions,
}

impl ProvisionRequest {
    /// Role name used by the planner.
    pub fn role(&self) -> Option<&str> {
        self.schema_role
            .as_deref()
            .filter(|role| !role.is_empty())
            .or(self.schema.as_deref())
    }
}

impl fmt::Debug for ProvisionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionRequest")
            .field("schema", &self.schema)
            .field("schema_role", &self.schema_role)
            .field(
                "schema_password",
                &self.schema_password.as_ref().map(|_| "<redacted>"),
            )
            .field("queries", &self.queries.as_ref().map(Vec::len))
            .field("connection", &self.connection)
            .finish()
    }
}
