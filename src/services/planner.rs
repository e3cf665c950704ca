use crate::error::ProvisionError;
use crate::models::{ProvisionRequest, Statement};
use crate::services::identifiers::IdentifierPolicy;

/// Knobs applied when building the default statement list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanPolicy {
    pub identifiers: IdentifierPolicy,
    /// When false, an existing tenant database is tolerated so the same event
    /// can be replayed to rotate the role password.
    pub create_database_required: bool,
}

/// Tenant fields the default plan needs.
#[derive(Debug, Clone, Copy)]
pub struct Tenant<'a> {
    /// Existing principal that receives the tenant role.
    pub user: &'a str,
    /// Tenant database name.
    pub schema: &'a str,
    pub role: &'a str,
    pub password: &'a str,
}

impl<'a> Tenant<'a> {
    pub fn from_request(req: &'a ProvisionRequest) -> Result<Self, ProvisionError> {
        let schema = non_empty(req.schema.as_deref()).ok_or(ProvisionError::MissingField("schema"))?;
        Ok(Tenant {
            user: non_empty(req.connection.user.as_deref())
                .ok_or(ProvisionError::MissingField("user"))?,
            schema,
            role: req.role().unwrap_or(schema),
            password: req
                .schema_password
                .as_deref()
                .ok_or(ProvisionError::MissingField("schema_password"))?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Builds the four provisioning statements, in execution order:
/// create role, set login password, grant role to the user, create database.
pub fn plan(tenant: &Tenant<'_>, policy: PlanPolicy) -> Result<Vec<Statement>, ProvisionError> {
    let ids = policy.identifiers;
    let role = ids.identifier("schema_role", tenant.role)?;
    let user = ids.identifier("user", tenant.user)?;
    let schema = ids.identifier("schema", tenant.schema)?;
    let password = ids.literal(tenant.password);

    Ok(vec![
        // Collides on re-invocation; the ALTER below still rotates the password.
        Statement::optional(format!("CREATE ROLE {role};")),
        Statement::required(format!(
            "ALTER ROLE {role} WITH LOGIN ENCRYPTED PASSWORD {password};"
        )),
        Statement::required(format!("GRANT {role} TO {user};")),
        Statement {
            query: format!("CREATE DATABASE {schema} OWNER {role};"),
            required: policy.create_database_required,
        },
    ])
}
