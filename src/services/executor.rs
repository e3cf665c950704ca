use crate::db::{Connector, Session};
use crate::error::ProvisionError;
use crate::models::{
    ConnectionOptions, Credentials, FailureInfo, Outcome, ProvisionRequest, ProvisioningResult,
    Statement,
};
use crate::services::planner::{self, PlanPolicy, Tenant};

/// Runs one provisioning invocation per call: one connection, one sequential
/// pass over the statements, connection closed on every exit path.
#[derive(Debug, Clone)]
pub struct Provisioner<C> {
    connector: C,
    policy: PlanPolicy,
}

impl<C: Connector> Provisioner<C> {
    pub fn new(connector: C, policy: PlanPolicy) -> Self {
        Self { connector, policy }
    }

    pub fn policy(&self) -> PlanPolicy {
        self.policy
    }

    pub async fn execute(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisioningResult, ProvisionError> {
        // Default-mode inputs are checked before any connection is attempted.
        let planned;
        let (statements, tenant): (&[Statement], _) = match &request.queries {
            Some(queries) => (queries.as_slice(), None),
            None => {
                let tenant = Tenant::from_request(request)?;
                planned = planner::plan(&tenant, self.policy)?;
                (planned.as_slice(), Some(tenant))
            }
        };

        let database = request.connection.target_database();
        let mut session = self
            .connector
            .connect(&request.connection)
            .await
            .map_err(|source| ProvisionError::Connect {
                database: database.to_owned(),
                source,
            })?;
        tracing::info!(database, statements = statements.len(), "connected");

        let run = run_statements(&mut session, statements).await;
        let closed = session.end().await;

        let outcomes = match (run, closed) {
            (Ok(outcomes), Ok(())) => outcomes,
            (Ok(_), Err(source)) => return Err(ProvisionError::Close(source)),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(close_err)) => {
                tracing::warn!(error = %close_err, "failed to close connection after abort");
                return Err(err);
            }
        };
        tracing::debug!(database, "connection closed");

        Ok(match tenant {
            None => ProvisioningResult::Outcomes(outcomes),
            Some(tenant) => {
                tracing::info!(schema = tenant.schema, role = tenant.role, "tenant provisioned");
                ProvisioningResult::Credentials(Credentials {
                    username: tenant.schema.to_owned(),
                    password: tenant.password.to_owned(),
                })
            }
        })
    }

    /// Opens a connection, runs `SELECT 1` and closes it again.
    pub async fn ping(&self, options: &ConnectionOptions) -> Result<(), sqlx::Error> {
        let mut session = self.connector.connect(options).await?;
        let probe = session.query("SELECT 1").await;
        let closed = session.end().await;
        probe?;
        closed
    }
}

async fn run_statements<S: Session>(
    session: &mut S,
    statements: &[Statement],
) -> Result<Vec<Outcome>, ProvisionError> {
    let mut outcomes = Vec::with_capacity(statements.len());

    for (index, statement) in statements.iter().enumerate() {
        match session.query(&statement.query).await {
            Ok(rows) => {
                tracing::debug!(index, rows = rows.len(), "statement succeeded");
                outcomes.push(Outcome::Rows(rows));
            }
            Err(source) if statement.required => {
                tracing::error!(index, error = %source, "required statement failed, aborting");
                return Err(ProvisionError::Statement { index, source });
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "optional statement failed, continuing");
                outcomes.push(Outcome::Failure(FailureInfo::from(&err)));
            }
        }
    }

    Ok(outcomes)
}
