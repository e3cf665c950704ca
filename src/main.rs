use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tenant_provisioner::{
    config::Config, db::PgConnector, routes, services::Provisioner, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);
    info!(
        identifiers = ?config.plan_policy.identifiers,
        create_database_required = config.plan_policy.create_database_required,
        "provisioning policy loaded"
    );

    let state = AppState {
        provisioner: Arc::new(Provisioner::new(PgConnector, config.plan_policy)),
        config: config.clone(),
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("tenant provisioner listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
