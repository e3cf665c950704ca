use std::env;

use crate::services::{IdentifierPolicy, PlanPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub admin_key: String,
    pub plan_policy: PlanPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            admin_key: required("ADMIN_KEY")?,
            plan_policy: PlanPolicy::from_env()?,
        })
    }
}

impl PlanPolicy {
    /// Reads `TENANT_IDENTIFIERS` (`strict` | `trusted`) and
    /// `CREATE_DATABASE_REQUIRED` (bool).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let identifiers = match non_empty(lookup("TENANT_IDENTIFIERS")) {
            Some(raw) => raw.parse::<IdentifierPolicy>()?,
            None => IdentifierPolicy::default(),
        };
        let create_database_required = match non_empty(lookup("CREATE_DATABASE_REQUIRED")) {
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                anyhow::anyhow!("CREATE_DATABASE_REQUIRED must be `true` or `false`, got {raw:?}")
            })?,
            None => false,
        };
        Ok(Self {
            identifiers,
            create_database_required,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing required env var: {}", key))
}
