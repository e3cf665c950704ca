pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::Provisioner;

/// Application state shared across all handlers.
pub struct AppState<C> {
    pub provisioner: Arc<Provisioner<C>>,
    pub config: Arc<Config>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            provisioner: Arc::clone(&self.provisioner),
            config: Arc::clone(&self.config),
        }
    }
}
