//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, Mailer};
use crate::services::{AuthService, ProductService, ServiceContainer, Services, UserService};
use crate::utils::ResetEmailTemplate;

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Product service
    pub product_service: Arc<dyn ProductService>,
    /// Database handle, absent when services run over another store
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state from a migrated database and config.
    pub fn from_config(
        database: Arc<Database>,
        config: &Config,
        mailer: Arc<dyn Mailer>,
        template: ResetEmailTemplate,
    ) -> Self {
        let container =
            Services::from_connection(database.get_connection(), config, mailer, template);
        Self::from_services(&container).with_database(database)
    }

    /// Create application state from any service container.
    pub fn from_services(container: &impl ServiceContainer) -> Self {
        Self::new(container.auth(), container.users(), container.products())
    }

    /// Create new application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        product_service: Arc<dyn ProductService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            product_service,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }
}
