//! Service Container - builds every service from shared infrastructure.

use std::sync::Arc;

use super::{
    AuthService, AuthSettings, Authenticator, ProductManager, ProductService, TokenIssuer,
    UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{Mailer, Persistence, UnitOfWork};
use crate::utils::ResetEmailTemplate;

/// Centralized access to all application services.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn products(&self) -> Arc<dyn ProductService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    product_service: Arc<dyn ProductService>,
}

impl Services {
    /// Wire services over any unit of work
    pub fn new<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        config: &Config,
        mailer: Arc<dyn Mailer>,
        template: ResetEmailTemplate,
    ) -> Self {
        let auth_service = Arc::new(Authenticator::new(
            uow.clone(),
            TokenIssuer::from_config(config),
            mailer,
            template,
            AuthSettings::from_config(config),
        ));

        Self {
            auth_service,
            user_service: Arc::new(UserManager::new(uow.clone())),
            product_service: Arc::new(ProductManager::new(uow)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &Config,
        mailer: Arc<dyn Mailer>,
        template: ResetEmailTemplate,
    ) -> Self {
        Self::new(Arc::new(Persistence::new(db)), config, mailer, template)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }
}
