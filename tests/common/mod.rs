//! Shared fixtures: in-memory repositories, recording mailers and a
//! fully wired service stack that needs no database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use shopfront_api::config::Config;
use shopfront_api::domain::{HashCost, NewUser, Product, ProductDraft, User, UserRole};
use shopfront_api::errors::{AppError, AppResult};
use shopfront_api::infra::{
    MailMessage, Mailer, ProductRepository, UnitOfWork, UserRepository, DUPLICATE_EMAIL_MESSAGE,
};
use shopfront_api::services::{AuthService, ProductService, ServiceContainer, Services};
use shopfront_api::utils::ResetEmailTemplate;
use shopfront_api::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const CLIENT_URL: &str = "http://shop.test";

/// Template that exposes the link on its own line for easy extraction
pub const TEST_TEMPLATE: &str = "to={{email}}\nlink={{link}}\n";

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(DUPLICATE_EMAIL_MESSAGE));
        }
        let user = User::new(
            Uuid::new_v4(),
            new_user.name,
            new_user.email,
            new_user.password_hash,
        );
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn replace_password_hash(
        &self,
        id: Uuid,
        current_hash: &str,
        new_hash: String,
    ) -> AppResult<bool> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&id) {
            Some(user) if user.password_hash == current_hash => {
                user.password_hash = new_hash;
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or_else(|| AppError::not_found("User"))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<_> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

#[derive(Default)]
pub struct MemoryProducts {
    products: Mutex<HashMap<Uuid, Product>>,
}

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, owner_id: Uuid, draft: ProductDraft) -> AppResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            owner_id,
            name: draft.name,
            brand: draft.brand,
            price: draft.price,
            available_for_sell: draft.available_for_sell,
            created_at: now,
            updated_at: now,
        };
        self.products
            .lock()
            .unwrap()
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: Product) -> AppResult<Product> {
        let mut products = self.products.lock().unwrap();
        if !products.contains_key(&product.id) {
            return Err(AppError::not_found("Product"));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.products
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Product"))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Product>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub users: Arc<MemoryUsers>,
    pub products: Arc<MemoryProducts>,
}

impl UnitOfWork for MemoryStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }
}

/// Keeps every message it is asked to send
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn last(&self) -> Option<MailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Rejects every message
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: MailMessage) -> AppResult<()> {
        Err(AppError::mail("relay refused connection"))
    }
}

pub fn test_config() -> Config {
    let mut config = Config::with_secret(TEST_SECRET).unwrap();
    config.client_url = CLIENT_URL.to_string();
    config.hash_cost = HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    config
}

/// A service stack over in-memory storage
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub services: Services,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let services = Services::new(
            store.clone(),
            &config,
            mailer.clone(),
            ResetEmailTemplate::new(TEST_TEMPLATE),
        );
        Self {
            store,
            mailer,
            services,
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.services.auth()
    }

    pub fn products(&self) -> Arc<dyn ProductService> {
        self.services.products()
    }

    pub fn state(&self) -> AppState {
        AppState::from_services(&self.services)
    }

    /// Reset link from the most recent email
    pub fn last_reset_link(&self) -> Option<String> {
        let message = self.mailer.last()?;
        message
            .html
            .lines()
            .find_map(|l| l.strip_prefix("link="))
            .map(str::to_string)
    }

    /// Token segment of the most recent reset link
    pub fn last_reset_token(&self) -> Option<String> {
        self.last_reset_link()?
            .rsplit('/')
            .next()
            .map(str::to_string)
    }

    pub async fn promote(&self, user_id: Uuid) {
        self.store
            .users
            .set_role(user_id, UserRole::Admin)
            .await
            .unwrap();
    }
}
