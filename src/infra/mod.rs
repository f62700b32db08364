//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Outbound mail
//! - Unit of Work for repository access

pub mod db;
pub mod mail;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use mail::{mailer_from_settings, LogMailer, MailMessage, Mailer, SmtpMailer};
pub use repositories::{
    ProductRepository, ProductStore, UserRepository, UserStore, DUPLICATE_EMAIL_MESSAGE,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockProductRepository, MockUserRepository};
