//! Shopfront API - accounts, password reset and product catalogue.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, password hashing and access rules
//! - **services**: Auth, user and product use cases
//! - **infra**: Database, repositories and outbound mail
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **utils**: Email templates
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! shopfront serve
//!
//! # Run migrations
//! shopfront migrate up
//!
//! # Make an account admin
//! shopfront users promote jane@example.com
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{Password, Product, User, UserRole};
pub use errors::{AppError, AppResult};
