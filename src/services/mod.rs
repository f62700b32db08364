//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod auth_service;
pub mod container;
mod product_service;
mod token_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, AuthSettings, Authenticator, INVALID_CREDENTIALS_MESSAGE,
    MISSING_FIELDS_MESSAGE, NOT_AUTHORIZED_MESSAGE,
};
pub use product_service::{ProductManager, ProductService};
pub use token_service::{ResetClaims, SessionClaims, TokenIssuer};
pub use user_service::{UserManager, UserService};
