//! Domain layer - Core business entities and rules
//!
//! Entities, value objects and pure authorization/validation rules.
//! Nothing here touches the database or the network.

pub mod access;
pub mod password;
pub mod policy;
pub mod product;
pub mod user;

pub use access::{require_owner, require_role};
pub use password::{HashCost, Password};
pub use product::{Product, ProductDraft, ProductResponse};
pub use user::{AuthResponse, NewUser, User, UserResponse, UserRole};
