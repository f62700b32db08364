//! Utility helpers.

pub mod templates;

pub use templates::ResetEmailTemplate;
