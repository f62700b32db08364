//! Email templates.

use std::fs;

use crate::errors::{AppError, AppResult};

const DEFAULT_RESET_TEMPLATE: &str = include_str!("../../templates/reset_password.html");

/// HTML template for the password reset email.
///
/// Placeholders `{{email}}` and `{{link}}` are replaced verbatim, first
/// occurrence only.
#[derive(Debug, Clone)]
pub struct ResetEmailTemplate {
    html: String,
}

impl Default for ResetEmailTemplate {
    fn default() -> Self {
        Self {
            html: DEFAULT_RESET_TEMPLATE.to_string(),
        }
    }
}

impl ResetEmailTemplate {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Load the template from `path`, or fall back to the built-in one.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        match path {
            Some(path) => {
                let html = fs::read_to_string(path).map_err(|e| {
                    AppError::internal(format!("Failed to read template {}: {}", path, e))
                })?;
                tracing::info!(path = %path, "Loaded reset email template");
                Ok(Self::new(html))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn render(&self, email: &str, link: &str) -> String {
        self.html
            .replacen("{{email}}", email, 1)
            .replacen("{{link}}", link, 1)
    }
}
