//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, product_handler, user_handler};
use crate::domain::{AuthResponse, ProductResponse, UserResponse, UserRole};
use crate::types::MessageResponse;

/// OpenAPI documentation for the Shopfront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shopfront API",
        version = "0.1.0",
        description = "Accounts, password reset and product catalogue for the Shopfront store"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::request_password_reset,
        auth_handler::confirm_password_reset,
        // User endpoints
        user_handler::get_current_user,
        user_handler::list_users,
        // Product endpoints
        product_handler::list_products,
        product_handler::create_product,
        product_handler::list_products_by_owner,
        product_handler::update_product,
        product_handler::delete_product,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            AuthResponse,
            ProductResponse,
            MessageResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::ResetRequest,
            auth_handler::NewPasswordRequest,
            product_handler::ProductRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password reset"),
        (name = "Users", description = "Account lookup"),
        (name = "Products", description = "Product catalogue")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by /api/users/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        assert!(paths.contains(&"/api/users/register".to_string()));
        assert!(paths.contains(&"/api/users/reset-password/{user_id}/{token}".to_string()));
        assert!(paths.contains(&"/api/products/{id}".to_string()));
    }
}
