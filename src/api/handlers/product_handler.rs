//! Product catalogue handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::MAX_PRODUCT_TEXT_LENGTH;
use crate::domain::{ProductDraft, ProductResponse};
use crate::errors::{AppError, AppResult};
use crate::services::MISSING_FIELDS_MESSAGE;
use crate::types::MessageResponse;

pub const PRODUCT_REMOVED_MESSAGE: &str = "Product removed";
const INVALID_USER_ID_MESSAGE: &str = "Invalid user id";

/// Create or update product request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(max = MAX_PRODUCT_TEXT_LENGTH, message = "Name is too long"))]
    #[schema(example = "Desk lamp")]
    pub name: Option<String>,
    #[validate(length(max = MAX_PRODUCT_TEXT_LENGTH, message = "Brand is too long"))]
    #[schema(example = "Lumen")]
    pub brand: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    #[schema(example = 24.5)]
    pub price: Option<f64>,
    pub available_for_sell: Option<bool>,
}

impl ProductRequest {
    /// Every field is required; blank text counts as missing
    fn into_draft(self) -> AppResult<ProductDraft> {
        let missing = || AppError::validation(MISSING_FIELDS_MESSAGE);
        let text = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(ProductDraft {
            name: text(self.name).ok_or_else(missing)?,
            brand: text(self.brand).ok_or_else(missing)?,
            price: self.price.ok_or_else(missing)?,
            available_for_sell: self.available_for_sell.ok_or_else(missing)?,
        })
    }
}

/// Product routes open to anonymous callers
pub fn public_product_routes() -> Router<AppState> {
    Router::new().route("/", get(list_products))
}

/// Product routes that need a session
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product))
        .route(
            "/:id",
            get(list_products_by_owner)
                .put(update_product)
                .delete(delete_product),
        )
}

/// List every product
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state.product_service.list_all().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Create a product owned by the caller
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authorized")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let product = state
        .product_service
        .create(current_user.id, payload.into_draft()?)
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// List the products of one user
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Owner user ID")),
    responses(
        (status = 200, description = "Products of the user", body = Vec<ProductResponse>),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Not authorized")
    )
)]
pub async fn list_products_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let owner_id =
        Uuid::parse_str(&owner_id).map_err(|_| AppError::validation(INVALID_USER_ID_MESSAGE))?;

    let products = state.product_service.list_by_owner(owner_id).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Update a product (owner only)
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Product ID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Product not found or invalid fields"),
        (status = 401, description = "Not the owner")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    let id = parse_product_id(&id)?;

    let product = state
        .product_service
        .update(current_user.id, id, payload.into_draft()?)
        .await?;

    Ok(Json(ProductResponse::from(product)))
}

/// Delete a product (owner only)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product removed", body = MessageResponse),
        (status = 400, description = "Product not found"),
        (status = 401, description = "Not the owner")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_product_id(&id)?;

    state.product_service.delete(current_user.id, id).await?;

    Ok(Json(MessageResponse::new(PRODUCT_REMOVED_MESSAGE)))
}

fn parse_product_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::not_found("Product"))
}
