//! Product domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product listed by a user
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    /// Creating user; the only account allowed to mutate the product
    pub owner_id: Uuid,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub available_for_sell: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated product fields, used for both create and update
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub available_for_sell: bool,
}

impl Product {
    /// Overwrite the editable fields with `draft`.
    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.brand = draft.brand;
        self.price = draft.price;
        self.available_for_sell = draft.available_for_sell;
        self.updated_at = Utc::now();
    }
}

/// Product response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Owner user id
    #[serde(rename = "user")]
    pub owner_id: Uuid,
    #[schema(example = "Trail runner")]
    pub name: String,
    #[schema(example = "Acme")]
    pub brand: String,
    #[schema(example = 89.9)]
    pub price: f64,
    pub available_for_sell: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            owner_id: product.owner_id,
            name: product.name,
            brand: product.brand,
            price: product.price,
            available_for_sell: product.available_for_sell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wire_shape() {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Lamp".to_string(),
            brand: "Lumen".to_string(),
            price: 12.5,
            available_for_sell: true,
            created_at: now,
            updated_at: now,
        };
        let owner = product.owner_id;
        let json = serde_json::to_value(ProductResponse::from(product)).unwrap();

        assert_eq!(json["user"], owner.to_string());
        assert_eq!(json["availableForSell"], true);
        assert!(json.get("_id").is_some());
    }
}
