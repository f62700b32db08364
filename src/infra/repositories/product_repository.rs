//! Product repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use crate::domain::{Product, ProductDraft};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn create(&self, owner_id: Uuid, draft: ProductDraft) -> AppResult<Product>;

    /// Persist the editable fields of an existing product
    async fn update(&self, product: Product) -> AppResult<Product>;

    /// Delete by id; `NotFound` when nothing was removed
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Product>>;

    async fn list(&self) -> AppResult<Vec<Product>>;
}

/// SeaORM-backed implementation of ProductRepository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Product::from))
    }

    async fn create(&self, owner_id: Uuid, draft: ProductDraft) -> AppResult<Product> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner_id),
            name: Set(draft.name),
            brand: Set(draft.brand),
            price: Set(draft.price),
            available_for_sell: Set(draft.available_for_sell),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Product::from(model))
    }

    async fn update(&self, product: Product) -> AppResult<Product> {
        let existing = ProductEntity::find_by_id(product.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(product.name);
        active.brand = Set(product.brand);
        active.price = Set(product.price);
        active.available_for_sell = Set(product.available_for_sell);
        active.updated_at = Set(product.updated_at);

        let model = active.update(&self.db).await?;
        Ok(Product::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ProductEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Product"));
        }

        Ok(())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::UserId.eq(owner_id))
            .order_by_asc(product::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }
}
