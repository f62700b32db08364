//! Product service - catalogue CRUD with ownership checks.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{require_owner, Product, ProductDraft};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Product service trait for dependency injection.
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, owner_id: Uuid, draft: ProductDraft) -> AppResult<Product>;

    /// Update a product; only its owner may do so
    async fn update(&self, caller_id: Uuid, product_id: Uuid, draft: ProductDraft)
        -> AppResult<Product>;

    /// Delete a product; only its owner may do so
    async fn delete(&self, caller_id: Uuid, product_id: Uuid) -> AppResult<()>;

    /// Products listed by one user
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Product>>;

    async fn list_all(&self) -> AppResult<Vec<Product>>;
}

pub struct ProductManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProductManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn owned_product(&self, caller_id: Uuid, product_id: Uuid) -> AppResult<Product> {
        let product = self
            .uow
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or_not_found("Product")?;

        require_owner(product.owner_id, caller_id)?;
        Ok(product)
    }
}

#[async_trait]
impl<U: UnitOfWork> ProductService for ProductManager<U> {
    async fn create(&self, owner_id: Uuid, draft: ProductDraft) -> AppResult<Product> {
        let product = self.uow.products().create(owner_id, draft).await?;
        tracing::info!(product_id = %product.id, owner_id = %owner_id, "Product created");
        Ok(product)
    }

    async fn update(
        &self,
        caller_id: Uuid,
        product_id: Uuid,
        draft: ProductDraft,
    ) -> AppResult<Product> {
        let mut product = self.owned_product(caller_id, product_id).await?;
        product.apply(draft);
        self.uow.products().update(product).await
    }

    async fn delete(&self, caller_id: Uuid, product_id: Uuid) -> AppResult<()> {
        self.owned_product(caller_id, product_id).await?;
        self.uow.products().delete(product_id).await?;
        tracing::info!(product_id = %product_id, "Product removed");
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Product>> {
        self.uow
            .products()
            .list_by_owner(owner_id)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, owner_id = %owner_id, "Listing products by owner failed");
                AppError::validation("Invalid user id")
            })
    }

    async fn list_all(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        MockProductRepository, MockUserRepository, ProductRepository, UserRepository,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    struct TestUnitOfWork {
        products: Arc<MockProductRepository>,
    }

    impl UnitOfWork for TestUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            Arc::new(MockUserRepository::new())
        }

        fn products(&self) -> Arc<dyn ProductRepository> {
            self.products.clone()
        }
    }

    fn service(repo: MockProductRepository) -> ProductManager<TestUnitOfWork> {
        ProductManager::new(Arc::new(TestUnitOfWork {
            products: Arc::new(repo),
        }))
    }

    fn product(id: Uuid, owner_id: Uuid) -> Product {
        Product {
            id,
            owner_id,
            name: "Lamp".to_string(),
            brand: "Lumen".to_string(),
            price: 10.0,
            available_for_sell: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Desk lamp".to_string(),
            brand: "Lumen".to_string(),
            price: 24.0,
            available_for_sell: false,
        }
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();

        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(move |id| Ok(Some(product(id, owner))));
        repo.expect_update().times(1).returning(|p| Ok(p));

        let updated = service(repo).update(owner, id, draft()).await.unwrap();
        assert_eq!(updated.name, "Desk lamp");
        assert_eq!(updated.price, 24.0);
        assert!(!updated.available_for_sell);
    }

    #[tokio::test]
    async fn test_update_by_other_user_denied() {
        let owner = Uuid::new_v4();

        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(product(id, owner))));
        repo.expect_update().never();

        let result = service(repo)
            .update(Uuid::new_v4(), Uuid::new_v4(), draft())
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo)
            .update(Uuid::new_v4(), Uuid::new_v4(), draft())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Product not found"));
    }

    #[tokio::test]
    async fn test_delete_checks_owner_before_deleting() {
        let owner = Uuid::new_v4();

        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(product(id, owner))));
        repo.expect_delete().never();

        let result = service(repo).delete(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();

        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(product(id, owner))));
        repo.expect_delete().with(eq(id)).times(1).returning(|_| Ok(()));

        assert!(service(repo).delete(owner, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_by_owner_normalizes_store_errors() {
        let mut repo = MockProductRepository::new();
        repo.expect_list_by_owner()
            .returning(|_| Err(AppError::internal("connection reset")));

        let result = service(repo).list_by_owner(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Validation(ref m)) if m == "Invalid user id"));
    }

    #[tokio::test]
    async fn test_create_passes_owner() {
        let owner = Uuid::new_v4();

        let mut repo = MockProductRepository::new();
        repo.expect_create()
            .withf(move |o, d| *o == owner && d.name == "Desk lamp")
            .returning(|owner, d| {
                let mut p = product(Uuid::new_v4(), owner);
                p.apply(d);
                Ok(p)
            });

        let created = service(repo).create(owner, draft()).await.unwrap();
        assert_eq!(created.owner_id, owner);
    }
}
