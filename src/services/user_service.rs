//! User service - Read access to accounts.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found("User")
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::errors::AppError;
    use crate::infra::{
        MockProductRepository, MockUserRepository, ProductRepository, UserRepository,
    };
    use mockall::predicate::eq;

    struct TestUnitOfWork {
        users: Arc<MockUserRepository>,
    }

    impl UnitOfWork for TestUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn products(&self) -> Arc<dyn ProductRepository> {
            Arc::new(MockProductRepository::new())
        }
    }

    fn service(repo: MockUserRepository) -> UserManager<TestUnitOfWork> {
        UserManager::new(Arc::new(TestUnitOfWork {
            users: Arc::new(repo),
        }))
    }

    fn create_test_user(id: Uuid) -> User {
        User::new(
            id,
            "Test User".to_string(),
            "test@example.com".to_string(),
            "hashed".to_string(),
        )
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let user_id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(user_id))
            .returning(|id| Ok(Some(create_test_user(id))));

        let user = service(repo).get_user(user_id).await.unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo).get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "User not found"));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repo = MockUserRepository::new();
        repo.expect_list().times(1).returning(|| {
            Ok(vec![
                create_test_user(Uuid::new_v4()),
                create_test_user(Uuid::new_v4()),
            ])
        });

        let users = service(repo).list_users().await.unwrap();
        assert_eq!(users.len(), 2);
    }
}
