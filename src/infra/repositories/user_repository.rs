//! User repository - credential store.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::ROLE_USER;
use crate::domain::{NewUser, User, UserRole};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Message returned whenever an email is already taken.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already has been user";

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user with the default role.
    ///
    /// A duplicate email fails with `Conflict`, whichever request lost the race.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Swap the stored hash from `current_hash` to `new_hash`.
    ///
    /// Returns `false` without writing when the stored hash is no longer
    /// `current_hash`.
    async fn replace_password_hash(
        &self,
        id: Uuid,
        current_hash: &str,
        new_hash: String,
    ) -> AppResult<bool>;

    /// Change a user's role
    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;

    /// List all users, oldest first
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// SeaORM-backed implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Map a failed insert, turning unique-index violations into `Conflict`.
fn map_insert_error(err: DbErr) -> AppError {
    classify_insert_error(err.sql_err(), err)
}

fn classify_insert_error(kind: Option<SqlErr>, err: DbErr) -> AppError {
    match kind {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(DUPLICATE_EMAIL_MESSAGE),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(ROLE_USER.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(map_insert_error)?;
        Ok(User::from(model))
    }

    async fn replace_password_hash(
        &self,
        id: Uuid,
        current_hash: &str,
        new_hash: String,
    ) -> AppResult<bool> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(new_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::PasswordHash.eq(current_hash))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let mut active: ActiveModel = user.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec_result(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_replace_hash_swaps_when_current_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_result(1)])
            .into_connection();
        let store = UserStore::new(db.clone());

        let swapped = store
            .replace_password_hash(Uuid::new_v4(), "$argon2id$old", "$argon2id$new".into())
            .await
            .unwrap();
        assert!(swapped);

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"UPDATE "users" SET "password_hash" = $1"#), "{sql}");
        assert!(sql.contains(r#""users"."id" = $3"#), "{sql}");
        assert!(sql.contains(r#"AND "users"."password_hash" = $4"#), "{sql}");
    }

    #[tokio::test]
    async fn test_replace_hash_reports_stale_current_hash() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_result(0)])
            .into_connection();
        let store = UserStore::new(db);

        let swapped = store
            .replace_password_hash(Uuid::new_v4(), "$argon2id$stale", "$argon2id$new".into())
            .await
            .unwrap();
        assert!(!swapped);
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err = classify_insert_error(
            Some(SqlErr::UniqueConstraintViolation(
                "duplicate key value violates unique constraint \"idx_users_email\"".into(),
            )),
            DbErr::Custom("insert failed".into()),
        );
        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_EMAIL_MESSAGE));
    }

    #[test]
    fn test_other_insert_failures_stay_database_errors() {
        let fk = classify_insert_error(
            Some(SqlErr::ForeignKeyConstraintViolation("fk".into())),
            DbErr::Custom("insert failed".into()),
        );
        assert!(matches!(fk, AppError::Database(_)));

        let plain = classify_insert_error(None, DbErr::Custom("connection reset".into()));
        assert!(matches!(plain, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_create_surfaces_store_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let store = UserStore::new(db);

        let result = store
            .create(NewUser {
                name: "A".into(),
                email: "a@b.com".into(),
                password_hash: "$argon2id$hash".into(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
