use sqlx::PgPool;

use crate::error::StoreError;
use crate::users::repo_types::{NewUser, User, UserChanges};

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, image_path, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. A racing insert for the same email surfaces as
    /// [`StoreError::DuplicateEmail`] via the unique index.
    pub async fn create(db: &PgPool, new: &NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, email, password_hash, image_path, created_at
            "#,
        )
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Apply the provided fields to the row with this email and return the
    /// post-update record, or `None` if no such user exists.
    pub async fn update_by_email(
        db: &PgPool,
        email: &str,
        changes: &UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                password_hash = COALESCE($3, password_hash),
                image_path = COALESCE($4, image_path)
            WHERE email = $1
            RETURNING id, full_name, email, password_hash, image_path, created_at
            "#,
        )
        .bind(email)
        .bind(&changes.full_name)
        .bind(&changes.password_hash)
        .bind(&changes.image_path)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Remove the row with this email, returning it if it existed.
    pub async fn delete_by_email(db: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            DELETE FROM users
            WHERE email = $1
            RETURNING id, full_name, email, password_hash, image_path, created_at
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list_all(db: &PgPool) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, image_path, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}
