//! Repository for the `users` table.

use sqlx::PgPool;

use gradebook_core::roles::UserRole;
use gradebook_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, image, created_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// The unique index on `email` is the authoritative duplicate check;
    /// a violation surfaces as a database error with constraint
    /// `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, role, image)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.role)
            .bind(&input.image)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive), regardless of role.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email, constrained to the given role.
    pub async fn find_by_email_and_role(
        pool: &PgPool,
        email: &str,
        role: UserRole,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND role = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash. Returns `true` if a row was updated.
    pub async fn update_password(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a user's email address. Returns `true` if a row was updated.
    ///
    /// The caller is responsible for the same-email and already-taken
    /// business checks; `uq_users_email` backstops the latter.
    pub async fn update_email(
        pool: &PgPool,
        email: &str,
        new_email: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET email = $2 WHERE email = $1")
            .bind(email)
            .bind(new_email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace a user's avatar image. Returns `true` if a row was updated.
    pub async fn update_image(
        pool: &PgPool,
        email: &str,
        image: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET image = $2 WHERE email = $1")
            .bind(email)
            .bind(image)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
