//! Database operations for the `admin_users` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A back-office account. `password_hash` is the bcrypt hash produced by
/// [`aip_core::hash_password`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Inserts a new admin account. Emails are stored lowercased.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a unique
/// violation when the email is already registered.
pub async fn create_admin_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<AdminUserRow, DbError> {
    let row = sqlx::query_as::<_, AdminUserRow>(
        "INSERT INTO admin_users (email, password_hash) \
         VALUES (LOWER($1), $2) \
         RETURNING id, email, password_hash, created_at",
    )
    .bind(email.trim())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Case-insensitive lookup by email.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_admin_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<AdminUserRow>, DbError> {
    let row = sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, email, password_hash, created_at \
         FROM admin_users \
         WHERE email = LOWER($1)",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
