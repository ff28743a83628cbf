//! User repository.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use bazaar_core::UserId;

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    image_path: Option<String>,
    blocked: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            image_path: row.image_path,
            blocked: row.blocked,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, phone, password_hash, image_path, blocked, created_at";

/// Get a user by their ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id(
    executor: impl PgExecutor<'_>,
    id: UserId,
) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id.as_i32())
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Into::into))
}

/// Get a user by their email address.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_email(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Into::into))
}

/// Whether a user with this email already exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn email_exists(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<bool, RepositoryError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
    )
    .bind(email)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Whether a user with this phone number already exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn phone_exists(
    executor: impl PgExecutor<'_>,
    phone: &str,
) -> Result<bool, RepositoryError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE phone = $1)",
    )
    .bind(phone)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Create a new user.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email or phone is already
/// taken (the unique constraints are the source of truth; callers may
/// pre-check for a friendlier early exit).
/// Returns `RepositoryError::Database` for other database errors.
pub async fn create(
    executor: impl PgExecutor<'_>,
    name: &str,
    email: &str,
    phone: &str,
    password_hash: &str,
    image_path: Option<&str>,
) -> Result<User, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (name, email, phone, password_hash, image_path) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(password_hash)
    .bind(image_path)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        map_unique_violation(e, |constraint| match constraint {
            Some("users_phone_key") => "Phone number already exists".to_owned(),
            _ => "Email already exists".to_owned(),
        })
    })?;

    Ok(row.into())
}

/// Update a user's profile fields (name, phone, image path).
///
/// Callers resolve partial updates by loading the user first and passing
/// the final values here.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
/// Returns `RepositoryError::Conflict` if the phone is taken by another user.
pub async fn update_profile(
    executor: impl PgExecutor<'_>,
    id: UserId,
    name: &str,
    phone: &str,
    image_path: Option<&str>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE users SET name = $1, phone = $2, image_path = $3 WHERE id = $4",
    )
    .bind(name)
    .bind(phone)
    .bind(image_path)
    .bind(id.as_i32())
    .execute(executor)
    .await
    .map_err(|e| map_unique_violation(e, |_| "Phone number already exists".to_owned()))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Replace a user's password hash.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn update_password(
    executor: impl PgExecutor<'_>,
    id: UserId,
    password_hash: &str,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(id.as_i32())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Delete a user by their ID.
///
/// Cascades to their orders and favorites.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn delete(executor: impl PgExecutor<'_>, id: UserId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id.as_i32())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}
