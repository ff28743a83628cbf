//! User domain types.

use chrono::{DateTime, Utc};

use bazaar_core::UserId;

/// A registered user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique).
    pub email: String,
    /// Phone number (unique).
    pub phone: String,
    /// Argon2id password hash. Never serialized to clients.
    pub password_hash: String,
    /// Relative path of the profile image, if one was uploaded.
    pub image_path: Option<String>,
    /// Blocked accounts cannot perform any authenticated action.
    pub blocked: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
