use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account.
///
/// The watched/review counters are set to zero at registration and are not
/// maintained afterwards; they exist for profile display only. The password
/// hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub watched_movies_count: Option<i32>,
    pub reviews_count: Option<i32>,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Lookup predicates for users
#[derive(Debug, Clone)]
pub enum UserFilter {
    Id(Uuid),
    Username(String),
    /// Matches username or email against one login identifier
    Identifier(String),
    /// Matches either field independently, for registration collision checks
    UsernameOrEmail { username: String, email: String },
}
