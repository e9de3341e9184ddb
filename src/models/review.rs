use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A (user, movie) pairing recording free-text commentary and a rating.
///
/// Ratings are constrained to [1, 10] by the API layer, and `created_at` is
/// assigned at insert time.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub owner_id: Uuid,
    pub movie_id: i32,
    pub content: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Lookup predicates for reviews
#[derive(Debug, Clone)]
pub enum ReviewFilter {
    Owner(Uuid),
    Movie(i32),
    Entry { owner_id: Uuid, movie_id: i32 },
}
