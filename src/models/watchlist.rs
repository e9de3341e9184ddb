use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A (user, movie) pairing recording intent to watch and watched status.
///
/// The movie id comes from the external catalog and is opaque here. A user can
/// hold at most one entry per movie (composite primary key).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub owner_id: Uuid,
    pub movie_id: i32,
    pub watched: bool,
}

/// Lookup predicates for watchlist entries
#[derive(Debug, Clone)]
pub enum WatchlistFilter {
    Owner(Uuid),
    Entry { owner_id: Uuid, movie_id: i32 },
    /// The entry for the pair, only if already marked watched
    WatchedEntry { owner_id: Uuid, movie_id: i32 },
}
