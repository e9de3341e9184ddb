use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{WatchlistEntry, WatchlistFilter};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/AddToWatchList", post(add_to_watchlist))
        .route("/IsMovieWatched", get(is_movie_watched))
        .route("/:id", get(get_watchlist).put(mark_as_watched))
        .route("/:id/:movieId", delete(remove_from_watchlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairQuery {
    pub user_id: Uuid,
    pub movie_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Uuid,
}

/// Adds a movie to the user's watchlist, unwatched
async fn add_to_watchlist(
    State(state): State<AppState>,
    Query(params): Query<PairQuery>,
) -> AppResult<(StatusCode, Json<WatchlistEntry>)> {
    if params.user_id.is_nil() || params.movie_id == 0 {
        return Err(AppError::InvalidInput(
            "Invalid user ID or movie ID.".to_string(),
        ));
    }

    let mut uow = state.store.begin().await?;

    let existing = uow
        .watchlist()
        .get(WatchlistFilter::Entry {
            owner_id: params.user_id,
            movie_id: params.movie_id,
        })
        .await?;
    if existing.is_some() {
        return Err(AppError::InvalidInput(
            "Movie is already in watchlist.".to_string(),
        ));
    }

    let entry = WatchlistEntry {
        owner_id: params.user_id,
        movie_id: params.movie_id,
        watched: false,
    };

    tracing::info!(
        user_id = %entry.owner_id,
        movie_id = entry.movie_id,
        "Adding movie to watchlist"
    );

    uow.watchlist().add(entry.clone()).await?;
    uow.save().await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_watchlist(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    let mut uow = state.store.begin().await?;

    let entries = uow
        .watchlist()
        .get_all(Some(WatchlistFilter::Owner(user_id)))
        .await?;
    if entries.is_empty() {
        return Err(AppError::NotFound("Watchlist is empty.".to_string()));
    }

    Ok(Json(entries))
}

/// Flips the watched flag to true for the (user, movie) pair
async fn mark_as_watched(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
    Query(params): Query<OwnerQuery>,
) -> AppResult<Json<WatchlistEntry>> {
    let mut uow = state.store.begin().await?;

    let mut entry = uow
        .watchlist()
        .get(WatchlistFilter::Entry {
            owner_id: params.user_id,
            movie_id,
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found in watchlist.".to_string()))?;

    entry.watched = true;

    uow.watchlist().update(entry.clone()).await?;
    uow.save().await?;

    Ok(Json(entry))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path((user_id, movie_id)): Path<(Uuid, i32)>,
) -> AppResult<StatusCode> {
    let mut uow = state.store.begin().await?;

    let entry = uow
        .watchlist()
        .get(WatchlistFilter::Entry {
            owner_id: user_id,
            movie_id,
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found in watchlist.".to_string()))?;

    uow.watchlist().remove(entry).await?;
    uow.save().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn is_movie_watched(
    State(state): State<AppState>,
    Query(params): Query<PairQuery>,
) -> AppResult<Json<bool>> {
    let mut uow = state.store.begin().await?;

    let entry = uow
        .watchlist()
        .get(WatchlistFilter::Entry {
            owner_id: params.user_id,
            movie_id: params.movie_id,
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found in watchlist.".to_string()))?;

    Ok(Json(entry.watched))
}
