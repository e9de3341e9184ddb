use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Review, ReviewFilter, UserFilter, WatchlistFilter};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/AddReview", post(add_review))
        .route("/EditReview", put(edit_review))
        .route("/user/:userId", get(reviews_by_user))
        .route("/movie/:movieId", get(reviews_for_movie))
        .route("/:userId/:movieId", get(get_review).delete(delete_review))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user_id: Uuid,
    pub movie_id: i32,
    pub review_text: String,
    pub rating: f64,
}

/// One review joined with its reviewer's username, for the per-movie listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieReview {
    pub owner_id: Uuid,
    pub content: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

fn validate_rating(rating: f64) -> AppResult<()> {
    if !(1.0..=10.0).contains(&rating) {
        return Err(AppError::InvalidInput(
            "Rating must be between 1 and 10.".to_string(),
        ));
    }
    Ok(())
}

/// Creates a review. The movie must already be marked watched on the
/// reviewer's watchlist.
async fn add_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<Json<Value>> {
    if request.review_text.trim().is_empty() {
        return Err(AppError::InvalidInput("Review cannot be empty.".to_string()));
    }
    validate_rating(request.rating)?;

    let mut uow = state.store.begin().await?;

    let user = uow
        .users()
        .get(UserFilter::Id(request.user_id))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    let watched = uow
        .watchlist()
        .get(WatchlistFilter::WatchedEntry {
            owner_id: request.user_id,
            movie_id: request.movie_id,
        })
        .await?;
    if watched.is_none() {
        return Err(AppError::BusinessRule(
            "Movie must be marked as watched before adding a review.".to_string(),
        ));
    }

    let review = Review {
        owner_id: request.user_id,
        movie_id: request.movie_id,
        content: request.review_text,
        rating: request.rating,
        created_at: Utc::now(),
    };

    tracing::info!(
        user_id = %user.id,
        movie_id = review.movie_id,
        rating = review.rating,
        "Adding review"
    );

    uow.reviews().add(review).await?;
    uow.save().await?;

    Ok(Json(json!({ "message": "Review added successfully." })))
}

async fn get_review(
    State(state): State<AppState>,
    Path((user_id, movie_id)): Path<(Uuid, i32)>,
) -> AppResult<Json<Review>> {
    let mut uow = state.store.begin().await?;

    let review = uow
        .reviews()
        .get(ReviewFilter::Entry { owner_id: user_id, movie_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found.".to_string()))?;

    Ok(Json(review))
}

async fn reviews_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<Review>>> {
    let mut uow = state.store.begin().await?;

    let reviews = uow
        .reviews()
        .get_all(Some(ReviewFilter::Owner(user_id)))
        .await?;
    if reviews.is_empty() {
        return Err(AppError::NotFound(
            "No reviews found for this user.".to_string(),
        ));
    }

    Ok(Json(reviews))
}

async fn delete_review(
    State(state): State<AppState>,
    Path((user_id, movie_id)): Path<(Uuid, i32)>,
) -> AppResult<StatusCode> {
    let mut uow = state.store.begin().await?;

    let review = uow
        .reviews()
        .get(ReviewFilter::Entry { owner_id: user_id, movie_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found.".to_string()))?;

    uow.reviews().remove(review).await?;
    uow.save().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the text and rating of an existing review
async fn edit_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<Json<Value>> {
    if request.review_text.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Review text cannot be empty.".to_string(),
        ));
    }
    validate_rating(request.rating)?;

    let mut uow = state.store.begin().await?;

    let mut review = uow
        .reviews()
        .get(ReviewFilter::Entry {
            owner_id: request.user_id,
            movie_id: request.movie_id,
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found.".to_string()))?;

    review.content = request.review_text;
    review.rating = request.rating;

    uow.reviews().update(review).await?;
    uow.save().await?;

    Ok(Json(json!({ "message": "Review updated successfully." })))
}

/// Lists a movie's reviews joined with each reviewer's username. Reviews whose
/// owner no longer exists are skipped. An empty result is a friendly message,
/// not an error.
async fn reviews_for_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let mut uow = state.store.begin().await?;

    let reviews = uow
        .reviews()
        .get_all(Some(ReviewFilter::Movie(movie_id)))
        .await?;
    if reviews.is_empty() {
        return Ok(Json(
            json!({ "message": "No reviews yet. Be the first to leave a review!" }),
        ));
    }

    let mut listing = Vec::with_capacity(reviews.len());
    for review in reviews {
        let Some(user) = uow.users().get(UserFilter::Id(review.owner_id)).await? else {
            continue;
        };
        listing.push(MovieReview {
            owner_id: review.owner_id,
            content: review.content,
            rating: review.rating,
            created_at: review.created_at,
            username: user.username,
        });
    }

    Ok(Json(json!(listing)))
}
