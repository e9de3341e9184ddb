use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{User, UserFilter};
use crate::services::password;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/:username", get(get_user))
        .route("/id/:id", get(get_user_by_id))
        .route("/username/:username", delete(delete_account))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

/// Creates a new account. No session or token is issued.
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<Value>> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(AppError::InvalidInput(
            "Username, email and password are required.".to_string(),
        ));
    }
    if !request.email.contains('@') {
        return Err(AppError::InvalidInput("Invalid email address.".to_string()));
    }

    let mut uow = state.store.begin().await?;

    // One combined collision check; callers are not told which field collided.
    let existing = uow
        .users()
        .get(UserFilter::UsernameOrEmail {
            username: request.username.clone(),
            email: request.email.clone(),
        })
        .await?;
    if existing.is_some() {
        return Err(AppError::InvalidInput(
            "Username or Email is already taken".to_string(),
        ));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: request.username,
        email: request.email,
        name: request.name,
        watched_movies_count: Some(0),
        reviews_count: Some(0),
        password_hash: password::hash(&request.password)?,
    };

    tracing::info!(user_id = %user.id, username = %user.username, "Registering new user");

    uow.users().add(user).await?;
    uow.save().await?;

    Ok(Json(json!({ "message": "Registration successful!" })))
}

/// Authenticates by username or email. The returned user record never
/// includes password material.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    let mut uow = state.store.begin().await?;

    let user = uow
        .users()
        .get(UserFilter::Identifier(request.identifier.clone()))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    if !password::verify(&request.password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(json!({
        "message": "Login successful!",
        "user": user,
    })))
}

async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    let mut uow = state.store.begin().await?;

    let user = uow
        .users()
        .get(UserFilter::Username(username))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let mut uow = state.store.begin().await?;

    let user = uow
        .users()
        .get(UserFilter::Id(id))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Deletes the account. Watchlist and review rows persist detached; there is
/// no cascade.
async fn delete_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Value>> {
    let mut uow = state.store.begin().await?;

    let user = uow
        .users()
        .get(UserFilter::Username(username))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, username = %user.username, "Deleting account");

    uow.users().remove(user).await?;
    uow.save().await?;

    Ok(Json(json!({ "message": "User account deleted successfully!" })))
}
