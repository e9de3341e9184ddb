use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use cinelog_api::error::{AppError, AppResult};
use cinelog_api::models::{Category, MovieDetails, MoviePage, MovieSummary};
use cinelog_api::repository::memory::MemoryStore;
use cinelog_api::routes::{create_router, AppState};
use cinelog_api::services::catalog::MovieCatalog;

/// Canned catalog provider; knows exactly one movie.
struct StubCatalog;

#[async_trait]
impl MovieCatalog for StubCatalog {
    async fn browse(&self, _category: Option<Category>, page: u32) -> AppResult<MoviePage> {
        Ok(MoviePage {
            page,
            results: vec![MovieSummary {
                id: 42,
                title: "Blade Runner".to_string(),
                poster_path: Some("/blade.jpg".to_string()),
                overview: "A blade runner must pursue four replicants.".to_string(),
            }],
            total_pages: 1,
            total_results: 1,
        })
    }

    async fn details(&self, movie_id: i32) -> AppResult<MovieDetails> {
        if movie_id != 42 {
            return Err(AppError::NotFound(format!(
                "Movie {} not found in catalog",
                movie_id
            )));
        }
        Ok(MovieDetails {
            id: 42,
            title: "Blade Runner".to_string(),
            overview: "A blade runner must pursue four replicants.".to_string(),
            poster_path: Some("/blade.jpg".to_string()),
            release_date: Some("1982-06-25".to_string()),
            vote_average: Some(7.9),
        })
    }
}

fn create_test_server() -> TestServer {
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        catalog: Arc::new(StubCatalog),
    };
    TestServer::new(create_router(state)).unwrap()
}

/// Registers an account and returns its id
async fn register_user(server: &TestServer, username: &str, email: &str) -> Uuid {
    let response = server
        .post("/api/ApplicationUser/register")
        .json(&json!({
            "username": username,
            "email": email,
            "name": "Test User",
            "password": "Secret1"
        }))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/ApplicationUser/{}", username))
        .await;
    response.assert_status_ok();
    let user: Value = response.json();
    Uuid::parse_str(user["id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_then_login() {
    let server = create_test_server();
    register_user(&server, "alice", "a@x.com").await;

    let response = server
        .post("/api/ApplicationUser/login")
        .json(&json!({ "identifier": "alice", "password": "Secret1" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["message"], "Login successful!");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["watchedMoviesCount"], 0);

    // No password material in the response
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_by_email_identifier() {
    let server = create_test_server();
    register_user(&server, "alice", "a@x.com").await;

    let response = server
        .post("/api/ApplicationUser/login")
        .json(&json!({ "identifier": "a@x.com", "password": "Secret1" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let server = create_test_server();
    register_user(&server, "alice", "a@x.com").await;

    let response = server
        .post("/api/ApplicationUser/login")
        .json(&json!({ "identifier": "alice", "password": "WrongPass" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid username or password");
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_login_unknown_identifier_unauthorized() {
    let server = create_test_server();

    let response = server
        .post("/api/ApplicationUser/login")
        .json(&json!({ "identifier": "nobody", "password": "Secret1" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let server = create_test_server();
    register_user(&server, "alice", "a@x.com").await;

    // Same username, different email
    let response = server
        .post("/api/ApplicationUser/register")
        .json(&json!({
            "username": "alice",
            "email": "other@x.com",
            "name": "",
            "password": "Secret1"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Username or Email is already taken");

    // Different username, same email
    let response = server
        .post("/api/ApplicationUser/register")
        .json(&json!({
            "username": "alice2",
            "email": "a@x.com",
            "name": "",
            "password": "Secret1"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let server = create_test_server();

    let response = server
        .post("/api/ApplicationUser/register")
        .json(&json!({
            "username": "",
            "email": "a@x.com",
            "name": "",
            "password": "Secret1"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/ApplicationUser/register")
        .json(&json!({
            "username": "bob",
            "email": "not-an-email",
            "name": "",
            "password": "Secret1"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_account() {
    let server = create_test_server();
    register_user(&server, "alice", "a@x.com").await;

    let response = server.delete("/api/ApplicationUser/username/alice").await;
    response.assert_status_ok();

    let response = server.get("/api/ApplicationUser/alice").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_account_not_found() {
    let server = create_test_server();
    let response = server.delete("/api/ApplicationUser/username/ghost").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watchlist_add_and_list() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    let response = server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await;
    response.assert_status(StatusCode::CREATED);
    let entry: Value = response.json();
    assert_eq!(entry["movieId"], 42);
    assert_eq!(entry["watched"], false);

    let response = server.get(&format!("/api/WatchList/{}", user_id)).await;
    response.assert_status_ok();
    let entries: Vec<Value> = response.json();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_watchlist_duplicate_add_rejected() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    let response = server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Movie is already in watchlist.");
}

#[tokio::test]
async fn test_watchlist_rejects_invalid_ids() {
    let server = create_test_server();

    let response = server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", Uuid::nil())
        .add_query_param("movieId", 42)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", Uuid::new_v4())
        .add_query_param("movieId", 0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_watchlist_not_found() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    let response = server.get(&format!("/api/WatchList/{}", user_id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Watchlist is empty.");
}

#[tokio::test]
async fn test_mark_watched_missing_entry_not_found() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    let response = server
        .put("/api/WatchList/42")
        .add_query_param("userId", user_id)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_is_movie_watched_flow() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    // Not in the list yet
    let response = server
        .get("/api/WatchList/IsMovieWatched")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get("/api/WatchList/IsMovieWatched")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await;
    response.assert_status_ok();
    let watched: bool = response.json();
    assert!(!watched);

    server
        .put("/api/WatchList/42")
        .add_query_param("userId", user_id)
        .await
        .assert_status_ok();

    let response = server
        .get("/api/WatchList/IsMovieWatched")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await;
    let watched: bool = response.json();
    assert!(watched);
}

#[tokio::test]
async fn test_remove_from_watchlist() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .delete(&format!("/api/WatchList/{}/{}", user_id, 42))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/WatchList/{}", user_id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

/// The end-to-end scenario: register, watchlist, watch, review, joined listing.
#[tokio::test]
async fn test_review_requires_watched_flow() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", 42)
        .await
        .assert_status(StatusCode::CREATED);

    // Not watched yet: review rejected
    let response = server
        .post("/api/ReviewList/AddReview")
        .json(&json!({
            "userId": user_id,
            "movieId": 42,
            "reviewText": "Great",
            "rating": 8
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Movie must be marked as watched before adding a review."
    );
    assert_eq!(body["code"], "business_rule");

    server
        .put("/api/WatchList/42")
        .add_query_param("userId", user_id)
        .await
        .assert_status_ok();

    // Watched now: same request succeeds
    let response = server
        .post("/api/ReviewList/AddReview")
        .json(&json!({
            "userId": user_id,
            "movieId": 42,
            "reviewText": "Great",
            "rating": 8
        }))
        .await;
    response.assert_status_ok();

    let response = server.get("/api/ReviewList/movie/42").await;
    response.assert_status_ok();
    let reviews: Vec<Value> = response.json();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["username"], "alice");
    assert_eq!(reviews[0]["rating"], 8.0);
    assert_eq!(reviews[0]["content"], "Great");
}

#[tokio::test]
async fn test_add_review_validations() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    // Blank text
    let response = server
        .post("/api/ReviewList/AddReview")
        .json(&json!({
            "userId": user_id,
            "movieId": 42,
            "reviewText": "   ",
            "rating": 8
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Rating out of range
    let response = server
        .post("/api/ReviewList/AddReview")
        .json(&json!({
            "userId": user_id,
            "movieId": 42,
            "reviewText": "Great",
            "rating": 11
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Unknown user
    let response = server
        .post("/api/ReviewList/AddReview")
        .json(&json!({
            "userId": Uuid::new_v4(),
            "movieId": 42,
            "reviewText": "Great",
            "rating": 8
        }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

async fn add_watched_review(server: &TestServer, user_id: Uuid, movie_id: i32, text: &str) {
    server
        .post("/api/WatchList/AddToWatchList")
        .add_query_param("userId", user_id)
        .add_query_param("movieId", movie_id)
        .await
        .assert_status(StatusCode::CREATED);
    server
        .put(&format!("/api/WatchList/{}", movie_id))
        .add_query_param("userId", user_id)
        .await
        .assert_status_ok();
    server
        .post("/api/ReviewList/AddReview")
        .json(&json!({
            "userId": user_id,
            "movieId": movie_id,
            "reviewText": text,
            "rating": 8
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_get_and_list_reviews() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;
    add_watched_review(&server, user_id, 42, "Great").await;

    let response = server
        .get(&format!("/api/ReviewList/{}/{}", user_id, 42))
        .await;
    response.assert_status_ok();
    let review: Value = response.json();
    assert_eq!(review["movieId"], 42);
    assert_eq!(review["content"], "Great");

    let response = server
        .get(&format!("/api/ReviewList/user/{}", user_id))
        .await;
    response.assert_status_ok();
    let reviews: Vec<Value> = response.json();
    assert_eq!(reviews.len(), 1);
}

#[tokio::test]
async fn test_list_reviews_empty_user_not_found() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    let response = server
        .get(&format!("/api/ReviewList/user/{}", user_id))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_review() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;
    add_watched_review(&server, user_id, 42, "Great").await;

    let response = server
        .put("/api/ReviewList/EditReview")
        .json(&json!({
            "userId": user_id,
            "movieId": 42,
            "reviewText": "Even better on rewatch",
            "rating": 9
        }))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/ReviewList/{}/{}", user_id, 42))
        .await;
    let review: Value = response.json();
    assert_eq!(review["content"], "Even better on rewatch");
    assert_eq!(review["rating"], 9.0);
}

#[tokio::test]
async fn test_edit_missing_review_not_found() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;

    let response = server
        .put("/api/ReviewList/EditReview")
        .json(&json!({
            "userId": user_id,
            "movieId": 42,
            "reviewText": "Great",
            "rating": 8
        }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_review_then_get_not_found() {
    let server = create_test_server();
    let user_id = register_user(&server, "alice", "a@x.com").await;
    add_watched_review(&server, user_id, 42, "Great").await;

    let response = server
        .delete(&format!("/api/ReviewList/{}/{}", user_id, 42))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/api/ReviewList/{}/{}", user_id, 42))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reviews_for_movie_empty_message() {
    let server = create_test_server();

    let response = server.get("/api/ReviewList/movie/42").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "No reviews yet. Be the first to leave a review!");
}

#[tokio::test]
async fn test_browse_movies() {
    let server = create_test_server();

    let response = server
        .get("/api/Movies")
        .add_query_param("category", "Action")
        .add_query_param("page", 1)
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["page"], 1);
    assert_eq!(page["results"][0]["title"], "Blade Runner");
}

#[tokio::test]
async fn test_movie_details() {
    let server = create_test_server();

    let response = server.get("/api/Movies/42").await;
    response.assert_status_ok();
    let details: Value = response.json();
    assert_eq!(details["title"], "Blade Runner");

    let response = server.get("/api/Movies/7").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
