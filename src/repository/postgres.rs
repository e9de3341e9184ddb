//! PostgreSQL-backed store.
//!
//! A single `sqlx` transaction is shared by the three repositories so that all
//! staged mutations commit together on `save`. Filters translate to bound
//! `WHERE` clauses.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{Review, ReviewFilter, User, UserFilter, WatchlistEntry, WatchlistFilter};

use super::{Repository, Store, UnitOfWork};

type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

fn already_committed() -> AppError {
    AppError::Internal("Unit of work already committed".to_string())
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        let tx: SharedTx = Arc::new(Mutex::new(Some(tx)));

        Ok(Box::new(PgUnitOfWork {
            users: PgUserRepository { tx: tx.clone() },
            watchlist: PgWatchlistRepository { tx: tx.clone() },
            reviews: PgReviewRepository { tx: tx.clone() },
            tx,
        }))
    }
}

pub struct PgUnitOfWork {
    users: PgUserRepository,
    watchlist: PgWatchlistRepository,
    reviews: PgReviewRepository,
    tx: SharedTx,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn users(&mut self) -> &mut dyn Repository<User> {
        &mut self.users
    }

    fn watchlist(&mut self) -> &mut dyn Repository<WatchlistEntry> {
        &mut self.watchlist
    }

    fn reviews(&mut self) -> &mut dyn Repository<Review> {
        &mut self.reviews
    }

    async fn save(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.take().ok_or_else(already_committed)?;
        tx.commit().await?;
        Ok(())
    }
}

const USER_COLUMNS: &str =
    "id, username, email, name, watched_movies_count, reviews_count, password_hash";

pub struct PgUserRepository {
    tx: SharedTx,
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    async fn get_all(&mut self, filter: Option<UserFilter>) -> AppResult<Vec<User>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        let users = match filter {
            None => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY username"
                ))
                .fetch_all(&mut **tx)
                .await?
            }
            Some(UserFilter::Id(id)) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
                ))
                .bind(id)
                .fetch_all(&mut **tx)
                .await?
            }
            Some(UserFilter::Username(username)) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
                ))
                .bind(username)
                .fetch_all(&mut **tx)
                .await?
            }
            Some(UserFilter::Identifier(identifier)) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1"
                ))
                .bind(identifier)
                .fetch_all(&mut **tx)
                .await?
            }
            Some(UserFilter::UsernameOrEmail { username, email }) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2"
                ))
                .bind(username)
                .bind(email)
                .fetch_all(&mut **tx)
                .await?
            }
        };

        Ok(users)
    }

    async fn get(&mut self, filter: UserFilter) -> AppResult<Option<User>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        let user = match filter {
            UserFilter::Id(id) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
            }
            UserFilter::Username(username) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
                ))
                .bind(username)
                .fetch_optional(&mut **tx)
                .await?
            }
            UserFilter::Identifier(identifier) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1"
                ))
                .bind(identifier)
                .fetch_optional(&mut **tx)
                .await?
            }
            UserFilter::UsernameOrEmail { username, email } => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2"
                ))
                .bind(username)
                .bind(email)
                .fetch_optional(&mut **tx)
                .await?
            }
        };

        Ok(user)
    }

    async fn add(&mut self, entity: User) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query(
            "INSERT INTO users (id, username, email, name, watched_movies_count, reviews_count, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entity.id)
        .bind(entity.username)
        .bind(entity.email)
        .bind(entity.name)
        .bind(entity.watched_movies_count)
        .bind(entity.reviews_count)
        .bind(entity.password_hash)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn update(&mut self, entity: User) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query(
            "UPDATE users SET username = $2, email = $3, name = $4, \
             watched_movies_count = $5, reviews_count = $6, password_hash = $7 \
             WHERE id = $1",
        )
        .bind(entity.id)
        .bind(entity.username)
        .bind(entity.email)
        .bind(entity.name)
        .bind(entity.watched_movies_count)
        .bind(entity.reviews_count)
        .bind(entity.password_hash)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn remove(&mut self, entity: User) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(entity.id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn remove_range(&mut self, entities: Vec<User>) -> AppResult<()> {
        for entity in entities {
            self.remove(entity).await?;
        }
        Ok(())
    }
}

pub struct PgWatchlistRepository {
    tx: SharedTx,
}

#[async_trait]
impl Repository<WatchlistEntry> for PgWatchlistRepository {
    async fn get_all(&mut self, filter: Option<WatchlistFilter>) -> AppResult<Vec<WatchlistEntry>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        let entries = match filter {
            None => {
                sqlx::query_as::<_, WatchlistEntry>(
                    "SELECT owner_id, movie_id, watched FROM watchlist_entries ORDER BY movie_id",
                )
                .fetch_all(&mut **tx)
                .await?
            }
            Some(WatchlistFilter::Owner(owner_id)) => {
                sqlx::query_as::<_, WatchlistEntry>(
                    "SELECT owner_id, movie_id, watched FROM watchlist_entries \
                     WHERE owner_id = $1 ORDER BY movie_id",
                )
                .bind(owner_id)
                .fetch_all(&mut **tx)
                .await?
            }
            Some(WatchlistFilter::Entry { owner_id, movie_id }) => {
                sqlx::query_as::<_, WatchlistEntry>(
                    "SELECT owner_id, movie_id, watched FROM watchlist_entries \
                     WHERE owner_id = $1 AND movie_id = $2",
                )
                .bind(owner_id)
                .bind(movie_id)
                .fetch_all(&mut **tx)
                .await?
            }
            Some(WatchlistFilter::WatchedEntry { owner_id, movie_id }) => {
                sqlx::query_as::<_, WatchlistEntry>(
                    "SELECT owner_id, movie_id, watched FROM watchlist_entries \
                     WHERE owner_id = $1 AND movie_id = $2 AND watched",
                )
                .bind(owner_id)
                .bind(movie_id)
                .fetch_all(&mut **tx)
                .await?
            }
        };

        Ok(entries)
    }

    async fn get(&mut self, filter: WatchlistFilter) -> AppResult<Option<WatchlistEntry>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        let entry = match filter {
            WatchlistFilter::Owner(owner_id) => {
                sqlx::query_as::<_, WatchlistEntry>(
                    "SELECT owner_id, movie_id, watched FROM watchlist_entries \
                     WHERE owner_id = $1 ORDER BY movie_id",
                )
                .bind(owner_id)
                .fetch_optional(&mut **tx)
                .await?
            }
            WatchlistFilter::Entry { owner_id, movie_id } => {
                sqlx::query_as::<_, WatchlistEntry>(
                    "SELECT owner_id, movie_id, watched FROM watchlist_entries \
                     WHERE owner_id = $1 AND movie_id = $2",
                )
                .bind(owner_id)
                .bind(movie_id)
                .fetch_optional(&mut **tx)
                .await?
            }
            WatchlistFilter::WatchedEntry { owner_id, movie_id } => {
                sqlx::query_as::<_, WatchlistEntry>(
                    "SELECT owner_id, movie_id, watched FROM watchlist_entries \
                     WHERE owner_id = $1 AND movie_id = $2 AND watched",
                )
                .bind(owner_id)
                .bind(movie_id)
                .fetch_optional(&mut **tx)
                .await?
            }
        };

        Ok(entry)
    }

    async fn add(&mut self, entity: WatchlistEntry) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        // user_id mirrors owner_id but is nullable: rows detach instead of
        // cascading when the account is deleted.
        sqlx::query(
            "INSERT INTO watchlist_entries (owner_id, movie_id, watched, user_id) \
             VALUES ($1, $2, $3, $1)",
        )
        .bind(entity.owner_id)
        .bind(entity.movie_id)
        .bind(entity.watched)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn update(&mut self, entity: WatchlistEntry) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query(
            "UPDATE watchlist_entries SET watched = $3 WHERE owner_id = $1 AND movie_id = $2",
        )
        .bind(entity.owner_id)
        .bind(entity.movie_id)
        .bind(entity.watched)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn remove(&mut self, entity: WatchlistEntry) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query("DELETE FROM watchlist_entries WHERE owner_id = $1 AND movie_id = $2")
            .bind(entity.owner_id)
            .bind(entity.movie_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn remove_range(&mut self, entities: Vec<WatchlistEntry>) -> AppResult<()> {
        for entity in entities {
            self.remove(entity).await?;
        }
        Ok(())
    }
}

const REVIEW_COLUMNS: &str = "owner_id, movie_id, content, rating, created_at";

pub struct PgReviewRepository {
    tx: SharedTx,
}

#[async_trait]
impl Repository<Review> for PgReviewRepository {
    async fn get_all(&mut self, filter: Option<ReviewFilter>) -> AppResult<Vec<Review>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        let reviews = match filter {
            None => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at"
                ))
                .fetch_all(&mut **tx)
                .await?
            }
            Some(ReviewFilter::Owner(owner_id)) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE owner_id = $1 ORDER BY created_at"
                ))
                .bind(owner_id)
                .fetch_all(&mut **tx)
                .await?
            }
            Some(ReviewFilter::Movie(movie_id)) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE movie_id = $1 ORDER BY created_at"
                ))
                .bind(movie_id)
                .fetch_all(&mut **tx)
                .await?
            }
            Some(ReviewFilter::Entry { owner_id, movie_id }) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE owner_id = $1 AND movie_id = $2"
                ))
                .bind(owner_id)
                .bind(movie_id)
                .fetch_all(&mut **tx)
                .await?
            }
        };

        Ok(reviews)
    }

    async fn get(&mut self, filter: ReviewFilter) -> AppResult<Option<Review>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        let review = match filter {
            ReviewFilter::Owner(owner_id) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE owner_id = $1 ORDER BY created_at"
                ))
                .bind(owner_id)
                .fetch_optional(&mut **tx)
                .await?
            }
            ReviewFilter::Movie(movie_id) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE movie_id = $1 ORDER BY created_at"
                ))
                .bind(movie_id)
                .fetch_optional(&mut **tx)
                .await?
            }
            ReviewFilter::Entry { owner_id, movie_id } => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE owner_id = $1 AND movie_id = $2"
                ))
                .bind(owner_id)
                .bind(movie_id)
                .fetch_optional(&mut **tx)
                .await?
            }
        };

        Ok(review)
    }

    async fn add(&mut self, entity: Review) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query(
            "INSERT INTO reviews (owner_id, movie_id, content, rating, created_at, user_id) \
             VALUES ($1, $2, $3, $4, $5, $1)",
        )
        .bind(entity.owner_id)
        .bind(entity.movie_id)
        .bind(entity.content)
        .bind(entity.rating)
        .bind(entity.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn update(&mut self, entity: Review) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query(
            "UPDATE reviews SET content = $3, rating = $4 WHERE owner_id = $1 AND movie_id = $2",
        )
        .bind(entity.owner_id)
        .bind(entity.movie_id)
        .bind(entity.content)
        .bind(entity.rating)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn remove(&mut self, entity: Review) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(already_committed)?;

        sqlx::query("DELETE FROM reviews WHERE owner_id = $1 AND movie_id = $2")
            .bind(entity.owner_id)
            .bind(entity.movie_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn remove_range(&mut self, entities: Vec<Review>) -> AppResult<()> {
        for entity in entities {
            self.remove(entity).await?;
        }
        Ok(())
    }
}
