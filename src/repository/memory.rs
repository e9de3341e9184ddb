//! In-memory store, the test double behind the integration suite.
//!
//! `begin` snapshots the shared tables into a working copy; repositories
//! operate on the copy and `save` publishes it back wholesale. Unsaved units
//! of work therefore roll back by simply being dropped, and concurrent saves
//! resolve last-write-wins, matching the storage-layer race semantics of the
//! real backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::AppResult;
use crate::models::{Review, ReviewFilter, User, UserFilter, WatchlistEntry, WatchlistFilter};

use super::{Repository, Store, UnitOfWork};

#[derive(Debug, Default, Clone)]
struct Tables {
    users: Vec<User>,
    watchlist: Vec<WatchlistEntry>,
    reviews: Vec<Review>,
}

type WorkingCopy = Arc<Mutex<Tables>>;

pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let snapshot = self.tables.read().await.clone();
        let working: WorkingCopy = Arc::new(Mutex::new(snapshot));

        Ok(Box::new(MemoryUnitOfWork {
            users: MemoryUserRepository {
                tables: working.clone(),
            },
            watchlist: MemoryWatchlistRepository {
                tables: working.clone(),
            },
            reviews: MemoryReviewRepository {
                tables: working.clone(),
            },
            working,
            shared: self.tables.clone(),
        }))
    }
}

pub struct MemoryUnitOfWork {
    users: MemoryUserRepository,
    watchlist: MemoryWatchlistRepository,
    reviews: MemoryReviewRepository,
    working: WorkingCopy,
    shared: Arc<RwLock<Tables>>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
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
        let snapshot = self.working.lock().await.clone();
        *self.shared.write().await = snapshot;
        Ok(())
    }
}

fn user_matches(user: &User, filter: &UserFilter) -> bool {
    match filter {
        UserFilter::Id(id) => user.id == *id,
        UserFilter::Username(username) => user.username == *username,
        UserFilter::Identifier(identifier) => {
            user.username == *identifier || user.email == *identifier
        }
        UserFilter::UsernameOrEmail { username, email } => {
            user.username == *username || user.email == *email
        }
    }
}

fn watchlist_matches(entry: &WatchlistEntry, filter: &WatchlistFilter) -> bool {
    match filter {
        WatchlistFilter::Owner(owner_id) => entry.owner_id == *owner_id,
        WatchlistFilter::Entry { owner_id, movie_id } => {
            entry.owner_id == *owner_id && entry.movie_id == *movie_id
        }
        WatchlistFilter::WatchedEntry { owner_id, movie_id } => {
            entry.owner_id == *owner_id && entry.movie_id == *movie_id && entry.watched
        }
    }
}

fn review_matches(review: &Review, filter: &ReviewFilter) -> bool {
    match filter {
        ReviewFilter::Owner(owner_id) => review.owner_id == *owner_id,
        ReviewFilter::Movie(movie_id) => review.movie_id == *movie_id,
        ReviewFilter::Entry { owner_id, movie_id } => {
            review.owner_id == *owner_id && review.movie_id == *movie_id
        }
    }
}

pub struct MemoryUserRepository {
    tables: WorkingCopy,
}

#[async_trait]
impl Repository<User> for MemoryUserRepository {
    async fn get_all(&mut self, filter: Option<UserFilter>) -> AppResult<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| filter.as_ref().map_or(true, |f| user_matches(u, f)))
            .cloned()
            .collect())
    }

    async fn get(&mut self, filter: UserFilter) -> AppResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| user_matches(u, &filter))
            .cloned())
    }

    async fn add(&mut self, entity: User) -> AppResult<()> {
        self.tables.lock().await.users.push(entity);
        Ok(())
    }

    async fn update(&mut self, entity: User) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.users.iter_mut().find(|u| u.id == entity.id) {
            *existing = entity;
        }
        Ok(())
    }

    async fn remove(&mut self, entity: User) -> AppResult<()> {
        self.tables.lock().await.users.retain(|u| u.id != entity.id);
        Ok(())
    }

    async fn remove_range(&mut self, entities: Vec<User>) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        for entity in entities {
            tables.users.retain(|u| u.id != entity.id);
        }
        Ok(())
    }
}

pub struct MemoryWatchlistRepository {
    tables: WorkingCopy,
}

#[async_trait]
impl Repository<WatchlistEntry> for MemoryWatchlistRepository {
    async fn get_all(&mut self, filter: Option<WatchlistFilter>) -> AppResult<Vec<WatchlistEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .watchlist
            .iter()
            .filter(|e| filter.as_ref().map_or(true, |f| watchlist_matches(e, f)))
            .cloned()
            .collect())
    }

    async fn get(&mut self, filter: WatchlistFilter) -> AppResult<Option<WatchlistEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .watchlist
            .iter()
            .find(|e| watchlist_matches(e, &filter))
            .cloned())
    }

    async fn add(&mut self, entity: WatchlistEntry) -> AppResult<()> {
        self.tables.lock().await.watchlist.push(entity);
        Ok(())
    }

    async fn update(&mut self, entity: WatchlistEntry) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .watchlist
            .iter_mut()
            .find(|e| e.owner_id == entity.owner_id && e.movie_id == entity.movie_id)
        {
            *existing = entity;
        }
        Ok(())
    }

    async fn remove(&mut self, entity: WatchlistEntry) -> AppResult<()> {
        self.tables
            .lock()
            .await
            .watchlist
            .retain(|e| !(e.owner_id == entity.owner_id && e.movie_id == entity.movie_id));
        Ok(())
    }

    async fn remove_range(&mut self, entities: Vec<WatchlistEntry>) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        for entity in entities {
            tables
                .watchlist
                .retain(|e| !(e.owner_id == entity.owner_id && e.movie_id == entity.movie_id));
        }
        Ok(())
    }
}

pub struct MemoryReviewRepository {
    tables: WorkingCopy,
}

#[async_trait]
impl Repository<Review> for MemoryReviewRepository {
    async fn get_all(&mut self, filter: Option<ReviewFilter>) -> AppResult<Vec<Review>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reviews
            .iter()
            .filter(|r| filter.as_ref().map_or(true, |f| review_matches(r, f)))
            .cloned()
            .collect())
    }

    async fn get(&mut self, filter: ReviewFilter) -> AppResult<Option<Review>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reviews
            .iter()
            .find(|r| review_matches(r, &filter))
            .cloned())
    }

    async fn add(&mut self, entity: Review) -> AppResult<()> {
        self.tables.lock().await.reviews.push(entity);
        Ok(())
    }

    async fn update(&mut self, entity: Review) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .reviews
            .iter_mut()
            .find(|r| r.owner_id == entity.owner_id && r.movie_id == entity.movie_id)
        {
            *existing = entity;
        }
        Ok(())
    }

    async fn remove(&mut self, entity: Review) -> AppResult<()> {
        self.tables
            .lock()
            .await
            .reviews
            .retain(|r| !(r.owner_id == entity.owner_id && r.movie_id == entity.movie_id));
        Ok(())
    }

    async fn remove_range(&mut self, entities: Vec<Review>) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        for entity in entities {
            tables
                .reviews
                .retain(|r| !(r.owner_id == entity.owner_id && r.movie_id == entity.movie_id));
        }
        Ok(())
    }
}
