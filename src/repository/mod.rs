//! Generic repository and unit-of-work abstractions.
//!
//! Each entity type carries a filter enum standing in for predicate-based
//! lookup. A [`UnitOfWork`] scopes the three typed repositories to one storage
//! transaction; mutations stage inside it and become visible only once
//! [`UnitOfWork::save`] commits. Dropping a unit of work without saving rolls
//! everything back.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Review, ReviewFilter, User, UserFilter, WatchlistEntry, WatchlistFilter};

/// A storable entity with an associated lookup-predicate type
pub trait Entity: Clone + Send + Sync + 'static {
    type Filter: Send + Sync + 'static;
}

impl Entity for User {
    type Filter = UserFilter;
}

impl Entity for WatchlistEntry {
    type Filter = WatchlistFilter;
}

impl Entity for Review {
    type Filter = ReviewFilter;
}

/// Predicate-based query and mutation staging for one entity type.
///
/// No validation, uniqueness or conflict detection lives here; constraint
/// violations surface from the storage engine at commit time.
#[async_trait]
pub trait Repository<E: Entity>: Send {
    /// All entities matching the filter; everything when no filter is given.
    /// An empty result is not an error.
    async fn get_all(&mut self, filter: Option<E::Filter>) -> AppResult<Vec<E>>;

    /// First entity matching the filter, or `None`
    async fn get(&mut self, filter: E::Filter) -> AppResult<Option<E>>;

    /// Stages an insert
    async fn add(&mut self, entity: E) -> AppResult<()>;

    /// Stages a full-record update, keyed by the entity's identity
    async fn update(&mut self, entity: E) -> AppResult<()>;

    /// Stages a delete, keyed by the entity's identity
    async fn remove(&mut self, entity: E) -> AppResult<()>;

    /// Stages deletes for a batch of entities
    async fn remove_range(&mut self, entities: Vec<E>) -> AppResult<()>;
}

/// One transactional scope over the three repositories
#[async_trait]
pub trait UnitOfWork: Send {
    fn users(&mut self) -> &mut dyn Repository<User>;

    fn watchlist(&mut self) -> &mut dyn Repository<WatchlistEntry>;

    fn reviews(&mut self) -> &mut dyn Repository<Review>;

    /// Commits all staged mutations atomically. Commit failures surface the
    /// storage engine's error unchanged.
    async fn save(self: Box<Self>) -> AppResult<()>;
}

/// Opens a fresh unit of work per request
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
