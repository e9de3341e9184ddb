//! Movie catalog gateway.
//!
//! The catalog is an external read-only HTTP API; its schema (title, overview,
//! poster path, numeric id) is treated as an opaque upstream contract. Keeping
//! it behind a trait keeps the API key server-side and lets tests substitute a
//! canned provider.

pub mod tmdb;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Category, MovieDetails, MoviePage};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// One page of the listing for a category, or the popularity-sorted
    /// default listing when no category is given
    async fn browse(&self, category: Option<Category>, page: u32) -> AppResult<MoviePage>;

    /// Details for a single movie by catalog id
    async fn details(&self, movie_id: i32) -> AppResult<MovieDetails>;
}
