//! TMDB catalog provider
//!
//! Listings come from `/discover/movie` (popularity-sorted, optionally
//! narrowed to a genre), details from `/movie/{id}`.

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use crate::error::{AppError, AppResult};
use crate::models::{Category, MovieDetails, MoviePage};

use super::MovieCatalog;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn browse(&self, category: Option<Category>, page: u32) -> AppResult<MoviePage> {
        let url = format!("{}/discover/movie", self.api_url);

        let mut query: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("sort_by", "popularity.desc".to_string()),
            ("page", page.to_string()),
        ];
        if let Some(category) = category {
            query.push(("with_genres", category.genre_id().to_string()));
        }

        let response = self.http_client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        let listing: MoviePage = response.json().await?;

        tracing::info!(
            page = listing.page,
            results = listing.results.len(),
            provider = "tmdb",
            "Catalog browse completed"
        );

        Ok(listing)
    }

    async fn details(&self, movie_id: i32) -> AppResult<MovieDetails> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "Movie {} not found in catalog",
                movie_id
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        let details: MovieDetails = response.json().await?;

        tracing::info!(
            movie_id = details.id,
            provider = "tmdb",
            "Catalog details fetched"
        );

        Ok(details)
    }
}
