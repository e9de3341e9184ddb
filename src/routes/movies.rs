use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{Category, MovieDetails, MoviePage};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(browse_movies))
        .route("/:movieId", get(movie_details))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub page: Option<u32>,
}

/// Paginated catalog listing. Unknown categories fall back to the
/// popularity-sorted default listing.
async fn browse_movies(
    State(state): State<AppState>,
    Query(params): Query<BrowseQuery>,
) -> AppResult<Json<MoviePage>> {
    let category = params.category.as_deref().and_then(Category::from_name);
    let page = params.page.unwrap_or(1).max(1);

    let listing = state.catalog.browse(category, page).await?;

    Ok(Json(listing))
}

async fn movie_details(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> AppResult<Json<MovieDetails>> {
    let details = state.catalog.details(movie_id).await?;

    Ok(Json(details))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::memory::MemoryStore;
    use crate::services::catalog::MockMovieCatalog;

    fn test_state(catalog: MockMovieCatalog) -> AppState {
        AppState {
            store: Arc::new(MemoryStore::new()),
            catalog: Arc::new(catalog),
        }
    }

    #[tokio::test]
    async fn test_browse_defaults_to_first_page_without_category() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_browse()
            .withf(|category, page| category.is_none() && *page == 1)
            .times(1)
            .returning(|_, page| {
                Ok(MoviePage {
                    page,
                    results: vec![],
                    total_pages: 1,
                    total_results: 0,
                })
            });

        let Json(listing) = browse_movies(
            State(test_state(catalog)),
            Query(BrowseQuery {
                category: None,
                page: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(listing.page, 1);
    }

    #[tokio::test]
    async fn test_browse_maps_known_category_to_genre() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_browse()
            .withf(|category, page| *category == Some(Category::Horror) && *page == 3)
            .times(1)
            .returning(|_, page| {
                Ok(MoviePage {
                    page,
                    results: vec![],
                    total_pages: 12,
                    total_results: 240,
                })
            });

        let Json(listing) = browse_movies(
            State(test_state(catalog)),
            Query(BrowseQuery {
                category: Some("Horror".to_string()),
                page: Some(3),
            }),
        )
        .await
        .unwrap();

        assert_eq!(listing.page, 3);
    }

    #[tokio::test]
    async fn test_browse_ignores_unknown_category() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_browse()
            .withf(|category, _| category.is_none())
            .times(1)
            .returning(|_, page| {
                Ok(MoviePage {
                    page,
                    results: vec![],
                    total_pages: 1,
                    total_results: 0,
                })
            });

        browse_movies(
            State(test_state(catalog)),
            Query(BrowseQuery {
                category: Some("Western".to_string()),
                page: Some(1),
            }),
        )
        .await
        .unwrap();
    }
}
