use serde::{Deserialize, Serialize};

/// One movie in a catalog listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
}

/// One page of catalog browse results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// Full detail record for a single catalog movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// The fixed browse categories, each mapped to a catalog genre id.
///
/// Anything outside this list falls back to the popularity-sorted default
/// listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Action,
    Drama,
    Fantasy,
    Horror,
    Comedy,
    Documentary,
}

impl Category {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "action" => Some(Category::Action),
            "drama" => Some(Category::Drama),
            "fantasy" => Some(Category::Fantasy),
            "horror" => Some(Category::Horror),
            "comedy" => Some(Category::Comedy),
            "documentary" => Some(Category::Documentary),
            _ => None,
        }
    }

    /// TMDB genre id for this category
    pub fn genre_id(self) -> u32 {
        match self {
            Category::Action => 28,
            Category::Drama => 18,
            Category::Fantasy => 14,
            Category::Horror => 27,
            Category::Comedy => 35,
            Category::Documentary => 99,
        }
    }
}
