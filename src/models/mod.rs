pub mod catalog;
pub mod review;
pub mod user;
pub mod watchlist;

pub use catalog::{Category, MovieDetails, MoviePage, MovieSummary};
pub use review::{Review, ReviewFilter};
pub use user::{User, UserFilter};
pub use watchlist::{WatchlistEntry, WatchlistFilter};
