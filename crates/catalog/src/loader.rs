//! JSON seed loader for the catalog store.
//!
//! A seed file holds the full catalog plus optional ratings and profiles:
//!
//! ```json
//! {
//!   "movies": [
//!     { "id": 1, "title": "Heat", "genres": ["Action", "Crime"],
//!       "year": 1995, "description": "...",
//!       "average_rating": 4.2, "rating_count": 310 }
//!   ],
//!   "ratings": [
//!     { "user_id": 1, "movie_id": 1, "rating": 4.5, "review": "..." }
//!   ],
//!   "profiles": [
//!     { "user_id": 1, "favorite_genres": ["Action"] }
//!   ],
//!   "watchlists": [
//!     { "user_id": 1, "movie_ids": [1] }
//!   ]
//! }
//! ```
//!
//! Movies are inserted in file order, which becomes the catalog's stable
//! iteration order. Seed ratings go through the normal upsert path, so the
//! aggregate fields of any rated movie are recomputed from them; the
//! pre-aggregated values in the file only survive for movies with no seed
//! ratings.

use crate::error::Result;
use crate::store::CatalogStore;
use crate::types::{Movie, Profile, Rating, Watchlist};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct SeedFile {
    movies: Vec<Movie>,
    #[serde(default)]
    ratings: Vec<Rating>,
    #[serde(default)]
    profiles: Vec<Profile>,
    #[serde(default)]
    watchlists: Vec<Watchlist>,
}

/// Load a catalog store from a JSON seed file
pub fn load_catalog(path: &Path) -> Result<CatalogStore> {
    let raw = fs::read_to_string(path)?;
    let store = parse_catalog(&raw)?;

    let (movies, users, ratings) = store.counts();
    info!(
        path = %path.display(),
        movies, users, ratings,
        "catalog loaded"
    );
    Ok(store)
}

/// Parse seed JSON into a populated store
pub fn parse_catalog(raw: &str) -> Result<CatalogStore> {
    let seed: SeedFile = serde_json::from_str(raw)?;

    let mut store = CatalogStore::new();
    for movie in seed.movies {
        store.insert_movie(movie)?;
    }
    for profile in seed.profiles {
        store.set_favorite_genres(profile.user_id, profile.favorite_genres);
    }
    for rating in seed.ratings {
        store.upsert_rating(rating.user_id, rating.movie_id, rating.rating, rating.review)?;
    }
    for watchlist in seed.watchlists {
        for movie_id in watchlist.movie_ids {
            store.add_to_watchlist(watchlist.user_id, movie_id)?;
        }
    }
    Ok(store)
}
