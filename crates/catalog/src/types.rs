//! Core domain types for the movie catalog.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Movie
// =============================================================================

/// A movie record in the catalog.
///
/// Everything here is immutable once inserted except `average_rating` and
/// `rating_count`, which the store recomputes whenever any user submits a
/// rating for this movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Free-text description shown in listings
    #[serde(default)]
    pub description: String,
    /// Genre tags; not unique across movies, order irrelevant
    pub genres: Vec<String>,
    /// Release year
    pub year: u16,
    /// Mean of all stored ratings, 0.0 when the movie is unrated
    #[serde(default)]
    pub average_rating: f32,
    /// Number of stored ratings
    #[serde(default)]
    pub rating_count: u32,
}

impl Movie {
    /// True when at least one rating has been recorded
    pub fn is_rated(&self) -> bool {
        self.rating_count > 0
    }
}

// =============================================================================
// Rating
// =============================================================================

/// A single rating by one user for one movie.
///
/// The (user_id, movie_id) pair is unique in the store: resubmitting
/// overwrites the previous value (upsert).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value on the 0-5 scale
    pub rating: f32,
    /// Optional free-text review
    #[serde(default)]
    pub review: Option<String>,
}

// =============================================================================
// Profile
// =============================================================================

/// User profile data the engine cares about: the declared favorite genres.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    /// User-editable set of genre strings
    #[serde(default)]
    pub favorite_genres: Vec<String>,
}

// =============================================================================
// Watchlist
// =============================================================================

/// Movies a user has saved to watch later, in the order they were added.
///
/// Membership is a set: adding a movie that is already present is a no-op,
/// as is removing one that never was.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Watchlist {
    pub user_id: UserId,
    #[serde(default)]
    pub movie_ids: Vec<MovieId>,
}
