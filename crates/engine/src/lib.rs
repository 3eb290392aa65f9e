//! # Engine Crate
//!
//! The preference engine: converts a user's rating history and declared
//! favorite genres into a normalized genre preference vector, then scores
//! and ranks the catalog movies the user has not rated.
//!
//! ## Components
//!
//! ### Preferences
//! Builds the per-user genre preference vector: a flat bonus per declared
//! favorite genre plus scaled contributions from ratings of 4.0 and above,
//! normalized to sum to 1.
//!
//! ### Scoring
//! Scores every unrated catalog movie as a fixed linear combination of
//! genre affinity, average rating, popularity, and release recency, then
//! ranks with a stable descending sort.
//!
//! ### Similarity
//! "More like this": ranks other movies against a target by genre overlap,
//! year proximity, and average rating.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{recommend, similar_movies};
//!
//! let ratings = store.ratings_for_user(user_id);
//! let favorites = store.favorite_genres(user_id);
//!
//! let picks = recommend(&store, ratings, favorites, 10);
//! let related = similar_movies(&store, movie_id, 6);
//! ```
//!
//! Everything here is a pure function over in-memory inputs: no instance
//! state, no I/O, no suspension points. Fetching the inputs (and any
//! request timeout around that) is the caller's concern.

// Public modules
pub mod preferences;
pub mod scoring;
pub mod similar;

// Re-export commonly used items
pub use preferences::{
    build_preferences, GenrePreferences, FAVORITE_GENRE_BONUS, HIGH_RATING_THRESHOLD,
};
pub use scoring::{
    candidate_signals, rank_candidates, rated_movie_ids, recommend, CandidateSignals,
    ScoredMovie, DEFAULT_RECOMMENDATION_LIMIT,
};
pub use similar::{similar_movies, DEFAULT_SIMILAR_LIMIT};
