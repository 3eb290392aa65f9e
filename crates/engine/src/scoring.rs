//! Candidate scoring and ranking.
//!
//! ## Algorithm
//! For every catalog movie the user has not rated:
//! 1. `genre_score` - sum of the preference weight of each genre tag
//! 2. `rating_score` - `average_rating / 5` when the movie has ratings
//! 3. `popularity_score` - `ln(rating_count + 1) / 10`
//! 4. `recency_score` - `(year - 1970) / 56`, clamped at 0 below; future
//!    years can exceed 1, which is accepted
//! 5. `final = 0.5*genre + 0.25*rating + 0.15*popularity + 0.10*recency`
//!
//! Movies the user already rated get a sentinel score of -1 and are
//! dropped. Ranking is a stable descending sort, so tied candidates keep
//! catalog order and output is deterministic for identical inputs.

use crate::preferences::{build_preferences, GenrePreferences, RATING_SCALE};
use catalog::{CatalogStore, Movie, MovieId, Rating};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Weight of the genre affinity signal in the final score
pub const GENRE_WEIGHT: f32 = 0.5;
/// Weight of the average-rating signal
pub const RATING_WEIGHT: f32 = 0.25;
/// Weight of the popularity signal
pub const POPULARITY_WEIGHT: f32 = 0.15;
/// Weight of the release-recency signal
pub const RECENCY_WEIGHT: f32 = 0.10;

/// Sentinel score marking a movie the user already rated
pub const RATED_SENTINEL: f32 = -1.0;

/// Default number of recommendations returned
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

const RECENCY_EPOCH: f32 = 1970.0;
const RECENCY_SPAN: f32 = 56.0;
const POPULARITY_DAMPING: f32 = 10.0;

/// A ranked candidate: movie id plus its final score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
}

/// The raw signals behind one candidate's score.
///
/// The local scorer combines these with the fixed weights; the remote
/// scoring service receives them verbatim and returns its own score.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSignals {
    pub movie_id: MovieId,
    pub genre_score: f32,
    pub rating_score: f32,
    pub popularity_score: f32,
    pub recency_score: f32,
}

impl CandidateSignals {
    /// The fixed linear combination used by the local scorer
    pub fn combine(&self) -> f32 {
        self.genre_score * GENRE_WEIGHT
            + self.rating_score * RATING_WEIGHT
            + self.popularity_score * POPULARITY_WEIGHT
            + self.recency_score * RECENCY_WEIGHT
    }
}

/// Compute the scoring signals for one movie against a preference vector
pub fn signals_for(movie: &Movie, prefs: &GenrePreferences) -> CandidateSignals {
    let genre_score: f32 = movie.genres.iter().map(|g| prefs.weight(g)).sum();

    let rating_score = if movie.is_rated() {
        movie.average_rating / RATING_SCALE
    } else {
        0.0
    };

    let popularity_score = (movie.rating_count as f32 + 1.0).ln() / POPULARITY_DAMPING;

    let recency_score = ((movie.year as f32 - RECENCY_EPOCH) / RECENCY_SPAN).max(0.0);

    CandidateSignals {
        movie_id: movie.id,
        genre_score,
        rating_score,
        popularity_score,
        recency_score,
    }
}

/// Score one movie, returning the sentinel for movies the user rated
pub fn score_movie(movie: &Movie, prefs: &GenrePreferences, rated: &HashSet<MovieId>) -> f32 {
    if rated.contains(&movie.id) {
        return RATED_SENTINEL;
    }
    signals_for(movie, prefs).combine()
}

/// The set of movie ids the user has rated, for exact candidate exclusion
pub fn rated_movie_ids(ratings: &[Rating]) -> HashSet<MovieId> {
    ratings.iter().map(|r| r.movie_id).collect()
}

/// Produce ranked recommendations for one user.
///
/// Pure over its inputs: the rating history, the declared favorite genres,
/// and the catalog snapshot. An empty catalog, a fully rated catalog, or
/// `limit == 0` all yield an empty list.
///
/// # Arguments
/// * `store` - Catalog snapshot (stable iteration order)
/// * `ratings` - The user's full rating history
/// * `favorite_genres` - The user's declared favorite genres
/// * `limit` - Maximum number of results
#[instrument(skip(store, ratings, favorite_genres), fields(ratings = ratings.len()))]
pub fn recommend(
    store: &CatalogStore,
    ratings: &[Rating],
    favorite_genres: &[String],
    limit: usize,
) -> Vec<ScoredMovie> {
    let prefs = build_preferences(ratings, favorite_genres, store);
    let rated = rated_movie_ids(ratings);
    let ranked = rank_candidates(store, &prefs, &rated, limit);
    debug!(
        candidates = ranked.len(),
        preference_genres = prefs.len(),
        "recommendations ranked"
    );
    ranked
}

/// Score every unrated movie and return the top `limit`, stably sorted.
pub fn rank_candidates(
    store: &CatalogStore,
    prefs: &GenrePreferences,
    rated: &HashSet<MovieId>,
    limit: usize,
) -> Vec<ScoredMovie> {
    // Parallel map keeps catalog order via indexed collect, so stability of
    // the later sort still ties back to catalog order
    let mut scored: Vec<ScoredMovie> = store
        .movies()
        .par_iter()
        .map(|movie| ScoredMovie {
            movie_id: movie.id,
            score: score_movie(movie, prefs, rated),
        })
        .collect();

    scored.retain(|s| s.score >= 0.0);
    sort_descending(&mut scored);
    scored.truncate(limit);
    scored
}

/// Compute signals for every unrated movie, in catalog order.
///
/// This is the candidate set handed to the remote scoring service; its
/// order is the tie-breaking order for the final ranking.
pub fn candidate_signals(
    store: &CatalogStore,
    prefs: &GenrePreferences,
    rated: &HashSet<MovieId>,
) -> Vec<CandidateSignals> {
    store
        .movies()
        .iter()
        .filter(|movie| !rated.contains(&movie.id))
        .map(|movie| signals_for(movie, prefs))
        .collect()
}

/// Stable descending sort by score; ties keep input order
pub fn sort_descending(scored: &mut [ScoredMovie]) {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
