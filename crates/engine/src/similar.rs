//! Similarity lookup: "more like this" for a target movie.
//!
//! ## Algorithm
//! For every other catalog movie:
//! 1. `genre_score` - shared tag count divided by the larger of the two tag
//!    counts (overlap ratio, not true Jaccard: the denominator is the max
//!    cardinality, not the union size)
//! 2. `year_score` - `1 - |year difference| / 50`, clamped at 0
//! 3. `rating_score` - `average_rating / 5` when the movie has ratings
//! 4. `total = 0.6*genre + 0.2*year + 0.2*rating`
//!
//! Stable descending sort, top `limit`. An unknown target yields an empty
//! list rather than an error.

use crate::preferences::RATING_SCALE;
use crate::scoring::{sort_descending, ScoredMovie};
use catalog::{CatalogStore, Movie, MovieId};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Weight of genre overlap in the similarity score
pub const SIMILAR_GENRE_WEIGHT: f32 = 0.6;
/// Weight of release-year proximity
pub const SIMILAR_YEAR_WEIGHT: f32 = 0.2;
/// Weight of the candidate's average rating
pub const SIMILAR_RATING_WEIGHT: f32 = 0.2;

/// Default number of similar movies returned
pub const DEFAULT_SIMILAR_LIMIT: usize = 6;

const YEAR_PROXIMITY_SPAN: f32 = 50.0;

/// Rank the catalog movies most similar to `target_id`.
///
/// The target itself is never part of the result. Returns an empty list
/// when the target is not in the catalog.
#[instrument(skip(store))]
pub fn similar_movies(store: &CatalogStore, target_id: MovieId, limit: usize) -> Vec<ScoredMovie> {
    let target = match store.get_movie(target_id) {
        Some(movie) => movie,
        None => {
            debug!(target_id, "similarity target not in catalog");
            return Vec::new();
        }
    };
    let target_genres: HashSet<&str> = target.genres.iter().map(String::as_str).collect();

    let mut scored: Vec<ScoredMovie> = store
        .movies()
        .iter()
        .filter(|movie| movie.id != target_id)
        .map(|movie| ScoredMovie {
            movie_id: movie.id,
            score: similarity_score(target, &target_genres, movie),
        })
        .collect();

    sort_descending(&mut scored);
    scored.truncate(limit);
    debug!(target_id, results = scored.len(), "similarity ranked");
    scored
}

fn similarity_score(target: &Movie, target_genres: &HashSet<&str>, candidate: &Movie) -> f32 {
    let shared = candidate
        .genres
        .iter()
        .filter(|g| target_genres.contains(g.as_str()))
        .count();
    let larger = target.genres.len().max(candidate.genres.len());
    // Two tag-less movies share nothing; avoid 0/0
    let genre_score = if larger > 0 {
        shared as f32 / larger as f32
    } else {
        0.0
    };

    let year_diff = (candidate.year as i32 - target.year as i32).abs() as f32;
    let year_score = (1.0 - year_diff / YEAR_PROXIMITY_SPAN).max(0.0);

    let rating_score = if candidate.is_rated() {
        candidate.average_rating / RATING_SCALE
    } else {
        0.0
    };

    genre_score * SIMILAR_GENRE_WEIGHT
        + year_score * SIMILAR_YEAR_WEIGHT
        + rating_score * SIMILAR_RATING_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(
        id: MovieId,
        genres: &[&str],
        year: u16,
        average_rating: f32,
        rating_count: u32,
    ) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            description: String::new(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            year,
            average_rating,
            rating_count,
        }
    }

    fn store_of(movies: Vec<Movie>) -> CatalogStore {
        let mut store = CatalogStore::new();
        for m in movies {
            store.insert_movie(m).unwrap();
        }
        store
    }

    #[test]
    fn unknown_target_returns_empty() {
        let store = store_of(vec![movie(1, &["Action"], 2000, 4.0, 5)]);
        assert!(similar_movies(&store, 999, 6).is_empty());
    }

    #[test]
    fn target_never_appears_in_results() {
        let store = store_of(vec![
            movie(1, &["Action"], 2000, 4.0, 5),
            movie(2, &["Action"], 2001, 4.0, 5),
        ]);

        let results = similar_movies(&store, 1, 6);
        assert!(results.iter().all(|s| s.movie_id != 1));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn overlap_ratio_uses_max_cardinality() {
        // Target has 3 tags, candidate has 1 shared tag out of 1:
        // overlap = 1 / max(3, 1) = 1/3
        let store = store_of(vec![
            movie(1, &["Action", "Crime", "Thriller"], 2000, 0.0, 0),
            movie(2, &["Action"], 2000, 0.0, 0),
        ]);

        let results = similar_movies(&store, 1, 6);
        let expected = (1.0 / 3.0) * SIMILAR_GENRE_WEIGHT + 1.0 * SIMILAR_YEAR_WEIGHT;
        assert!((results[0].score - expected).abs() < 1e-6);
    }

    #[test]
    fn year_proximity_decays_and_clamps() {
        let store = store_of(vec![
            movie(1, &["Drama"], 2000, 0.0, 0),
            movie(2, &["Drama"], 2010, 0.0, 0), // 10 years off
            movie(3, &["Drama"], 1940, 0.0, 0), // 60 years off, clamps to 0
        ]);

        let results = similar_movies(&store, 1, 6);
        let near = results.iter().find(|s| s.movie_id == 2).unwrap();
        let far = results.iter().find(|s| s.movie_id == 3).unwrap();

        let near_expected = 1.0 * SIMILAR_GENRE_WEIGHT + 0.8 * SIMILAR_YEAR_WEIGHT;
        let far_expected = 1.0 * SIMILAR_GENRE_WEIGHT;
        assert!((near.score - near_expected).abs() < 1e-6);
        assert!((far.score - far_expected).abs() < 1e-6);
    }

    #[test]
    fn tagless_pair_scores_zero_genre_without_nan() {
        let store = store_of(vec![
            movie(1, &[], 2000, 0.0, 0),
            movie(2, &[], 2000, 0.0, 0),
        ]);

        let results = similar_movies(&store, 1, 6);
        assert_eq!(results.len(), 1);
        assert!(results[0].score.is_finite());
        assert!((results[0].score - SIMILAR_YEAR_WEIGHT).abs() < 1e-6);
    }

    #[test]
    fn limit_truncates_results() {
        let movies = (1..=10)
            .map(|id| movie(id, &["Action"], 2000, 3.0, 3))
            .collect();
        let store = store_of(movies);

        assert_eq!(similar_movies(&store, 1, 4).len(), 4);
    }
}
