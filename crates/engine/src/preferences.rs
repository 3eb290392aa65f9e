//! Genre preference vector construction.
//!
//! ## Algorithm
//! 1. Every declared favorite genre adds a flat bonus of 2.0
//! 2. Every rating of 4.0 or higher adds `rating / 5` to each genre tag of
//!    the rated movie; lower ratings, and ratings whose movie is missing
//!    from the catalog, contribute nothing
//! 3. Normalize so the weights sum to 1; an all-zero vector stays all-zero
//!
//! The vector is ephemeral: it is rebuilt on every request and returned
//! explicitly instead of being cached on an engine instance, so a reused
//! engine can never serve one user another user's preferences.

use catalog::{CatalogStore, Rating};
use std::collections::HashMap;

/// Flat weight added for each declared favorite genre
pub const FAVORITE_GENRE_BONUS: f32 = 2.0;

/// Minimum rating value for a rating to contribute genre weight
pub const HIGH_RATING_THRESHOLD: f32 = 4.0;

/// The rating scale ceiling; per-rating contributions are `rating / 5`
pub const RATING_SCALE: f32 = 5.0;

/// Normalized genre -> affinity weight mapping for one user.
///
/// Weights are non-negative and sum to 1 whenever any genre has nonzero
/// raw weight; otherwise every lookup yields 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenrePreferences {
    weights: HashMap<String, f32>,
}

impl GenrePreferences {
    /// Weight for a genre; genres outside the vector weigh 0
    pub fn weight(&self, genre: &str) -> f32 {
        self.weights.get(genre).copied().unwrap_or(0.0)
    }

    /// Sum of all weights (1.0 or 0.0 up to float error)
    pub fn total(&self) -> f32 {
        self.weights.values().sum()
    }

    /// Number of genres carrying weight
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Snapshot of the vector sorted by descending weight, then genre name.
    ///
    /// For inspection and display only; the engine itself always reads
    /// through `weight()`.
    pub fn snapshot(&self) -> Vec<(String, f32)> {
        let mut entries: Vec<(String, f32)> = self
            .weights
            .iter()
            .map(|(g, w)| (g.clone(), *w))
            .collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        entries
    }
}

/// Build the normalized genre preference vector for one user.
///
/// # Arguments
/// * `ratings` - The user's full rating history
/// * `favorite_genres` - The user's declared favorite genres
/// * `store` - Catalog used to resolve rated movies to their genre tags
pub fn build_preferences(
    ratings: &[Rating],
    favorite_genres: &[String],
    store: &CatalogStore,
) -> GenrePreferences {
    let mut weights: HashMap<String, f32> = HashMap::new();

    for genre in favorite_genres {
        *weights.entry(genre.clone()).or_insert(0.0) += FAVORITE_GENRE_BONUS;
    }

    for rating in ratings {
        if rating.rating < HIGH_RATING_THRESHOLD {
            continue;
        }
        // Unresolvable movie references are skipped silently
        if let Some(movie) = store.get_movie(rating.movie_id) {
            for genre in &movie.genres {
                *weights.entry(genre.clone()).or_insert(0.0) += rating.rating / RATING_SCALE;
            }
        }
    }

    let total: f32 = weights.values().sum();
    if total > 0.0 {
        for weight in weights.values_mut() {
            *weight /= total;
        }
    }

    GenrePreferences { weights }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Movie;

    fn store_with_movies(movies: Vec<(u32, &[&str])>) -> CatalogStore {
        let mut store = CatalogStore::new();
        for (id, genres) in movies {
            store
                .insert_movie(Movie {
                    id,
                    title: format!("Movie {}", id),
                    description: String::new(),
                    genres: genres.iter().map(|g| g.to_string()).collect(),
                    year: 2000,
                    average_rating: 0.0,
                    rating_count: 0,
                })
                .unwrap();
        }
        store
    }

    fn rating(movie_id: u32, value: f32) -> Rating {
        Rating {
            user_id: 1,
            movie_id,
            rating: value,
            review: None,
        }
    }

    #[test]
    fn favorites_only_vector_is_uniform() {
        let store = store_with_movies(vec![]);
        let favorites = vec!["Action".to_string(), "Drama".to_string()];

        let prefs = build_preferences(&[], &favorites, &store);

        // Two favorites, equal bonus each -> 0.5 / 0.5
        assert!((prefs.weight("Action") - 0.5).abs() < 1e-6);
        assert!((prefs.weight("Drama") - 0.5).abs() < 1e-6);
        assert!((prefs.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn high_ratings_contribute_scaled_weight() {
        let store = store_with_movies(vec![(1, &["Action"]), (2, &["Comedy"])]);
        let ratings = vec![rating(1, 5.0), rating(2, 4.0)];

        let prefs = build_preferences(&ratings, &[], &store);

        // Raw weights: Action 1.0, Comedy 0.8 -> normalized 1/1.8 and 0.8/1.8
        assert!((prefs.weight("Action") - 1.0 / 1.8).abs() < 1e-6);
        assert!((prefs.weight("Comedy") - 0.8 / 1.8).abs() < 1e-6);
    }

    #[test]
    fn ratings_below_threshold_are_ignored() {
        let store = store_with_movies(vec![(1, &["Action"])]);
        let ratings = vec![rating(1, 3.9)];

        let prefs = build_preferences(&ratings, &[], &store);
        assert!(prefs.is_empty());
        assert_eq!(prefs.weight("Action"), 0.0);
    }

    #[test]
    fn missing_movie_reference_is_skipped() {
        let store = store_with_movies(vec![(1, &["Action"])]);
        let ratings = vec![rating(1, 5.0), rating(999, 5.0)];

        let prefs = build_preferences(&ratings, &[], &store);

        // Only the resolvable rating counts
        assert!((prefs.weight("Action") - 1.0).abs() < 1e-6);
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn favorite_bonus_dominates_single_rating() {
        // The flat 2.0 bonus outweighs a single 5-star rating's 1.0
        let store = store_with_movies(vec![(1, &["Comedy"])]);
        let ratings = vec![rating(1, 5.0)];
        let favorites = vec!["Action".to_string()];

        let prefs = build_preferences(&ratings, &favorites, &store);

        assert!((prefs.weight("Action") - 2.0 / 3.0).abs() < 1e-6);
        assert!((prefs.weight("Comedy") - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn zero_total_stays_zero() {
        let store = store_with_movies(vec![]);
        let prefs = build_preferences(&[], &[], &store);

        assert!(prefs.is_empty());
        assert_eq!(prefs.total(), 0.0);
        assert_eq!(prefs.weight("Anything"), 0.0);
    }

    #[test]
    fn normalization_sums_to_one() {
        let store = store_with_movies(vec![(1, &["Action", "Thriller"]), (2, &["Drama"])]);
        let ratings = vec![rating(1, 4.5), rating(2, 5.0)];
        let favorites = vec!["SciFi".to_string()];

        let prefs = build_preferences(&ratings, &favorites, &store);
        assert!((prefs.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn snapshot_sorted_by_weight_then_name() {
        let store = store_with_movies(vec![]);
        let favorites = vec![
            "Drama".to_string(),
            "Action".to_string(),
            "Comedy".to_string(),
        ];

        let prefs = build_preferences(&[], &favorites, &store);
        let snapshot = prefs.snapshot();

        // Equal weights, so alphabetical
        let names: Vec<&str> = snapshot.iter().map(|(g, _)| g.as_str()).collect();
        assert_eq!(names, vec!["Action", "Comedy", "Drama"]);
    }
}
