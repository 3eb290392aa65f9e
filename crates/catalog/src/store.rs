//! In-memory document store for movies, ratings, and profiles.
//!
//! This is the catalog's single source of truth. It provides the collaborator
//! operations the recommendation engine depends on:
//!
//! - `movies()`: all movies in stable insertion order (the engine's
//!   deterministic tie-breaking relies on this order not changing between
//!   calls within one request)
//! - `ratings_for_user()`: a user's rating history
//! - `favorite_genres()`: a user's declared favorite genres
//! - `upsert_rating()`: the single write path; recomputes the movie's
//!   aggregate rating fields in the same call
//!
//! All reads hand out references; the store owns the data.

use crate::error::{CatalogError, Result};
use crate::types::{Movie, MovieId, Profile, Rating, UserId};
use std::collections::HashMap;
use tracing::debug;

/// The in-memory catalog, rating, and profile store.
///
/// Writes go through `&mut self`, so the read-modify-write that keeps a
/// movie's `average_rating`/`rating_count` consistent with its stored
/// ratings is serialized per store, which is the transaction granularity
/// the aggregate fields need.
#[derive(Debug, Default)]
pub struct CatalogStore {
    /// Movies in insertion order; iteration order is the catalog order
    movies: Vec<Movie>,
    /// Movie id -> position in `movies`
    movie_index: HashMap<MovieId, usize>,

    /// All ratings made by each user
    user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    movie_ratings: HashMap<MovieId, Vec<Rating>>,

    /// User profiles (favorite genres)
    profiles: HashMap<UserId, Profile>,

    /// Per-user watchlist, in the order movies were added
    watchlists: HashMap<UserId, Vec<MovieId>>,
}

impl CatalogStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// All movies in stable insertion order.
    ///
    /// Repeated calls return the same order; the engine's stable-sort
    /// tie-breaking depends on this.
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Get a movie by id
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movie_index.get(&id).map(|&pos| &self.movies[pos])
    }

    /// All ratings made by a user, empty if the user has none
    pub fn ratings_for_user(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All ratings received by a movie
    pub fn ratings_for_movie(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// A user's rating for one movie, if any
    pub fn rating_by_user(&self, user_id: UserId, movie_id: MovieId) -> Option<&Rating> {
        self.ratings_for_user(user_id)
            .iter()
            .find(|r| r.movie_id == movie_id)
    }

    /// A user's declared favorite genres, empty if none declared
    pub fn favorite_genres(&self, user_id: UserId) -> &[String] {
        self.profiles
            .get(&user_id)
            .map(|p| p.favorite_genres.as_slice())
            .unwrap_or(&[])
    }

    /// A user's watchlist, in the order movies were added
    pub fn watchlist(&self, user_id: UserId) -> &[MovieId] {
        self.watchlists
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Counts for logging/validation: (movies, users with ratings, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.movies.len(), self.user_ratings.len(), total_ratings)
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Insert a movie into the catalog.
    ///
    /// Fails on a duplicate id; movie records are immutable once inserted
    /// apart from the aggregate rating fields.
    pub fn insert_movie(&mut self, movie: Movie) -> Result<()> {
        if self.movie_index.contains_key(&movie.id) {
            return Err(CatalogError::DuplicateMovie { id: movie.id });
        }
        self.movie_index.insert(movie.id, self.movies.len());
        self.movies.push(movie);
        Ok(())
    }

    /// Replace a user's favorite genres
    pub fn set_favorite_genres(&mut self, user_id: UserId, genres: Vec<String>) {
        let profile = self.profiles.entry(user_id).or_insert_with(|| Profile {
            user_id,
            favorite_genres: Vec::new(),
        });
        profile.favorite_genres = genres;
    }

    /// Create or overwrite a rating and recompute the movie's aggregates.
    ///
    /// The (user_id, movie_id) pair is unique: a resubmission replaces the
    /// stored value instead of adding a second document. After the write,
    /// `average_rating` is the mean of all stored ratings for the movie and
    /// `rating_count` their number.
    pub fn upsert_rating(
        &mut self,
        user_id: UserId,
        movie_id: MovieId,
        rating: f32,
        review: Option<String>,
    ) -> Result<()> {
        if !(0.0..=5.0).contains(&rating) {
            return Err(CatalogError::InvalidRating { value: rating });
        }
        let movie_pos = *self
            .movie_index
            .get(&movie_id)
            .ok_or(CatalogError::UnknownMovie { id: movie_id })?;

        let entry = Rating {
            user_id,
            movie_id,
            rating,
            review,
        };

        upsert_into(
            self.user_ratings.entry(user_id).or_default(),
            entry.clone(),
            |r| r.movie_id == movie_id,
        );
        upsert_into(
            self.movie_ratings.entry(movie_id).or_default(),
            entry,
            |r| r.user_id == user_id,
        );

        // Recompute aggregates from the stored ratings for this movie
        let ratings = &self.movie_ratings[&movie_id];
        let movie = &mut self.movies[movie_pos];
        movie.rating_count = ratings.len() as u32;
        movie.average_rating = ratings.iter().map(|r| r.rating).sum::<f32>() / ratings.len() as f32;

        debug!(
            movie_id,
            user_id,
            average_rating = movie.average_rating,
            rating_count = movie.rating_count,
            "rating upserted"
        );
        Ok(())
    }

    /// Add a movie to a user's watchlist.
    ///
    /// Membership is a set: a movie already on the list stays where it is.
    /// Fails when the movie does not exist.
    pub fn add_to_watchlist(&mut self, user_id: UserId, movie_id: MovieId) -> Result<()> {
        if !self.movie_index.contains_key(&movie_id) {
            return Err(CatalogError::UnknownMovie { id: movie_id });
        }
        let list = self.watchlists.entry(user_id).or_default();
        if !list.contains(&movie_id) {
            list.push(movie_id);
            debug!(user_id, movie_id, "watchlist add");
        }
        Ok(())
    }

    /// Remove a movie from a user's watchlist; absent entries are a no-op
    pub fn remove_from_watchlist(&mut self, user_id: UserId, movie_id: MovieId) {
        if let Some(list) = self.watchlists.get_mut(&user_id) {
            list.retain(|id| *id != movie_id);
            debug!(user_id, movie_id, "watchlist remove");
        }
    }
}

/// Replace the first element matching `matches`, or push if none does
fn upsert_into<F>(ratings: &mut Vec<Rating>, entry: Rating, matches: F)
where
    F: Fn(&Rating) -> bool,
{
    match ratings.iter().position(|r| matches(r)) {
        Some(pos) => ratings[pos] = entry,
        None => ratings.push(entry),
    }
}
