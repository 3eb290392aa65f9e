//! # Catalog Crate
//!
//! This crate holds the movie catalog domain model and the in-memory
//! document store the recommendation engine reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, Profile)
//! - **store**: CatalogStore — movies, ratings, and profiles with the
//!   collaborator operations the engine needs
//! - **loader**: JSON seed file parsing
//! - **error**: Error types for catalog operations
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{load_catalog, CatalogStore};
//! use std::path::Path;
//!
//! let mut store = load_catalog(Path::new("data/catalog.json"))?;
//!
//! store.upsert_rating(1, 42, 4.5, None)?;
//! let ratings = store.ratings_for_user(1);
//! let favorites = store.favorite_genres(1);
//! ```

// Public modules
pub mod error;
pub mod loader;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use loader::{load_catalog, parse_catalog};
pub use store::CatalogStore;
pub use types::{Movie, MovieId, Profile, Rating, UserId, Watchlist};
