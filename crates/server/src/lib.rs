//! Server crate for the FlickPick recommendation engine.
//!
//! This crate contains the service that coordinates the catalog store, the
//! preference engine, and the scoring backend for each request.

pub mod service;

pub use service::{MovieRecommendation, RecommendationService};
