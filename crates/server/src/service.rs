//! # Recommendation Service
//!
//! This module coordinates a recommendation request end to end:
//! 1. Fetch the user's ratings and favorite genres from the store
//! 2. Build the genre preference vector
//! 3. Score the unrated catalog (locally, or via the remote scoring service)
//! 4. Rank with a stable descending sort and take the top N
//! 5. Enrich with movie metadata
//!
//! The scoring backend is swappable behind the same interface: the local
//! linear combination and the remote gRPC scorer honor the identical
//! contract (one score per unrated candidate, catalog order preserved),
//! so callers never see which backend produced a ranking.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use catalog::{CatalogStore, MovieId, UserId};
use engine::{CandidateSignals, ScoredMovie};
use ml_client::ScoringClient;

/// Final recommendation returned to the caller
#[derive(Debug, Clone)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub year: u16,
    pub score: f32,
}

/// Which implementation scores the candidates
enum ScoringBackend {
    /// In-process linear combination
    Local,
    /// External gRPC scoring service
    Remote(ScoringClient),
}

/// Coordinates store reads, scoring, and ranking for one catalog.
///
/// The service holds a read-only catalog snapshot; every request is
/// stateless and the preference vector lives only for the duration of one
/// call.
pub struct RecommendationService {
    store: Arc<CatalogStore>,
    backend: ScoringBackend,
}

impl RecommendationService {
    /// Create a service that scores in-process
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self {
            store,
            backend: ScoringBackend::Local,
        }
    }

    /// Create a service backed by the remote scoring service.
    ///
    /// # Arguments
    /// * `store` - Shared catalog snapshot
    /// * `scorer_addr` - Address of the gRPC scorer (e.g., "http://localhost:50051")
    pub async fn with_remote_scorer(
        store: Arc<CatalogStore>,
        scorer_addr: impl Into<String>,
    ) -> Result<Self> {
        let client = ScoringClient::connect(scorer_addr)
            .await
            .context("Connecting to scoring service")?;
        Ok(Self {
            store,
            backend: ScoringBackend::Remote(client),
        })
    }

    /// Ranked recommendations for a user.
    ///
    /// Movies the user has rated are never returned. An unknown user simply
    /// has no ratings and no favorites, so they receive the unpersonalized
    /// ranking rather than an error.
    pub async fn recommendations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let start = Instant::now();

        // The store boundary: everything past this point is pure computation
        let ratings = self.store.ratings_for_user(user_id).to_vec();
        let favorites = self.store.favorite_genres(user_id).to_vec();
        debug!(
            user_id,
            ratings = ratings.len(),
            favorites = favorites.len(),
            "loaded user inputs"
        );

        let ranked = match &self.backend {
            ScoringBackend::Local => {
                let store = Arc::clone(&self.store);
                tokio::task::spawn_blocking(move || {
                    engine::recommend(&store, &ratings, &favorites, limit)
                })
                .await
                .context("Scoring task panicked")?
            }
            ScoringBackend::Remote(client) => {
                self.score_remotely(client, user_id, &ratings, &favorites, limit)
                    .await?
            }
        };

        let recommendations = self.enrich(ranked);
        info!(
            user_id,
            results = recommendations.len(),
            elapsed = ?start.elapsed(),
            "recommendations served"
        );
        Ok(recommendations)
    }

    /// Movies similar to a target movie.
    ///
    /// An unknown target yields an empty list, mirroring the engine.
    pub async fn similar(&self, movie_id: MovieId, limit: usize) -> Result<Vec<MovieRecommendation>> {
        let store = Arc::clone(&self.store);
        let ranked = tokio::task::spawn_blocking(move || {
            engine::similar_movies(&store, movie_id, limit)
        })
        .await
        .context("Similarity task panicked")?;

        Ok(self.enrich(ranked))
    }

    /// Score candidates via the remote service, then rank exactly like the
    /// local path: stable descending sort over catalog-ordered candidates.
    async fn score_remotely(
        &self,
        client: &ScoringClient,
        user_id: UserId,
        ratings: &[catalog::Rating],
        favorites: &[String],
        limit: usize,
    ) -> Result<Vec<ScoredMovie>> {
        let prefs = engine::build_preferences(ratings, favorites, &self.store);
        let rated = engine::rated_movie_ids(ratings);
        let candidates = engine::candidate_signals(&self.store, &prefs, &rated);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let request: Vec<ml_client::scoring::CandidateSignals> =
            candidates.iter().map(to_proto).collect();
        let scores = client
            .score_candidates(user_id, request)
            .await
            .context("Remote scoring failed")?;

        let mut ranked: Vec<ScoredMovie> = candidates
            .iter()
            .zip(scores)
            .map(|(signals, score)| ScoredMovie {
                movie_id: signals.movie_id,
                score,
            })
            .collect();
        engine::scoring::sort_descending(&mut ranked);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Attach movie metadata to ranked ids. Ids that have disappeared from
    /// the catalog are dropped rather than failing the request.
    fn enrich(&self, ranked: Vec<ScoredMovie>) -> Vec<MovieRecommendation> {
        ranked
            .into_iter()
            .filter_map(|scored| {
                let movie = self.store.get_movie(scored.movie_id)?;
                Some(MovieRecommendation {
                    movie_id: scored.movie_id,
                    title: movie.title.clone(),
                    genres: movie.genres.clone(),
                    year: movie.year,
                    score: scored.score,
                })
            })
            .collect()
    }
}

/// Convert engine signals into the wire message
fn to_proto(signals: &CandidateSignals) -> ml_client::scoring::CandidateSignals {
    ml_client::scoring::CandidateSignals {
        movie_id: signals.movie_id,
        genre_score: signals.genre_score,
        rating_score: signals.rating_score,
        popularity_score: signals.popularity_score,
        recency_score: signals.recency_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Movie;
    use ml_client::scoring::movie_scorer_server::{MovieScorer, MovieScorerServer};
    use ml_client::scoring::{ScoreRequest, ScoreResponse};
    use tokio::net::TcpListener;
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::transport::Server;
    use tonic::{Request, Response, Status};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn movie(id: MovieId, genres: &[&str], year: u16) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            description: String::new(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            year,
            average_rating: 0.0,
            rating_count: 0,
        }
    }

    fn build_test_store() -> Arc<CatalogStore> {
        let mut store = CatalogStore::new();
        store.insert_movie(movie(1, &["Action", "SciFi"], 1999)).unwrap();
        store.insert_movie(movie(2, &["Animation", "Comedy"], 1995)).unwrap();
        store.insert_movie(movie(3, &["Crime", "Drama"], 1994)).unwrap();
        store.insert_movie(movie(4, &["Drama", "Romance"], 1994)).unwrap();

        store.set_favorite_genres(1, vec!["Action".to_string()]);
        store.upsert_rating(1, 1, 5.0, None).unwrap();
        Arc::new(store)
    }

    // ============================================================================
    // Mock scoring service
    // ============================================================================

    /// Mock scorer that ranks by movie id, highest id first
    #[derive(Default)]
    struct IdScorer;

    #[tonic::async_trait]
    impl MovieScorer for IdScorer {
        async fn score_candidates(
            &self,
            request: Request<ScoreRequest>,
        ) -> Result<Response<ScoreResponse>, Status> {
            let scores = request
                .get_ref()
                .candidates
                .iter()
                .map(|c| c.movie_id as f32 * 0.1)
                .collect();
            Ok(Response::new(ScoreResponse { scores }))
        }
    }

    /// Mock scorer that returns the wrong number of scores
    #[derive(Default)]
    struct BrokenScorer;

    #[tonic::async_trait]
    impl MovieScorer for BrokenScorer {
        async fn score_candidates(
            &self,
            _request: Request<ScoreRequest>,
        ) -> Result<Response<ScoreResponse>, Status> {
            Ok(Response::new(ScoreResponse { scores: vec![0.5] }))
        }
    }

    async fn start_mock_scorer<S>(scorer: S) -> (String, tokio::task::JoinHandle<()>)
    where
        S: MovieScorer,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock scorer");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            Server::builder()
                .add_service(MovieScorerServer::new(scorer))
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await
                .expect("Mock scorer failed");
        });

        (format!("http://{}", addr), handle)
    }

    // ============================================================================
    // Local backend
    // ============================================================================

    #[tokio::test]
    async fn local_backend_excludes_rated_movies() {
        let service = RecommendationService::new(build_test_store());

        let recommendations = service.recommendations(1, 10).await.unwrap();

        assert!(!recommendations.is_empty());
        assert!(recommendations.iter().all(|r| r.movie_id != 1));
    }

    #[tokio::test]
    async fn local_backend_enriches_metadata() {
        let service = RecommendationService::new(build_test_store());

        let recommendations = service.recommendations(1, 10).await.unwrap();
        let first = &recommendations[0];

        assert!(!first.title.is_empty());
        assert!(!first.genres.is_empty());
        assert!(first.year >= 1994);
    }

    #[tokio::test]
    async fn local_backend_respects_limit() {
        let service = RecommendationService::new(build_test_store());

        let recommendations = service.recommendations(1, 2).await.unwrap();
        assert_eq!(recommendations.len(), 2);
    }

    #[tokio::test]
    async fn unknown_user_gets_unpersonalized_ranking() {
        let service = RecommendationService::new(build_test_store());

        let recommendations = service.recommendations(999, 10).await.unwrap();
        // No ratings to exclude: the whole catalog is eligible
        assert_eq!(recommendations.len(), 4);
    }

    #[tokio::test]
    async fn similar_excludes_target() {
        let service = RecommendationService::new(build_test_store());

        let results = service.similar(3, 6).await.unwrap();
        assert!(results.iter().all(|r| r.movie_id != 3));
        // Movie 4 shares Drama and the release year
        assert_eq!(results[0].movie_id, 4);
    }

    #[tokio::test]
    async fn similar_unknown_target_is_empty() {
        let service = RecommendationService::new(build_test_store());
        let results = service.similar(404, 6).await.unwrap();
        assert!(results.is_empty());
    }

    // ============================================================================
    // Remote backend
    // ============================================================================

    #[tokio::test]
    async fn remote_backend_ranks_by_service_scores() {
        let (addr, handle) = start_mock_scorer(IdScorer).await;
        let service = RecommendationService::with_remote_scorer(build_test_store(), addr)
            .await
            .expect("Failed to create service");

        let recommendations = service.recommendations(1, 10).await.unwrap();

        // IdScorer scores by movie id, so the ranking is 4, 3, 2; movie 1 is
        // rated by user 1 and never reaches the scorer
        let ids: Vec<MovieId> = recommendations.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![4, 3, 2]);

        handle.abort();
    }

    #[tokio::test]
    async fn remote_backend_respects_limit() {
        let (addr, handle) = start_mock_scorer(IdScorer).await;
        let service = RecommendationService::with_remote_scorer(build_test_store(), addr)
            .await
            .expect("Failed to create service");

        let recommendations = service.recommendations(1, 1).await.unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].movie_id, 4);

        handle.abort();
    }

    #[tokio::test]
    async fn remote_score_count_mismatch_is_an_error() {
        let (addr, handle) = start_mock_scorer(BrokenScorer).await;
        let service = RecommendationService::with_remote_scorer(build_test_store(), addr)
            .await
            .expect("Failed to create service");

        let result = service.recommendations(1, 10).await;
        assert!(result.is_err());

        handle.abort();
    }
}
