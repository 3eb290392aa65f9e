//! gRPC client for the external movie scoring service.
//!
//! The scoring service is an alternate backing implementation of the
//! recommendation scoring contract: it receives the same per-candidate
//! signals the local scorer combines, and returns one score per candidate
//! in request order. This crate handles:
//! - Connection management to the service
//! - Sending candidate signals and receiving scores
//! - Validating that the response lines up with the request

use thiserror::Error;
use tonic::transport::Channel;
use tracing::{debug, error, info};

// Include the generated protobuf code
pub mod scoring {
    tonic::include_proto!("scoring");
}

use scoring::{movie_scorer_client::MovieScorerClient, CandidateSignals, ScoreRequest};

/// Errors that can occur when interacting with the scoring service
#[derive(Error, Debug)]
pub enum ScoringClientError {
    #[error("Failed to connect to scoring service at {addr}: {source}")]
    Connection {
        addr: String,
        source: tonic::transport::Error,
    },

    #[error("Invalid scoring service address: {0}")]
    InvalidAddress(String),

    #[error("Scoring call failed: {0}")]
    Scoring(#[from] tonic::Status),

    #[error("Scoring service returned {got} scores for {expected} candidates")]
    ScoreCountMismatch { expected: usize, got: usize },
}

/// Client for the remote movie scoring service.
///
/// Wraps the generated gRPC client with request construction and response
/// validation. Cloning is cheap; the underlying channel is shared.
#[derive(Clone)]
pub struct ScoringClient {
    client: MovieScorerClient<Channel>,
}

impl ScoringClient {
    /// Connect to the scoring service.
    ///
    /// # Arguments
    /// * `addr` - Address of the gRPC service (e.g., "http://localhost:50051")
    pub async fn connect(addr: impl Into<String>) -> Result<Self, ScoringClientError> {
        let addr = addr.into();
        info!("Connecting to scoring service at {}", addr);

        let endpoint = Channel::from_shared(addr.clone())
            .map_err(|_| ScoringClientError::InvalidAddress(addr.clone()))?;
        let channel = endpoint
            .connect()
            .await
            .map_err(|source| ScoringClientError::Connection { addr, source })?;

        Ok(ScoringClient {
            client: MovieScorerClient::new(channel),
        })
    }

    /// Score a batch of candidates for a user.
    ///
    /// # Returns
    /// One score per candidate, in the same order as the request. A count
    /// mismatch from the service is an error; the caller must be able to
    /// zip scores back onto its candidate list.
    pub async fn score_candidates(
        &self,
        user_id: u32,
        candidates: Vec<CandidateSignals>,
    ) -> Result<Vec<f32>, ScoringClientError> {
        let expected = candidates.len();
        debug!("Scoring {} candidates for user {}", expected, user_id);

        let request = tonic::Request::new(ScoreRequest {
            user_id,
            candidates,
        });

        let mut client = self.client.clone();
        let response = client.score_candidates(request).await.map_err(|status| {
            error!("gRPC error while scoring candidates: {}", status);
            status
        })?;

        let scores = response.into_inner().scores;
        if scores.len() != expected {
            error!(
                "Score count mismatch: expected {}, got {}",
                expected,
                scores.len()
            );
            return Err(ScoringClientError::ScoreCountMismatch {
                expected,
                got: scores.len(),
            });
        }
        Ok(scores)
    }
}
