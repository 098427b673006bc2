//! Module that contains the client API for the two backend reads the results pipeline depends on.
use crate::model::{Party, VoteResultsResponse};

use async_trait::async_trait;

pub mod error;
pub mod http_client;
pub mod mock;

pub use http_client::HttpClient;

use error::Result;

/// Trait that defines which reads a results backend client needs to implement
#[async_trait]
pub trait ResultsClient {
    /// `GET /votes/results`: per-party tallies plus the total vote count
    async fn vote_results(&self) -> Result<VoteResultsResponse>;
    /// `GET /parties`: the full party catalog
    async fn parties(&self) -> Result<Vec<Party>>;
}
