//! The result fetcher issues the two backend reads a results cycle needs and only succeeds when both do.
//!
//! It never retries. A failed cycle is simply followed by the next scheduled one.
use tracing::{event, instrument, Level};

use crate::{
    client::ResultsClient,
    error::Result,
    model::{Party, VoteTally},
};

/// The raw pair of datasets from one fetch cycle. Kept in memory so a locale change can re-rank without
/// hitting the network again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedResults {
    pub vote_results: Vec<VoteTally>,
    pub total_votes: u64,
    pub parties: Vec<Party>,
}

/// Requests tallies and parties concurrently.
///
/// # Error
/// If either request fails the whole fetch fails with [`crate::error::Error::Fetch`]. A partial pair is
/// never returned.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_results(client: &(dyn ResultsClient + Send + Sync)) -> Result<FetchedResults> {
    let (votes, parties) = futures::try_join!(client.vote_results(), client.parties())?;

    event!(
        Level::DEBUG,
        "fetched {} tallies ({} total votes) and {} parties",
        votes.results.len(),
        votes.total_votes,
        parties.len()
    );

    Ok(FetchedResults {
        vote_results: votes.results,
        total_votes: votes.total_votes,
        parties,
    })
}
