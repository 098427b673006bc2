//! Mock implementation for [`ResultsClient`]
//!
//! Serves canned tallies and parties, counts calls per endpoint and can inject faults and latency.
use crate::{
    model::{Party, VoteResultsResponse, VoteTally},
    test_utils::fault::{Fault, When},
};

use async_trait::async_trait;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
    time::Duration,
};

use super::{
    error::{Error, Result},
    ResultsClient,
};

#[derive(Debug, Default)]
pub struct Stats {
    pub n_calls: AtomicUsize,
}

impl Stats {
    pub fn calls(&self) -> usize {
        self.n_calls.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct MockClientStats {
    pub vote_results: Stats,
    pub parties: Stats,
}

#[derive(Debug, Clone, Default)]
pub struct MockClientFaults {
    pub vote_results: Fault,
    pub parties: Fault,
}

#[derive(Debug, Default)]
struct MockData {
    vote_results: VoteResultsResponse,
    parties: Vec<Party>,
    faults: MockClientFaults,
}

#[derive(Debug, Default)]
pub struct MockClient {
    data: Mutex<MockData>,
    latency: Duration,
    pub stats: MockClientStats,
}

impl MockClient {
    fn acquire_lock(&self) -> MutexGuard<MockData> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Replaces the tallies served from now on. `total_votes` is computed from them
    pub fn set_tallies(&self, results: Vec<VoteTally>) {
        let total_votes = results.iter().map(|t| t.vote_count).sum();
        self.acquire_lock().vote_results = VoteResultsResponse {
            results,
            total_votes,
        };
    }

    pub fn set_vote_results(&self, vote_results: VoteResultsResponse) {
        self.acquire_lock().vote_results = vote_results;
    }

    pub fn set_parties(&self, parties: Vec<Party>) {
        self.acquire_lock().parties = parties;
    }

    pub fn set_vote_results_fault(&self, when: When) {
        self.acquire_lock().faults.vote_results = Fault { when };
    }

    pub fn set_parties_fault(&self, when: When) {
        self.acquire_lock().faults.parties = Fault { when };
    }

    /// Total number of backend reads issued, across both endpoints
    pub fn total_calls(&self) -> usize {
        self.stats.vote_results.calls() + self.stats.parties.calls()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl ResultsClient for MockClient {
    async fn vote_results(&self) -> Result<VoteResultsResponse> {
        self.stats.vote_results.n_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let mut guard = self.acquire_lock();
        if guard.faults.vote_results.trigger() {
            return Err(Error::UnableToConnect {
                reason: "Mocked error on vote_results".to_string(),
            });
        }

        Ok(guard.vote_results.clone())
    }

    async fn parties(&self) -> Result<Vec<Party>> {
        self.stats.parties.n_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let mut guard = self.acquire_lock();
        if guard.faults.parties.trigger() {
            return Err(Error::InvalidServerResponse {
                reason: "Mocked error on parties".to_string(),
            });
        }

        Ok(guard.parties.clone())
    }
}

pub struct MockClientBuilder {
    data: MockData,
    latency: Duration,
}

impl Default for MockClientBuilder {
    fn default() -> Self {
        Self {
            data: MockData::default(),
            latency: Duration::ZERO,
        }
    }
}

impl MockClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tallies(mut self, results: Vec<VoteTally>) -> Self {
        let total_votes = results.iter().map(|t| t.vote_count).sum();
        self.data.vote_results = VoteResultsResponse {
            results,
            total_votes,
        };
        self
    }

    pub fn with_vote_results(mut self, vote_results: VoteResultsResponse) -> Self {
        self.data.vote_results = vote_results;
        self
    }

    pub fn with_parties(mut self, parties: Vec<Party>) -> Self {
        self.data.parties = parties;
        self
    }

    pub fn with_vote_results_fault(mut self, when: When) -> Self {
        self.data.faults.vote_results = Fault { when };
        self
    }

    pub fn with_parties_fault(mut self, when: When) -> Self {
        self.data.faults.parties = Fault { when };
        self
    }

    /// Every call sleeps this long before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn build(self) -> MockClient {
        MockClient {
            data: Mutex::new(self.data),
            latency: self.latency,
            stats: Default::default(),
        }
    }
}
