//! A concrete [`ResultsClient`] implementation backed by reqwest
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{event, instrument, Level};

use crate::model::{PartiesResponse, Party, VoteResultsResponse};

use super::error::{Error, Result};
use super::ResultsClient;

const VOTE_RESULTS_PATH: &str = "/votes/results";
const PARTIES_PATH: &str = "/parties";

/// Shape of the backend's error bodies
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HttpClient handle
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    /// Constructs a client for the REST api rooted at `base_url` (eg: `http://localhost:3000/api`)
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).send().await?;
        let response = error_for_status(response).await?;
        let body = response.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turns a non-2xx response into [`Error::Http`], preferring the `error` field of the body as reason
async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status.canonical_reason().unwrap_or("unknown status").to_string();
    let reason = match response.json::<ErrorBody>().await {
        Ok(ErrorBody { error: Some(error) }) => error,
        _ => fallback,
    };

    event!(Level::WARN, "backend returned {}: {}", status, reason);
    Err(Error::Http {
        status: status.as_u16(),
        reason,
    })
}

#[async_trait]
impl ResultsClient for HttpClient {
    #[instrument(name = "client::http::vote_results", level = "debug", skip(self))]
    async fn vote_results(&self) -> Result<VoteResultsResponse> {
        self.get_json(VOTE_RESULTS_PATH).await
    }

    #[instrument(name = "client::http::parties", level = "debug", skip(self))]
    async fn parties(&self) -> Result<Vec<Party>> {
        let response: PartiesResponse = self.get_json(PARTIES_PATH).await?;
        Ok(response.into_parties())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HttpClient;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = HttpClient::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }
}
