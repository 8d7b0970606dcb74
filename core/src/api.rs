//! Jobs API client
//!
//! Fetches one page of `GET {base}/common/jobs?page={n}` and runs every raw
//! result through the normalizer, keeping upstream order (it is the ranking).

use async_trait::async_trait;
use common::{Job, normalize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Api;
use crate::error::{FetchError, MalformedResponseError};

/// Anything that can produce a page of jobs. The list coordinator only talks
/// to this trait.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch page `page` (1-based). Never retries.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Job>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct JobsClient {
    http: reqwest::Client,
    base_url: String,
}

impl JobsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn from_settings(api: &Api) -> Self {
        Self::new(api.base_url.clone())
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}/common/jobs?page={}", self.base_url, page)
    }
}

#[async_trait]
impl JobSource for JobsClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Job>, FetchError> {
        if page == 0 {
            return Err(FetchError::InvalidPage(page));
        }

        let url = self.page_url(page);
        debug!(page, %url, "fetching jobs page");

        let response = self.http.get(&url).send().await.map_err(|source| {
            error!(page, error = %source, "jobs request failed");
            FetchError::Transport { page, source }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(page, status = status.as_u16(), "jobs request returned an error status");
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| {
                error!(page, error = %source, "failed to read jobs response body");
                FetchError::Transport { page, source }
            })?;

        match parse_page(&body) {
            Ok(jobs) => {
                info!(page, count = jobs.len(), "fetched jobs page");
                Ok(jobs)
            }
            Err(err) => {
                warn!(page, error = %err, "invalid API response format");
                Ok(Vec::new())
            }
        }
    }
}

/// Parse a response body into normalized jobs.
pub fn parse_page(body: &[u8]) -> Result<Vec<Job>, MalformedResponseError> {
    let payload: Value = serde_json::from_slice(body)?;
    let results = payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or(MalformedResponseError::MissingResults)?;

    Ok(results.iter().map(normalize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::JobId;

    #[test]
    fn test_page_url_trims_trailing_slash() {
        let client = JobsClient::new("https://example.test/");
        assert_eq!(client.page_url(3), "https://example.test/common/jobs?page=3");
    }

    #[test]
    fn test_parse_page_keeps_upstream_order() {
        let body = br#"{"results":[{"id":3,"title":"C"},{"id":1,"title":"A"},{"id":2}]}"#;
        let jobs = parse_page(body).unwrap();

        let ids: Vec<JobId> = jobs.iter().map(|job| job.id.clone()).collect();
        assert_eq!(ids, vec![JobId::Number(3), JobId::Number(1), JobId::Number(2)]);
        assert_eq!(jobs[2].title, "Untitled Position");
    }

    #[test]
    fn test_parse_page_without_results_is_malformed() {
        assert!(matches!(
            parse_page(br#"{"data":[]}"#),
            Err(MalformedResponseError::MissingResults)
        ));
        assert!(matches!(
            parse_page(br#"{"results":{}}"#),
            Err(MalformedResponseError::MissingResults)
        ));
        assert!(matches!(
            parse_page(b"<html>oops</html>"),
            Err(MalformedResponseError::NotJson(_))
        ));
    }

    #[tokio::test]
    async fn test_page_zero_is_rejected_without_a_request() {
        // Nothing listens here; a request would surface as Transport instead.
        let client = JobsClient::new("http://127.0.0.1:9");
        let err = client.fetch_page(0).await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidPage(0)));
    }
}
