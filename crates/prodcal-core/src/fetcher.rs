//! Concurrent multi-URL fetching with partial-failure tolerance.
//!
//! A [`ConcurrentFetcher`] issues one batch of independent GET requests in
//! parallel, waits until each has either completed or hit its own timeout,
//! and returns the bodies that arrived. The batch only fails when nothing
//! arrived at all.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, ReqwestHttpClient};

/// Bodies of one fetch batch keyed by the effective URL they were served from.
pub type FetchResults = HashMap<String, String>;

/// Options applied uniformly to every request of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Upper bound for a whole request, connect included.
    pub timeout: Duration,
    /// Upper bound for establishing the connection. Applied by the transport.
    pub connect_timeout: Duration,
    /// Treat non-2xx responses as failed requests.
    pub fail_on_non_success_status: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(1),
            fail_on_non_success_status: true,
        }
    }
}

impl FetchOptions {
    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    pub fn with_connect_timeout_secs(mut self, seconds: u64) -> Self {
        self.connect_timeout = Duration::from_secs(seconds);
        self
    }

    pub fn with_fail_on_non_success_status(mut self, fail: bool) -> Self {
        self.fail_on_non_success_status = fail;
        self
    }
}

/// Runs batches of requests concurrently over a shared transport.
#[derive(Clone)]
pub struct ConcurrentFetcher {
    client: Arc<dyn HttpClient>,
    options: FetchOptions,
}

impl ConcurrentFetcher {
    pub fn new(client: Arc<dyn HttpClient>, options: FetchOptions) -> Self {
        Self { client, options }
    }

    /// Fetcher backed by a reqwest client built from `options`.
    pub fn with_reqwest(options: FetchOptions) -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new(&options)), options)
    }

    pub const fn options(&self) -> FetchOptions {
        self.options
    }

    /// Fetch every URL concurrently and collect the non-empty bodies.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::FetchFailed`] with every per-request error when
    /// no request produced a body, including when `urls` is empty.
    pub async fn query<I, S>(&self, urls: I) -> Result<FetchResults, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Dropping the set aborts whatever is still in flight, so no request
        // outlives this call on any return path.
        let mut batch = JoinSet::new();
        for url in urls {
            let url: String = url.into();
            let client = Arc::clone(&self.client);
            let options = self.options;
            batch.spawn(async move { fetch_one(client.as_ref(), url, options).await });
        }

        debug!(requests = batch.len(), "starting fetch batch");

        let mut bodies = FetchResults::new();
        let mut errors = Vec::new();
        while let Some(joined) = batch.join_next().await {
            match joined {
                Ok(Ok((url, body))) => {
                    bodies.insert(url, body);
                }
                Ok(Err(error)) => {
                    warn!(url = error.url(), error = error.message(), "request failed");
                    errors.push(error);
                }
                Err(join_error) => {
                    warn!(error = %join_error, "request task did not complete");
                    errors.push(HttpError::new(
                        HttpErrorKind::Other,
                        "<unknown>",
                        format!("request task did not complete: {join_error}"),
                    ));
                }
            }
        }

        debug!(
            succeeded = bodies.len(),
            failed = errors.len(),
            "fetch batch settled"
        );

        if bodies.is_empty() {
            return Err(FetchError::FetchFailed { errors });
        }
        Ok(bodies)
    }
}

async fn fetch_one(
    client: &dyn HttpClient,
    url: String,
    options: FetchOptions,
) -> Result<(String, String), HttpError> {
    let request = HttpRequest::get(url.as_str()).with_timeout(options.timeout);
    let response = tokio::time::timeout(options.timeout, client.execute(request))
        .await
        .map_err(|_| HttpError::timeout(url.as_str(), options.timeout))??;

    if options.fail_on_non_success_status && !response.is_success() {
        return Err(HttpError::status(url, response.status));
    }
    if response.body.is_empty() {
        return Err(HttpError::new(HttpErrorKind::Body, url, "empty response body"));
    }

    let effective_url = if response.url.is_empty() {
        url
    } else {
        response.url
    };
    Ok((effective_url, response.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpResponse, StaticHttpClient};

    fn fetcher(client: StaticHttpClient, options: FetchOptions) -> ConcurrentFetcher {
        ConcurrentFetcher::new(Arc::new(client), options)
    }

    #[tokio::test]
    async fn collects_bodies_keyed_by_url() {
        let client = StaticHttpClient::new()
            .with_body("https://feed.test/2023", "<a/>")
            .with_body("https://feed.test/2024", "<b/>");

        let bodies = fetcher(client, FetchOptions::default())
            .query(["https://feed.test/2023", "https://feed.test/2024"])
            .await
            .expect("both requests succeed");

        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies["https://feed.test/2024"], "<b/>");
    }

    #[tokio::test]
    async fn empty_batch_fails() {
        let error = fetcher(StaticHttpClient::new(), FetchOptions::default())
            .query(Vec::<String>::new())
            .await
            .expect_err("nothing to fetch");
        assert!(error.errors().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_kept_only_when_allowed() {
        let client = StaticHttpClient::new().with_response(
            "https://feed.test/2024",
            HttpResponse {
                status: 404,
                url: String::from("https://feed.test/2024"),
                body: String::from("not found"),
            },
        );

        let strict = fetcher(client.clone(), FetchOptions::default())
            .query(["https://feed.test/2024"])
            .await
            .expect_err("404 rejected");
        assert_eq!(strict.errors()[0].kind(), HttpErrorKind::Status);

        let lenient = fetcher(
            client,
            FetchOptions::default().with_fail_on_non_success_status(false),
        )
        .query(["https://feed.test/2024"])
        .await
        .expect("404 body kept");
        assert_eq!(lenient["https://feed.test/2024"], "not found");
    }

    #[tokio::test]
    async fn empty_bodies_are_not_collected() {
        let client = StaticHttpClient::new()
            .with_body("https://feed.test/empty", "")
            .with_body("https://feed.test/full", "data");

        let bodies = fetcher(client, FetchOptions::default())
            .query(["https://feed.test/empty", "https://feed.test/full"])
            .await
            .expect("one body arrives");

        assert_eq!(bodies.len(), 1);
        assert!(bodies.contains_key("https://feed.test/full"));
    }

    #[tokio::test]
    async fn effective_url_replaces_requested_url() {
        let client = StaticHttpClient::new().with_response(
            "http://feed.test/2024",
            HttpResponse::ok("https://mirror.feed.test/2024", "data"),
        );

        let bodies = fetcher(client, FetchOptions::default())
            .query(["http://feed.test/2024"])
            .await
            .expect("redirected body arrives");

        assert!(bodies.contains_key("https://mirror.feed.test/2024"));
    }

    #[test]
    fn default_options_follow_feed_conventions() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(1));
        assert_eq!(options.connect_timeout, Duration::from_secs(1));
        assert!(options.fail_on_non_success_status);

        let tuned = options.with_timeout_secs(5).with_connect_timeout_secs(2);
        assert_eq!(tuned.timeout, Duration::from_secs(5));
        assert_eq!(tuned.connect_timeout, Duration::from_secs(2));
    }
}
