//! Behavior-driven tests for the concurrent fetcher
//!
//! These tests verify HOW a fetch batch behaves when some or all of its
//! requests fail, time out or succeed.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use prodcal_core::{
    ConcurrentFetcher, FetchError, FetchOptions, HttpClient, HttpError, HttpErrorKind,
    HttpRequest, HttpResponse, ReqwestHttpClient,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Transport that answers each URL after a scripted delay.
struct DelayedClient {
    routes: HashMap<String, (Duration, Result<HttpResponse, HttpError>)>,
}

impl DelayedClient {
    fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    fn answer(mut self, url: &str, delay: Duration, body: &str) -> Self {
        self.routes
            .insert(url.to_owned(), (delay, Ok(HttpResponse::ok(url, body))));
        self
    }

    fn refuse(mut self, url: &str) -> Self {
        self.routes.insert(
            url.to_owned(),
            (
                Duration::ZERO,
                Err(HttpError::new(HttpErrorKind::Connect, url, "connection refused")),
            ),
        );
        self
    }
}

impl HttpClient for DelayedClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let Some((delay, outcome)) = self.routes.get(&request.url) else {
                return Err(HttpError::new(
                    HttpErrorKind::Connect,
                    request.url,
                    "no route to host",
                ));
            };
            tokio::time::sleep(*delay).await;
            outcome.clone()
        })
    }
}

fn fast_options() -> FetchOptions {
    FetchOptions {
        timeout: Duration::from_millis(200),
        connect_timeout: Duration::from_millis(200),
        fail_on_non_success_status: true,
    }
}

// =============================================================================
// Partial failure
// =============================================================================

#[tokio::test]
async fn when_one_request_succeeds_and_two_time_out_the_batch_returns_one_body() {
    // Given: One fast year and two years slower than the timeout
    let client = DelayedClient::new()
        .answer("https://feed.test/2022", Duration::from_millis(10), "2022")
        .answer("https://feed.test/2023", Duration::from_secs(30), "2023")
        .answer("https://feed.test/2024", Duration::from_secs(30), "2024");
    let fetcher = ConcurrentFetcher::new(Arc::new(client), fast_options());

    // When: All three are fetched
    let started = Instant::now();
    let bodies = fetcher
        .query([
            "https://feed.test/2022",
            "https://feed.test/2023",
            "https://feed.test/2024",
        ])
        .await
        .expect("one success is enough");

    // Then: Exactly the fast body arrives and slow requests were abandoned
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies["https://feed.test/2022"], "2022");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn when_every_request_fails_the_batch_fails_with_each_message() {
    let client = DelayedClient::new()
        .refuse("https://feed.test/2022")
        .answer("https://feed.test/2023", Duration::from_secs(30), "late");
    let fetcher = ConcurrentFetcher::new(Arc::new(client), fast_options());

    let error = fetcher
        .query([
            "https://feed.test/2022",
            "https://feed.test/2023",
            "https://feed.test/2024",
        ])
        .await
        .expect_err("nothing arrived");

    let FetchError::FetchFailed { errors } = &error;
    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors
            .iter()
            .filter(|e| e.kind() == HttpErrorKind::Timeout)
            .count(),
        1
    );
    let message = error.to_string();
    assert!(message.contains("connection refused"));
    assert!(message.contains("no route to host"));
}

#[tokio::test]
async fn when_requests_run_concurrently_latency_does_not_add_up() {
    // Given: Five requests that each take 150 ms
    let mut client = DelayedClient::new();
    let urls: Vec<String> = (2020..2025)
        .map(|year| format!("https://feed.test/{year}"))
        .collect();
    for url in &urls {
        client = client.answer(url, Duration::from_millis(150), "ok");
    }
    let options = FetchOptions {
        timeout: Duration::from_secs(2),
        ..fast_options()
    };
    let fetcher = ConcurrentFetcher::new(Arc::new(client), options);

    // When
    let started = Instant::now();
    let bodies = fetcher.query(urls).await.expect("all succeed");

    // Then: The batch takes about one request, not five
    assert_eq!(bodies.len(), 5);
    assert!(started.elapsed() < Duration::from_millis(700));
}

// =============================================================================
// Real transport
// =============================================================================

async fn serve_once(listener: TcpListener, status_line: &'static str, body: &'static str) {
    if let Ok((mut socket, _)) = listener.accept().await {
        let mut buffer = [0_u8; 2048];
        let _ = socket.read(&mut buffer).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/xml\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    }
}

fn loopback_client(options: &FetchOptions) -> ReqwestHttpClient {
    let client = reqwest::Client::builder()
        .no_proxy()
        .connect_timeout(options.connect_timeout)
        .build()
        .expect("reqwest client");
    ReqwestHttpClient::with_client(client)
}

#[tokio::test]
async fn when_reqwest_transport_is_used_bodies_are_keyed_by_effective_url() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let address = listener.local_addr().expect("local address");
    let server = tokio::spawn(serve_once(listener, "200 OK", "<calendar year=\"2024\"/>"));

    let options = FetchOptions {
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        fail_on_non_success_status: true,
    };
    let fetcher = ConcurrentFetcher::new(Arc::new(loopback_client(&options)), options);
    let url = format!("http://{address}/2024/calendar.xml");

    let bodies = fetcher.query([url.clone()]).await.expect("loopback reachable");
    server.await.expect("server task");

    assert_eq!(bodies.get(&url).map(String::as_str), Some("<calendar year=\"2024\"/>"));
}

#[tokio::test]
async fn when_server_answers_with_an_error_status_the_request_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let address = listener.local_addr().expect("local address");
    let server = tokio::spawn(serve_once(listener, "404 Not Found", "missing"));

    let options = FetchOptions {
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        fail_on_non_success_status: true,
    };
    let fetcher = ConcurrentFetcher::new(Arc::new(loopback_client(&options)), options);

    let error = fetcher
        .query([format!("http://{address}/2030/calendar.xml")])
        .await
        .expect_err("404 rejected");
    server.await.expect("server task");

    assert_eq!(error.errors()[0].kind(), HttpErrorKind::Status);
}
