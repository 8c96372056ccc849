//! The fetch transport: an object-safe trait plus the HTTP implementation and an
//! in-memory mock for tests.
//!
//! Failures are classified through [`SmpError`] so the scheduler can apply its
//! per-resource policy: `NotFound` for 4xx responses (skippable), `Timeout` /
//! `RetriesExhausted` / `NetworkError` for the I/O category. Retryable failures back off
//! exponentially inside the transport; callers see only the final outcome.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use smpack_core::{Blob, SmpError};
use std::time::Duration;
use tokio::time::sleep;

/// A fetched resource: the body plus the `Content-Type` header, if any.
#[derive(Clone, Debug)]
pub struct FetchResponse {
	pub body: Blob,
	pub content_type: Option<String>,
}

/// Capability to fetch a URL into bytes. Object-safe so the pipeline can run against a
/// mock transport in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
	async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// HTTP transport backed by `reqwest` with keepalive, per-fetch timeout, and bounded
/// exponential-backoff retries.
#[derive(Debug)]
pub struct HttpFetcher {
	client: Client,
	retries: u32,
}

impl HttpFetcher {
	pub fn new(timeout: Duration, retries: u32) -> Result<HttpFetcher> {
		let client = Client::builder()
			.tcp_keepalive(Duration::from_secs(600))
			.timeout(timeout)
			.use_rustls_tls()
			.build()?;
		Ok(HttpFetcher { client, retries })
	}
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
	err.is_connect() || err.is_timeout() || err.is_body()
}

#[async_trait]
impl Fetcher for HttpFetcher {
	async fn fetch(&self, url: &str) -> Result<FetchResponse> {
		for attempt in 0..=self.retries {
			if attempt > 0 {
				let backoff = Duration::from_secs(1 << (attempt - 1));
				log::warn!("retry attempt {attempt}/{} fetching '{url}', waiting {backoff:?}", self.retries);
				sleep(backoff).await;
			}

			let response = match self.client.get(url).send().await {
				Ok(response) => response,
				Err(e) if e.is_timeout() => {
					if attempt < self.retries {
						log::warn!("timeout fetching '{url}': {e}");
						continue;
					}
					return Err(SmpError::Timeout(url.to_string()).into());
				}
				Err(e) if is_retryable_error(&e) => {
					if attempt < self.retries {
						log::warn!("retryable error fetching '{url}': {e}");
						continue;
					}
					return Err(SmpError::RetriesExhausted(format!("{url}: {e}")).into());
				}
				Err(e) => return Err(SmpError::NetworkError(format!("{url}: {e}")).into()),
			};

			let status = response.status();
			if status.is_client_error() {
				return Err(SmpError::NotFound(format!("{url} returned {status}")).into());
			}
			if status.is_server_error() {
				if attempt < self.retries {
					log::warn!("server error {status} fetching '{url}'");
					continue;
				}
				return Err(SmpError::RetriesExhausted(format!("{url} returned {status}")).into());
			}
			if status != StatusCode::OK {
				return Err(SmpError::NetworkError(format!("{url} returned unexpected {status}")).into());
			}

			let content_type = response
				.headers()
				.get(header::CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_string);

			match response.bytes().await {
				Ok(bytes) => {
					return Ok(FetchResponse {
						body: Blob::from(bytes.to_vec()),
						content_type,
					});
				}
				Err(e) if attempt < self.retries => {
					log::warn!("body read failed for '{url}': {e}");
					continue;
				}
				Err(e) => return Err(SmpError::RetriesExhausted(format!("{url}: {e}")).into()),
			}
		}
		Err(SmpError::RetriesExhausted(url.to_string()).into())
	}
}

/// In-memory transport for tests: a URL → response map plus a request log.
#[derive(Default)]
pub struct MockFetcher {
	responses: std::collections::HashMap<String, FetchResponse>,
	requests: std::sync::Mutex<Vec<String>>,
}

impl MockFetcher {
	pub fn new() -> MockFetcher {
		MockFetcher::default()
	}

	/// Registers a response for a URL.
	pub fn insert(&mut self, url: &str, body: impl Into<Blob>, content_type: Option<&str>) {
		self.responses.insert(
			url.to_string(),
			FetchResponse {
				body: body.into(),
				content_type: content_type.map(str::to_string),
			},
		);
	}

	/// Returns every URL fetched so far, in request order.
	pub fn requests(&self) -> Vec<String> {
		self.requests.lock().expect("request log").clone()
	}
}

#[async_trait]
impl Fetcher for MockFetcher {
	async fn fetch(&self, url: &str) -> Result<FetchResponse> {
		self.requests.lock().expect("request log").push(url.to_string());
		match self.responses.get(url) {
			Some(response) => Ok(response.clone()),
			None => Err(SmpError::NotFound(format!("{url} returned 404 Not Found")).into()),
		}
	}
}
