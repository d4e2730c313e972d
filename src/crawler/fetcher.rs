//! Rate-limited HTTP page fetcher
//!
//! All network traffic in the pipeline goes through this fetcher so the
//! politeness contract holds globally: the governor rate limiter is awaited
//! before every request, success or failure, for both catalog crawling and
//! per-item enrichment. Requests are never retried here — a page that could
//! not be fetched is reported once and the caller decides what survives.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Outcome of a completed HTTP exchange
///
/// A 404 is carried here rather than raised as an error: callers that probe
/// for missing items treat it as an expected, recordable answer.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Decoded response body (empty for 404)
    pub body: String,
    /// HTTP status code
    pub status: u16,
}

impl FetchOutcome {
    /// True when the server reported the page missing
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Rate-limited page fetcher shared by crawler and enricher
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Fixed User-Agent override; rotates through [`USER_AGENTS`] when unset
    user_agent: Option<String>,

    /// Optional base URL override for testing with mock servers
    base_url: Option<String>,
}

impl PageFetcher {
    /// Create a new fetcher with default timeout (10 seconds)
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(requests_per_second, Duration::from_secs(10), None)
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `timeout` - Request timeout duration
    /// * `user_agent` - Fixed User-Agent, or `None` to rotate
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        timeout: Duration,
        user_agent: Option<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        let quota = Quota::per_second(rate);
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            user_agent,
            base_url: None,
        })
    }

    /// Create a new fetcher with a custom base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str, requests_per_second: u32) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(requests_per_second)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Fetch a page, applying the politeness throttle first
    ///
    /// Returns the decoded body and status. A 404 answer is a success-path
    /// [`FetchOutcome`] with an empty body; any other non-2xx status becomes
    /// `FetchError::Status`, and transport failures become
    /// `FetchError::Timeout` / `FetchError::Http` with no status attached.
    /// A URL that is not absolute is rejected as `FetchError::InvalidUrl`
    /// before any request is made.
    ///
    /// With a `base_url` override, the scheme and host of an absolute URL
    /// are replaced by the base (a bare path is appended as-is), so callers
    /// can keep real marketplace URLs when talking to a mock server.
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        // Wait for rate limiter before every attempt, regardless of outcome
        self.rate_limiter.until_ready().await;

        let full_url = match &self.base_url {
            Some(base) => match Url::parse(url) {
                Ok(parsed) => {
                    let mut rewritten = format!("{base}{}", parsed.path());
                    if let Some(query) = parsed.query() {
                        rewritten.push('?');
                        rewritten.push_str(query);
                    }
                    rewritten
                }
                Err(_) => format!("{base}{url}"),
            },
            None => Url::parse(url)
                .map_err(|_| FetchError::InvalidUrl(url.to_string()))?
                .into(),
        };

        let headers = self.build_headers(&full_url);

        let response = self
            .client
            .get(&full_url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();

        if status.as_u16() == 404 {
            return Ok(FetchOutcome {
                body: String::new(),
                status: 404,
            });
        }

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let status = status.as_u16();
        let body = response.text().await.map_err(FetchError::Http)?;

        Ok(FetchOutcome { body, status })
    }

    /// Build request headers with a rotating or fixed User-Agent
    fn build_headers(&self, url: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = match &self.user_agent {
            Some(ua) => ua.as_str(),
            None => USER_AGENTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(USER_AGENTS[0]),
        };

        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.8"));
        // Booth serves item pages more reliably with a same-site referer
        if let Ok(value) = HeaderValue::from_str(url) {
            headers.insert(REFERER, value);
        }

        headers
    }
}
