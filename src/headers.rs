//! Response metadata carried alongside decoded bodies.

use std::ops::Deref;
use std::sync::Arc;

use reqwest::header::HeaderMap;

/// A decoded response body together with the headers it arrived with.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub body: T,
    pub headers: Arc<HeaderMap>,
}

impl<T> ApiResponse<T> {
    pub fn into_body(self) -> T {
        self.body
    }

    pub fn rate_limit(&self) -> RateLimitHeaders {
        RateLimitHeaders::from_headers(&self.headers)
    }
}

impl<T> Deref for ApiResponse<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.body
    }
}

/// Rate limit information from `x-ratelimit-*` response headers.
///
/// Missing or malformed numeric headers read as zero; reset values are kept
/// verbatim (e.g. `"6m0s"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit_requests: u64,
    pub limit_tokens: u64,
    pub remaining_requests: u64,
    pub remaining_tokens: u64,
    pub reset_requests: String,
    pub reset_tokens: String,
}

impl RateLimitHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let number = |name: &str| text(name).parse::<u64>().unwrap_or(0);

        Self {
            limit_requests: number("x-ratelimit-limit-requests"),
            limit_tokens: number("x-ratelimit-limit-tokens"),
            remaining_requests: number("x-ratelimit-remaining-requests"),
            remaining_tokens: number("x-ratelimit-remaining-tokens"),
            reset_requests: text("x-ratelimit-reset-requests"),
            reset_tokens: text("x-ratelimit-reset-tokens"),
        }
    }
}
