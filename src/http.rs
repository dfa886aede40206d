//! HTTP client utilities.
//!
//! Client construction, extra headers and failure-status handling shared by
//! the JSON and streaming request paths.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::HashMap;

use crate::config::ClientConfig;
use crate::error::{error_from_body, ClientError};

/// Build a configured HTTP client from the client configuration.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(config: &ClientConfig) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ClientError::Config(format!("invalid proxy {proxy_url}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Add extra headers to a request if specified in the configuration.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// Anything outside `200..400` is a failure.
pub fn is_failure_status(status: StatusCode) -> bool {
    status.as_u16() < 200 || status.as_u16() >= 400
}

/// Read the body of a failed response and turn it into an error.
pub async fn handle_error_response(response: Response) -> ClientError {
    let status = response.status();
    match response.bytes().await {
        Ok(body) => error_from_body(status, &body),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_http_client() {
        let config = ClientConfig::new("test").with_timeout(Duration::from_secs(30));
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let config = ClientConfig::new("test").with_proxy("http://proxy.example.com:8080".to_string());
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_build_http_client_with_bad_proxy() {
        let config = ClientConfig::new("test").with_proxy("http://[::1".to_string());
        assert!(matches!(build_http_client(&config), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_is_failure_status() {
        assert!(!is_failure_status(StatusCode::OK));
        assert!(!is_failure_status(StatusCode::NO_CONTENT));
        assert!(!is_failure_status(StatusCode::FOUND));
        assert!(is_failure_status(StatusCode::CONTINUE));
        assert!(is_failure_status(StatusCode::BAD_REQUEST));
        assert!(is_failure_status(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
