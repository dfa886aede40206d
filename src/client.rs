//! API client: request construction and dispatch.

use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONNECTION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::config::{ClientConfig, SecretString};
use crate::error::ClientError;
use crate::headers::ApiResponse;
use crate::http::{add_extra_headers, build_http_client, handle_error_response, is_failure_status};
use crate::stream::{StreamSession, Streamable};

/// Client for the GiteeAI (OpenAI-compatible) REST API.
///
/// # Example
/// ```no_run
/// use giteeai::model::{ChatCompletionMessage, ChatCompletionRequest, QWEN2_7B_INSTRUCT};
/// use giteeai::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), giteeai::ClientError> {
///     let client = Client::from_api_key("your-api-key")?;
///     let request = ChatCompletionRequest::new(
///         QWEN2_7B_INSTRUCT,
///         vec![ChatCompletionMessage::user("Hello!")],
///     );
///
///     let mut stream = client.create_chat_completion_stream(request).await?;
///     while let Some(event) = stream.recv().await? {
///         print!("{}", event.content().unwrap_or_default());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = build_http_client(&config)?;
        Ok(Self { config, http })
    }

    pub fn from_api_key(api_key: impl Into<SecretString>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(api_key))
    }

    /// Build a client from `GITEEAI_API_KEY` / `GITEEAI_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL for an endpoint path such as `/chat/completions`.
    pub fn full_url(&self, suffix: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), suffix)
    }

    /// Start a request with the auth and extra headers applied.
    pub(crate) fn request(&self, method: Method, suffix: &str) -> RequestBuilder {
        let mut req = self.http.request(method, self.full_url(suffix));
        if let Some(api_key) = &self.config.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()));
        }
        add_extra_headers(req, &self.config.extra_headers)
    }

    /// Send a request and decode a JSON body.
    pub(crate) async fn send_json<R: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<ApiResponse<R>, ClientError> {
        let response = req.header(ACCEPT, "application/json").send().await?;
        if is_failure_status(response.status()) {
            return Err(handle_error_response(response).await);
        }

        let headers = Arc::new(response.headers().clone());
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;
        Ok(ApiResponse { body, headers })
    }

    /// Send a request and hand its body to a [`StreamSession`].
    ///
    /// A failure status is reported here, before any session exists.
    pub(crate) async fn send_stream<T: Streamable>(
        &self,
        req: RequestBuilder,
    ) -> Result<StreamSession<T>, ClientError> {
        let response = req
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .header(CONNECTION, "keep-alive")
            .send()
            .await?;

        let status = response.status();
        if is_failure_status(status) {
            return Err(handle_error_response(response).await);
        }

        debug!(%status, url = %response.url(), "stream opened");
        Ok(StreamSession::from_response(
            response,
            self.config.empty_messages_limit,
        ))
    }
}
