//! Text completions: `POST /completions`.

use reqwest::Method;

use crate::client::Client;
use crate::error::ClientError;
use crate::headers::ApiResponse;
use crate::model::{CompletionRequest, CompletionResponse};
use crate::stream::StreamSession;

const COMPLETIONS_PATH: &str = "/completions";

/// Stream of text completion chunks.
pub type CompletionStream = StreamSession<CompletionResponse>;

impl Client {
    /// Create a text completion.
    ///
    /// Requests with `stream` set are rejected; use
    /// [`create_completion_stream`](Self::create_completion_stream).
    pub async fn create_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<ApiResponse<CompletionResponse>, ClientError> {
        if request.stream {
            return Err(ClientError::StreamNotSupported);
        }

        let req = self.request(Method::POST, COMPLETIONS_PATH).json(&request);
        self.send_json(req).await
    }

    pub async fn create_completion_stream(
        &self,
        mut request: CompletionRequest,
    ) -> Result<CompletionStream, ClientError> {
        request.stream = true;

        let req = self.request(Method::POST, COMPLETIONS_PATH).json(&request);
        self.send_stream(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_completion_rejects_stream_flag() {
        let client = Client::from_api_key("dummy").unwrap();
        let mut request = CompletionRequest::new("qwen2-7b-instruct", "Lorem ipsum");
        request.stream = true;

        let result = client.create_completion(request).await;
        assert!(matches!(result, Err(ClientError::StreamNotSupported)));
    }
}
