//! Chat completions: `POST /chat/completions`.

use reqwest::Method;

use crate::client::Client;
use crate::error::ClientError;
use crate::headers::ApiResponse;
use crate::model::{ChatCompletionRequest, ChatCompletionResponse, ChatCompletionStreamResponse};
use crate::stream::StreamSession;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Stream of chat completion chunks.
pub type ChatCompletionStream = StreamSession<ChatCompletionStreamResponse>;

impl Client {
    /// Create a chat completion and wait for the whole response.
    ///
    /// Requests with `stream` set are rejected; use
    /// [`create_chat_completion_stream`](Self::create_chat_completion_stream).
    pub async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ApiResponse<ChatCompletionResponse>, ClientError> {
        if request.stream {
            return Err(ClientError::StreamNotSupported);
        }

        let req = self
            .request(Method::POST, CHAT_COMPLETIONS_PATH)
            .json(&request);
        self.send_json(req).await
    }

    /// Create a chat completion and receive it as a stream of deltas.
    pub async fn create_chat_completion_stream(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, ClientError> {
        request.stream = true;

        let req = self
            .request(Method::POST, CHAT_COMPLETIONS_PATH)
            .json(&request);
        self.send_stream(req).await
    }
}
