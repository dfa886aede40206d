//! # giteeai - GiteeAI API client
//!
//! An async client for the GiteeAI text/image generation API, which follows
//! the OpenAI REST surface.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Typed request/response models
//! - Streaming chat and text completions over Server-Sent Events
//! - Structured API errors with the HTTP status attached
//!
//! ## Streaming
//!
//! Streaming endpoints return a [`StreamSession`]. Each call to
//! [`StreamSession::recv`] reads from the connection until one event is
//! decoded, so the server is only read as fast as the caller consumes.
//! `Ok(None)` marks the end of the stream; after that, or after any error,
//! the session is sealed and the connection released.
//!
//! Error bodies that arrive on a streaming connection without SSE framing are
//! collected and surfaced as [`ClientError::Api`], and a server that only
//! sends keep-alive lines is cut off after
//! [`ClientConfig::empty_messages_limit`](config::ClientConfig) of them.
//!
//! ## Example
//! ```no_run
//! use giteeai::model::{ChatCompletionMessage, ChatCompletionRequest, QWEN2_7B_INSTRUCT};
//! use giteeai::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig::new("your-api-key"))?;
//!
//!     let request = ChatCompletionRequest::new(
//!         QWEN2_7B_INSTRUCT,
//!         vec![ChatCompletionMessage::user("Hello!")],
//!     );
//!
//!     let response = client.create_chat_completion(request).await?;
//!     println!("{}", response.choices[0].message.content);
//!     Ok(())
//! }
//! ```

pub mod accumulator;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod model;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use api::chat::ChatCompletionStream;
pub use api::completion::CompletionStream;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, RequestError};
pub use headers::{ApiResponse, RateLimitHeaders};
pub use stream::{StreamEvent, StreamSession, Streamable};
