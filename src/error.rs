//! Error types shared by the request helpers and the streaming layer.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during client operations.
///
/// The enum is `Clone` so a sealed stream can hand its terminal error back on
/// every later receive; sources that are not `Clone` are held behind an `Arc`.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(Arc<reqwest::Error>),

    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(Arc<serde_json::Error>),

    /// A `data:` payload that could not be decoded into the expected shape.
    #[error("error, unmarshal stream payload {payload:?}: {source}")]
    Decode {
        payload: String,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("stream has sent too many empty messages (limit {limit})")]
    TooManyEmptyStreamMessages { limit: usize },

    #[error("Stream cancelled")]
    StreamCancelled,

    #[error("Stream closed")]
    StreamClosed,

    #[error("streaming is not supported with this method, please use the stream variant")]
    StreamNotSupported,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(Arc::new(e))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Json(Arc::new(e))
    }
}

/// Error envelope returned by the API: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Structured error reported by the server.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiError {
    /// Either a string or a number depending on the backend.
    #[serde(default)]
    pub code: Option<Value>,

    #[serde(deserialize_with = "deserialize_message")]
    pub message: String,

    #[serde(default)]
    pub param: Option<String>,

    #[serde(rename = "type", default)]
    pub error_type: String,

    /// Status line, injected after parsing, e.g. `"429 Too Many Requests"`.
    #[serde(skip)]
    pub http_status: String,

    #[serde(skip)]
    pub http_status_code: u16,
}

impl ApiError {
    /// Attach the HTTP status of the response this error arrived on.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.http_status = status_line(status);
        self.http_status_code = status.as_u16();
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.http_status_code > 0 {
            write!(
                f,
                "error, status code: {}, status: {}, message: {}",
                self.http_status_code, self.http_status, self.message
            )
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for ApiError {}

// Some backends send `message` as a list of strings.
fn deserialize_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Message {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Message::deserialize(deserializer)? {
        Message::One(message) => message,
        Message::Many(messages) => messages.into_iter().join(", "),
    })
}

/// Fallback error for a failed response whose body is not a recognizable
/// error envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestError {
    pub http_status: String,
    pub http_status_code: u16,
    /// Why the body could not be turned into an [`ApiError`].
    pub reason: String,
    pub body: Vec<u8>,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error, status code: {}, status: {}, message: {}, body: {}",
            self.http_status_code,
            self.http_status,
            self.reason,
            String::from_utf8_lossy(&self.body)
        )
    }
}

impl std::error::Error for RequestError {}

/// Render a status the way it appears on the status line.
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Turn a failed response body into the most specific error available.
///
/// A parseable envelope yields [`ClientError::Api`] with the status injected;
/// anything else yields [`ClientError::Request`] carrying the raw bytes.
pub fn error_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    let http_status = status_line(status);
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: Some(api_error),
        }) => ClientError::Api(api_error.with_status(status)),
        Ok(ErrorResponse { error: None }) => ClientError::Request(RequestError {
            http_status,
            http_status_code: status.as_u16(),
            reason: "response body has no error object".to_string(),
            body: body.to_vec(),
        }),
        Err(e) => ClientError::Request(RequestError {
            http_status,
            http_status_code: status.as_u16(),
            reason: e.to_string(),
            body: body.to_vec(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_body_parses_envelope() {
        let body = br#"{"error":{"message":"rate limited","type":"requests","code":"rate_limit_exceeded"}}"#;
        match error_from_body(StatusCode::TOO_MANY_REQUESTS, body) {
            ClientError::Api(e) => {
                assert_eq!(e.message, "rate limited");
                assert_eq!(e.error_type, "requests");
                assert_eq!(e.code, Some(Value::String("rate_limit_exceeded".into())));
                assert_eq!(e.http_status_code, 429);
                assert_eq!(e.http_status, "429 Too Many Requests");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_body_numeric_code_and_message_list() {
        let body = br#"{"error":{"message":["first","second"],"type":"invalid","code":400}}"#;
        let ClientError::Api(e) = error_from_body(StatusCode::BAD_REQUEST, body) else {
            panic!("expected api error");
        };
        assert_eq!(e.message, "first, second");
        assert_eq!(e.code, Some(Value::from(400)));
    }

    #[test]
    fn test_error_from_body_falls_back_to_request_error() {
        let body = b"<html>bad gateway</html>";
        let ClientError::Request(e) = error_from_body(StatusCode::BAD_GATEWAY, body) else {
            panic!("expected request error");
        };
        assert_eq!(e.http_status_code, 502);
        assert_eq!(e.body, body.to_vec());
        assert!(e.to_string().contains("<html>bad gateway</html>"));
    }

    #[test]
    fn test_error_from_body_without_error_object() {
        let ClientError::Request(e) = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, b"{}")
        else {
            panic!("expected request error");
        };
        assert_eq!(e.reason, "response body has no error object");
    }

    #[test]
    fn test_api_error_display() {
        let mut e = ApiError {
            code: None,
            message: "boom".to_string(),
            param: None,
            error_type: String::new(),
            http_status: String::new(),
            http_status_code: 0,
        };
        assert_eq!(e.to_string(), "boom");

        e.http_status = "500 Internal Server Error".to_string();
        e.http_status_code = 500;
        assert_eq!(
            e.to_string(),
            "error, status code: 500, status: 500 Internal Server Error, message: boom"
        );
    }
}
