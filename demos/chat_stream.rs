//! Streaming chat example.
//!
//! Requires `GITEEAI_API_KEY`. Press Ctrl-C to cancel mid-stream.
//!
//! Run with: `cargo run --example chat_stream`

use std::io::Write;

use giteeai::model::{ChatCompletionMessage, ChatCompletionRequest, QWEN2_7B_INSTRUCT};
use giteeai::Client;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    let request = ChatCompletionRequest::new(
        QWEN2_7B_INSTRUCT,
        vec![
            ChatCompletionMessage::system("you are a helpful chatbot"),
            ChatCompletionMessage::user("Write a haiku about the sea."),
        ],
    );

    let token = CancellationToken::new();
    let on_ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut stream = client
        .create_chat_completion_stream(request)
        .await?
        .with_cancellation(token);

    println!("Streaming response:");
    println!("---------------------");

    while let Some(event) = stream.recv().await? {
        if let Some(content) = event.content() {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    println!();

    Ok(())
}
