//! Plain text completion example.
//!
//! Run with: `GITEEAI_API_KEY=... cargo run --example completion`

use giteeai::model::{CompletionRequest, QWEN2_7B_INSTRUCT};
use giteeai::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::from_env()?;

    let mut request = CompletionRequest::new(QWEN2_7B_INSTRUCT, "Lorem ipsum");
    request.max_tokens = Some(5);

    match client.create_completion(request).await {
        Ok(response) => println!("{}", response.choices[0].text),
        Err(e) => eprintln!("Completion error: {e}"),
    }

    Ok(())
}
