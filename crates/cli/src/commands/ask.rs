//! `readchat ask`: One question about a reading history CSV.

use readchat_agent::{ReadingAssistant, SessionContext};
use readchat_core::message::SessionId;
use std::path::Path;
use tracing::debug;

pub async fn run(
    csv: &Path,
    session: Option<String>,
    question: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    super::require_api_key(&config);

    let bytes = std::fs::read(csv).map_err(|e| format!("Failed to read {}: {e}", csv.display()))?;

    let provider = readchat_providers::build_from_config(&config)?;
    let history = readchat_memory::build_from_config(&config.memory);
    let assistant = ReadingAssistant::from_config(&config, provider, history);

    let mut context = match session {
        Some(id) => SessionContext::with_id(SessionId(id)),
        None => SessionContext::new(),
    };
    debug!(session = %context.id, "Using session");

    let shelf = assistant.upload(&mut context, &bytes)?;
    eprintln!("  Loaded {} book(s)", shelf.len());

    eprint!("  Thinking...");
    let answer = assistant.ask(&context, question).await;
    eprint!("\r              \r");

    match answer? {
        Some(answer) => println!("{answer}"),
        None => eprintln!("  Empty question, nothing to ask"),
    }

    Ok(())
}
