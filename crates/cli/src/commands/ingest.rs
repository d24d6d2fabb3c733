//! `readchat ingest`: Show what a reading history CSV yields.

use std::path::Path;

pub fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(file).map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let books = readchat_ingest::ingest_csv(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&books)?);
    Ok(())
}
