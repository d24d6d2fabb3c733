pub mod ask;
pub mod config_cmd;
pub mod ingest;
pub mod serve;

use readchat_config::AppConfig;

/// Load the configuration, turning load failures into a readable message.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Commands that talk to the model stop here without a credential.
pub fn require_api_key(config: &AppConfig) {
    if !config.has_api_key() {
        eprintln!("OPENAI_API_KEY is not set");
        std::process::exit(1);
    }
}
