//! LLM provider implementations for readchat.
//!
//! All providers implement the `readchat_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use readchat_config::AppConfig;
use readchat_core::error::ProviderError;
use std::sync::Arc;

/// Build the configured chat provider.
///
/// Fails with `NotConfigured` when no API key is available.
pub fn build_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn readchat_core::Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("OPENAI_API_KEY is not set".into()))?;
    Ok(Arc::new(OpenAiCompatProvider::new(
        "openai",
        &config.api_url,
        api_key,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use readchat_core::Provider;

    #[test]
    fn missing_key_is_not_configured() {
        let err = build_from_config(&AppConfig::default()).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn builds_with_key() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
