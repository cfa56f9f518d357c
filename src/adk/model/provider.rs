// SPDX-License-Identifier: MIT

//! Model provider - picks the Gemini model the advisor talks to

use super::gemini::GeminiModel;
use super::Model;
use crate::adk::error::{AdvisorError, ModelError};
use std::sync::Arc;

/// Build the Gemini model, substituting `fallback` when `primary` fails to initialize.
pub fn build_gemini(
    api_key: Option<&str>,
    primary: &str,
    fallback: &str,
) -> Result<Arc<dyn Model>, AdvisorError> {
    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ModelError::ApiKeyMissing("Gemini (set GOOGLE_API_KEY)".to_string()))?;

    log::info!("Initializing Gemini model: {}", primary);
    match GeminiModel::new(primary, api_key) {
        Ok(model) => {
            log::info!("{} initialized successfully", primary);
            Ok(Arc::new(model))
        }
        Err(e) => {
            log::warn!("Error initializing {}: {}", primary, e);
            log::info!("Trying fallback: {}", fallback);
            let model = GeminiModel::new(fallback, api_key)
                .map_err(|e2| AdvisorError::config(format!("Both Gemini models failed: {}", e2)))?;
            Ok(Arc::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_model_error() {
        let err = build_gemini(None, "gemini-2.5-flash", "gemini-1.0-pro")
            .err()
            .unwrap();
        assert!(matches!(err, AdvisorError::Model(ModelError::ApiKeyMissing(_))));
    }

    #[test]
    fn test_blank_key_is_model_error() {
        assert!(build_gemini(Some(""), "gemini-2.5-flash", "gemini-1.0-pro").is_err());
    }

    #[test]
    fn test_primary_used_when_valid() {
        let model = build_gemini(Some("key"), "gemini-2.5-flash", "gemini-1.0-pro").unwrap();
        assert_eq!(model.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_fallback_substituted_on_primary_failure() {
        let model = build_gemini(Some("key"), "not-a-model", "gemini-1.0-pro").unwrap();
        assert_eq!(model.model_name(), "gemini-1.0-pro");
    }

    #[test]
    fn test_both_models_failing_is_config_error() {
        let err = build_gemini(Some("key"), "bad-one", "bad-two").err().unwrap();
        assert!(err.to_string().contains("Both Gemini models failed"));
    }
}
