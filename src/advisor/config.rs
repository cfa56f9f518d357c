// SPDX-License-Identifier: MIT

//! Runtime configuration read from the environment (after `.env` is loaded)

use crate::adk::error::AdvisorError;
use crate::adk::model::GenerationConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub google_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub model: String,
    pub fallback_model: String,
    pub embedding_model: String,
    pub index_dir: PathBuf,
    /// Passages requested from the course index
    pub top_k: usize,
    /// Results requested from web search
    pub web_results: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on any single collaborator call
    pub timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            tavily_api_key: None,
            model: "gemini-2.5-flash".to_string(),
            fallback_model: "gemini-1.0-pro".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            index_dir: PathBuf::from("course_index"),
            top_k: 4,
            web_results: 3,
            temperature: 0.1,
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self, AdvisorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdvisorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            google_api_key: non_empty("GOOGLE_API_KEY"),
            tavily_api_key: non_empty("TAVILY_API_KEY"),
            model: non_empty("INTELLICOURSE_MODEL").unwrap_or(defaults.model),
            fallback_model: non_empty("INTELLICOURSE_FALLBACK_MODEL")
                .unwrap_or(defaults.fallback_model),
            embedding_model: non_empty("INTELLICOURSE_EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            index_dir: non_empty("INTELLICOURSE_INDEX_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_dir),
            top_k: parse_positive(&lookup, "INTELLICOURSE_TOP_K", defaults.top_k)?,
            web_results: parse_positive(
                &lookup,
                "INTELLICOURSE_WEB_RESULTS",
                defaults.web_results,
            )?,
            temperature: parse_var(&lookup, "INTELLICOURSE_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_var(&lookup, "INTELLICOURSE_MAX_TOKENS", defaults.max_tokens)?,
            timeout: Duration::from_secs(parse_positive(
                &lookup,
                "INTELLICOURSE_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
        })
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.temperature),
            max_output_tokens: Some(self.max_tokens),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AdvisorError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AdvisorError::config(format!("{} has invalid value '{}'", key, raw))),
    }
}

/// Like [`parse_var`], but zero is rejected.
fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AdvisorError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let value = parse_var(lookup, key, default)?;
    if value <= T::default() {
        return Err(AdvisorError::config(format!(
            "{} must be greater than zero",
            key
        )));
    }
    Ok(value)
}
