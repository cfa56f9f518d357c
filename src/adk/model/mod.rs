// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and its Gemini implementation
//!
//! - [gemini] - Google's Gemini API
//! - [provider] - primary/fallback model selection from configuration

pub mod gemini;
pub mod provider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Parts of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Thinking/reasoning content from thinking models, never part of an answer
    Thinking(String),
}

impl Content {
    /// A single-part user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A single-part model message
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text of all `Text` parts. Thinking parts are skipped.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Thinking(_) => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Core trait for LLM model implementations
///
/// Implementations normalize whatever their backend returns into [`Content`]
/// so callers only ever deal with text parts.
#[async_trait]
pub trait Model: Send + Sync {
    /// Name of the underlying model, used for logging
    fn model_name(&self) -> &str;

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, Box<dyn Error + Send + Sync>>;
}
