// SPDX-License-Identifier: MIT

//! Gemini Model - Google's Gemini API implementation

use super::{Content, GenerationConfig, Model, Part};
use crate::adk::error::{AdvisorError, ModelError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::error::Error;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini model implementation
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model_name: String,
}

impl GeminiModel {
    /// Create a new GeminiModel
    ///
    /// Fails when the key is blank or the model id is not a Gemini model.
    pub fn new(
        model_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let model_name = model_name.into();
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ModelError::ApiKeyMissing("Gemini".to_string()));
        }
        if !model_name.starts_with("gemini-") {
            return Err(ModelError::UnsupportedModel(model_name));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
        })
    }
}

#[async_trait]
impl Model for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, Box<dyn Error + Send + Sync>> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model_name, self.api_key
        );

        let contents: Vec<Value> = history
            .iter()
            .map(|c| {
                let parts: Vec<Value> = c.parts.iter().filter_map(part_to_gemini_json).collect();
                json!({ "role": c.role, "parts": parts })
            })
            .collect();

        let mut body = json!({ "contents": contents });
        if let Some(config) = config {
            body["generationConfig"] = generation_config_json(config);
        }

        log::debug!(
            "Gemini request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self.client.post(&url).json(&body).send().await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ModelError::RateLimited { retry_after_secs }.into());
        }

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(AdvisorError::api("Gemini", text).into());
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("Gemini response: {}", resp_json);

        parse_gemini_response(&resp_json).map_err(Into::into)
    }
}

/// Serialize a Part to Gemini API JSON format
/// Returns None for parts that shouldn't be sent (e.g., Thinking)
pub fn part_to_gemini_json(part: &Part) -> Option<Value> {
    match part {
        Part::Text(t) => Some(json!({ "text": t })),
        Part::Thinking(_) => None,
    }
}

fn generation_config_json(config: &GenerationConfig) -> Value {
    let mut out = json!({});
    if let Some(t) = config.temperature {
        out["temperature"] = json!(t);
    }
    if let Some(m) = config.max_output_tokens {
        out["maxOutputTokens"] = json!(m);
    }
    out
}

/// Parse a full `generateContent` response body into model Content
pub fn parse_gemini_response(resp_json: &Value) -> Result<Content, ModelError> {
    let candidate = resp_json["candidates"]
        .as_array()
        .and_then(|c| c.first())
        .ok_or_else(|| ModelError::InvalidResponse("No candidates in response".to_string()))?;

    if let Some(finish_reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
        log::debug!("Gemini finish reason: {}", finish_reason);
        if finish_reason == "SAFETY" {
            return Err(ModelError::InvalidResponse(
                "Gemini blocked response due to safety filters.".to_string(),
            ));
        }
    }

    let parts_json = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            log::error!("No content parts in candidate: {}", candidate);
            ModelError::InvalidResponse(format!("No content in Gemini response: {}", candidate))
        })?;

    Ok(Content {
        role: "model".to_string(),
        parts: parts_json.iter().map(parse_gemini_part).collect(),
    })
}

/// Normalize one response part into a Part.
///
/// Structured parts yield their `text` field, bare strings are used as-is,
/// and anything else falls back to its JSON string representation.
pub fn parse_gemini_part(p: &Value) -> Part {
    match p {
        Value::Object(obj) => match obj.get("text").and_then(|t| t.as_str()) {
            Some(text) if obj.get("thought").and_then(|t| t.as_bool()) == Some(true) => {
                Part::Thinking(text.to_string())
            }
            Some(text) => Part::Text(text.to_string()),
            None => Part::Text(p.to_string()),
        },
        Value::String(s) => Part::Text(s.clone()),
        other => Part::Text(other.to_string()),
    }
}
