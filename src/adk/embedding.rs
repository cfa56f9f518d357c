// SPDX-License-Identifier: MIT

//! Embedding seam used to place a query in the same vector space as the
//! persisted course index.

use crate::adk::error::{AdvisorError, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::error::Error;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Box<dyn Error + Send + Sync>>;
}

/// Gemini `embedContent` client
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    model_name: String,
}

impl GeminiEmbedder {
    pub fn new(
        model_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ModelError::ApiKeyMissing("Gemini embeddings".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model_name: model_name.into(),
        })
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Box<dyn Error + Send + Sync>> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:embedContent?key={}",
            self.model_name, self.api_key
        );
        let body = json!({
            "model": format!("models/{}", self.model_name),
            "content": { "parts": [{ "text": text }] }
        });

        let resp = self.client.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(AdvisorError::api("Gemini embeddings", text).into());
        }

        let resp_json: Value = resp.json().await?;
        Ok(parse_embedding(&resp_json)?)
    }
}

fn parse_embedding(resp_json: &Value) -> Result<Vec<f32>, ModelError> {
    let values = resp_json["embedding"]["values"]
        .as_array()
        .ok_or_else(|| ModelError::InvalidResponse("missing embedding.values".to_string()))?;
    values
        .iter()
        .map(|v| {
            v.as_f64().map(|f| f as f32).ok_or_else(|| {
                ModelError::InvalidResponse(format!("non-numeric embedding value: {}", v))
            })
        })
        .collect()
}
