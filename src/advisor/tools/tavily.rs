// SPDX-License-Identifier: MIT

use crate::adk::error::AdvisorError;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

// --- Static schema ---

static TAVILY_SEARCH_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query"
            },
            "max_results": {
                "type": "integer",
                "description": "Number of results to return (default 3, max 20)"
            }
        },
        "required": ["query"]
    })
});

#[derive(Debug, Serialize, Deserialize)]
pub struct TavilySearchArgs {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

pub struct TavilySearchTool {
    client: Client,
    api_key: String,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err("TAVILY_API_KEY must be set".into());
        }
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "Searches the web using the Tavily Search API. Returns result snippets with titles, URLs, and content."
    }

    fn schema(&self) -> &Value {
        &TAVILY_SEARCH_SCHEMA
    }

    /// Returns a JSON array of `{title, url, content}` objects.
    async fn execute(&self, input: Value) -> Result<Value, Box<dyn Error + Send + Sync>> {
        let args: TavilySearchArgs = serde_json::from_value(input)?;
        let max_results = args.max_results.unwrap_or(3).clamp(1, 20);

        let resp = self
            .client
            .post(TAVILY_SEARCH_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "query": args.query,
                "max_results": max_results,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await?;
            return Err(AdvisorError::api("Tavily", format!("{}: {}", status, text)).into());
        }

        let body: Value = resp.json().await?;
        let results = parse_results(&body)?;
        log::debug!("Tavily returned {} results", results.len());

        Ok(serde_json::to_value(results)?)
    }
}

fn parse_results(body: &Value) -> Result<Vec<SearchResult>, Box<dyn Error + Send + Sync>> {
    let results_json = body
        .get("results")
        .ok_or("Invalid response format: missing results")?;
    Ok(serde_json::from_value(results_json.clone())?)
}
