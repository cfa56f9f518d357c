// SPDX-License-Identifier: MIT

use super::bounded;
use super::state::StepOutcome;
use crate::adk::error::AdvisorError;
use crate::adk::tool::Tool;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Fetches web-search snippets for the web branch
pub struct WebContextFetcher {
    tool: Option<Arc<dyn Tool>>,
    max_results: usize,
    timeout: Duration,
}

impl WebContextFetcher {
    pub fn new(tool: Option<Arc<dyn Tool>>, max_results: usize, timeout: Duration) -> Self {
        Self {
            tool,
            max_results,
            timeout,
        }
    }

    pub async fn fetch(&self, query: &str) -> StepOutcome {
        match self.search(query).await {
            Ok(context) => StepOutcome::Completed(context),
            Err(e) => {
                log::error!("Error in web node: {}", e);
                StepOutcome::Failed(format!("Error searching web: {}", e))
            }
        }
    }

    async fn search(&self, query: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let tool = self
            .tool
            .as_ref()
            .ok_or_else(|| AdvisorError::config("Tavily tool not initialized"))?;

        log::info!("web node: searching with {}", tool.name());
        let input = json!({ "query": query, "max_results": self.max_results });
        let results = bounded("web search", self.timeout, tool.execute(input)).await?;
        Ok(results_to_context(&results))
    }
}

/// A result list yields each entry's `content` on its own line; any other
/// payload is used as text directly.
fn results_to_context(results: &Value) -> String {
    match results {
        Value::Array(items) => items
            .iter()
            .map(|r| r.get("content").and_then(|c| c.as_str()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
