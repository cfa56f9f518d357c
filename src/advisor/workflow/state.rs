// SPDX-License-Identifier: MIT

//! Per-request workflow state and the rules for writing into it

use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer used when the model produced nothing usable
pub const EMPTY_ANSWER_FALLBACK: &str =
    "I couldn't generate a response. Please try rephrasing your question.";

/// Which collaborator (or failure) produced the context/answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTool {
    #[serde(rename = "CourseCatalog")]
    CourseCatalog,
    #[serde(rename = "CourseCatalog_Error")]
    CourseCatalogError,
    #[serde(rename = "TavilySearch")]
    TavilySearch,
    #[serde(rename = "TavilySearch_Error")]
    TavilySearchError,
    #[serde(rename = "LLM_Error")]
    LlmError,
    #[serde(rename = "unknown")]
    Unknown,
}

impl SourceTool {
    pub const ALL: [SourceTool; 6] = [
        SourceTool::CourseCatalog,
        SourceTool::CourseCatalogError,
        SourceTool::TavilySearch,
        SourceTool::TavilySearchError,
        SourceTool::LlmError,
        SourceTool::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTool::CourseCatalog => "CourseCatalog",
            SourceTool::CourseCatalogError => "CourseCatalog_Error",
            SourceTool::TavilySearch => "TavilySearch",
            SourceTool::TavilySearchError => "TavilySearch_Error",
            SourceTool::LlmError => "LLM_Error",
            SourceTool::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context-fetching branch chosen by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Course,
    Web,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Course => "course",
            Branch::Web => "web",
        }
    }

    fn provenance(&self, failed: bool) -> SourceTool {
        match (self, failed) {
            (Branch::Course, false) => SourceTool::CourseCatalog,
            (Branch::Course, true) => SourceTool::CourseCatalogError,
            (Branch::Web, false) => SourceTool::TavilySearch,
            (Branch::Web, true) => SourceTool::TavilySearchError,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow progress. Every run ends in `Answered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    Routed,
    ContextFetched,
    Answered,
}

/// Outcome of a single step: its payload, or a human-readable failure.
/// Failures are recorded into the state, never propagated.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Completed(String),
    Failed(String),
}

/// The record threaded through router, fetcher and composer for one request
#[derive(Debug, Clone)]
pub struct WorkflowState {
    query: String,
    context: String,
    answer: String,
    source_tool: SourceTool,
    next_node: Option<Branch>,
    stage: Stage,
}

impl WorkflowState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: String::new(),
            answer: String::new(),
            source_tool: SourceTool::Unknown,
            next_node: None,
            stage: Stage::Start,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn source_tool(&self) -> SourceTool {
        self.source_tool
    }

    pub fn next_node(&self) -> Option<Branch> {
        self.next_node
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn record_route(&mut self, branch: Branch) {
        debug_assert_eq!(self.stage, Stage::Start);
        self.next_node = Some(branch);
        self.stage = Stage::Routed;
    }

    /// Write the fetched context. Provenance follows the branch that ran and
    /// whether it failed.
    pub(crate) fn record_context(&mut self, branch: Branch, outcome: StepOutcome) {
        debug_assert_eq!(self.stage, Stage::Routed);
        let (context, failed) = match outcome {
            StepOutcome::Completed(c) => (c, false),
            StepOutcome::Failed(msg) => (msg, true),
        };
        self.context = context;
        self.source_tool = branch.provenance(failed);
        self.stage = Stage::ContextFetched;
    }

    /// Write the answer.
    ///
    /// On success provenance is left as the fetcher set it. On failure it is
    /// overridden with `LLM_Error`: a composer failure is what the caller
    /// needs to see, even when the fetch itself went fine.
    pub(crate) fn record_answer(&mut self, outcome: StepOutcome) {
        debug_assert_eq!(self.stage, Stage::ContextFetched);
        match outcome {
            StepOutcome::Completed(text) => {
                let text = text.trim();
                self.answer = if text.is_empty() {
                    EMPTY_ANSWER_FALLBACK.to_string()
                } else {
                    text.to_string()
                };
            }
            StepOutcome::Failed(msg) => {
                self.answer = msg;
                self.source_tool = SourceTool::LlmError;
            }
        }
        self.stage = Stage::Answered;
    }

    /// Context split into non-blank, trimmed lines
    pub fn retrieved_context(&self) -> Vec<String> {
        self.context
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}
