// SPDX-License-Identifier: MIT

//! Query-routing and answer-composition workflow
//!
//! Router → (course | web) fetcher → composer, once per request:
//! - `router` - keyword routing
//! - `course` - course-catalog context from the retriever
//! - `web` - web context from the search tool
//! - `compose` - answer generation from the model
//! - `state` - the per-request record and its write rules

pub mod compose;
pub mod course;
pub mod router;
pub mod state;
pub mod web;

pub use compose::AnswerComposer;
pub use course::CourseContextFetcher;
pub use state::{Branch, SourceTool, Stage, StepOutcome, WorkflowState};
pub use web::WebContextFetcher;

use crate::adk::embedding::GeminiEmbedder;
use crate::adk::error::AdvisorError;
use crate::adk::model::provider::build_gemini;
use crate::adk::model::Model;
use crate::adk::tool::Tool;
use crate::advisor::config::AdvisorConfig;
use crate::advisor::retriever::{IndexRetriever, Retriever};
use crate::advisor::tools::tavily::TavilySearchTool;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Long-lived collaborator handles, shared read-only across requests.
///
/// `model` and `web_search` are optional: a missing one is reported when a
/// request first needs it, not at startup.
#[derive(Clone)]
pub struct Collaborators {
    pub retriever: Arc<dyn Retriever>,
    pub model: Option<Arc<dyn Model>>,
    pub web_search: Option<Arc<dyn Tool>>,
}

impl Collaborators {
    /// Construct the real collaborators. Fails only if the course index
    /// cannot be opened or was embedded with a different model.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let google_key = config.google_api_key.as_deref().unwrap_or_default();
        let embedder = GeminiEmbedder::new(config.embedding_model.clone(), google_key)?;
        let retriever = IndexRetriever::open(&config.index_dir, Arc::new(embedder))?;
        if let Some(built_with) = retriever.embedding_model() {
            if built_with != config.embedding_model {
                return Err(AdvisorError::index(format!(
                    "course index was built with '{}' but '{}' is configured",
                    built_with, config.embedding_model
                )));
            }
        }

        let model = match build_gemini(
            config.google_api_key.as_deref(),
            &config.model,
            &config.fallback_model,
        ) {
            Ok(model) => Some(model),
            Err(e) => {
                log::error!("Error initializing model: {}", e);
                None
            }
        };

        let web_search: Option<Arc<dyn Tool>> =
            match TavilySearchTool::new(config.tavily_api_key.clone().unwrap_or_default()) {
                Ok(tool) => {
                    log::info!("Registered tool: {}", tool.name());
                    Some(Arc::new(tool))
                }
                Err(e) => {
                    log::warn!("Failed to initialize web search: {}", e);
                    None
                }
            };

        Ok(Self {
            retriever: Arc::new(retriever),
            model,
            web_search,
        })
    }
}

/// The compiled workflow. Holds no per-request state, so one instance serves
/// all concurrent requests.
pub struct CourseWorkflow {
    course: CourseContextFetcher,
    web: WebContextFetcher,
    composer: AnswerComposer,
}

impl CourseWorkflow {
    pub fn new(collaborators: Collaborators, config: &AdvisorConfig) -> Self {
        Self {
            course: CourseContextFetcher::new(
                collaborators.retriever,
                config.top_k,
                config.timeout,
            ),
            web: WebContextFetcher::new(
                collaborators.web_search,
                config.web_results,
                config.timeout,
            ),
            composer: AnswerComposer::new(
                collaborators.model,
                config.generation_config(),
                config.timeout,
            ),
        }
    }

    pub fn from_config(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let workflow = Self::new(Collaborators::from_config(config)?, config);
        log::info!("Course workflow built successfully");
        Ok(workflow)
    }

    /// Run one query to completion. Always returns a state in `Stage::Answered`.
    pub async fn run(&self, query: impl Into<String>) -> WorkflowState {
        let mut state = WorkflowState::new(query);

        let branch = router::route(state.query());
        state.record_route(branch);

        let outcome = match branch {
            Branch::Course => self.course.fetch(state.query()).await,
            Branch::Web => self.web.fetch(state.query()).await,
        };
        state.record_context(branch, outcome);

        let outcome = self.composer.compose(state.query(), state.context()).await;
        state.record_answer(outcome);

        log::info!(
            "Workflow finished: source_tool={}, context_lines={}",
            state.source_tool(),
            state.retrieved_context().len()
        );
        state
    }
}

/// Await a collaborator call, failing with a timeout error after `limit`.
pub(crate) async fn bounded<T, F>(
    operation: &str,
    limit: Duration,
    call: F,
) -> Result<T, Box<dyn Error + Send + Sync>>
where
    F: Future<Output = Result<T, Box<dyn Error + Send + Sync>>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AdvisorError::timeout(operation, limit).into()),
    }
}
