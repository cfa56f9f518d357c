// SPDX-License-Identifier: MIT

use super::bounded;
use super::state::StepOutcome;
use crate::adk::error::AdvisorError;
use crate::adk::model::{Content, GenerationConfig, Model};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Builds the answer prompt from the fetched context and the question
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are IntelliCourse, an assistant for answering questions.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {query}\n\
         \n\
         Answer clearly and concisely based on the context provided.\n\
         If the context doesn't contain relevant information, say so politely."
    )
}

/// Asks the model for the final answer
pub struct AnswerComposer {
    model: Option<Arc<dyn Model>>,
    generation: GenerationConfig,
    timeout: Duration,
}

impl AnswerComposer {
    pub fn new(
        model: Option<Arc<dyn Model>>,
        generation: GenerationConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            generation,
            timeout,
        }
    }

    pub async fn compose(&self, query: &str, context: &str) -> StepOutcome {
        match self.generate(query, context).await {
            Ok(text) => StepOutcome::Completed(text),
            Err(e) => {
                log::error!("Error in generate node: {}", e);
                StepOutcome::Failed(format!(
                    "I encountered an error while generating a response: {}",
                    e
                ))
            }
        }
    }

    async fn generate(
        &self,
        query: &str,
        context: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AdvisorError::config("LLM not initialized"))?;

        let history = [Content::user(build_prompt(query, context))];
        log::info!("generate node: invoking {}", model.model_name());
        let response = bounded(
            "answer generation",
            self.timeout,
            model.generate_content(&history, Some(&self.generation)),
        )
        .await?;
        Ok(response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::Part;
    use std::sync::Mutex;

    struct StubModel {
        reply: Result<Content, &'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn new(reply: Result<Content, &'static str>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Model for StubModel {
        fn model_name(&self) -> &str {
            "stub-model"
        }

        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
        ) -> Result<Content, Box<dyn Error + Send + Sync>> {
            self.prompts.lock().unwrap().push(history[0].text());
            self.reply.clone().map_err(|e| e.into())
        }
    }

    fn composer(model: Option<Arc<dyn Model>>) -> AnswerComposer {
        AnswerComposer::new(model, GenerationConfig::default(), Duration::from_secs(1))
    }

    #[test]
    fn test_prompt_embeds_context_and_question() {
        let prompt = build_prompt("What is CS101?", "Intro to CS\nData Structures");
        assert!(prompt.starts_with("You are IntelliCourse"));
        assert!(prompt.contains("Context:\nIntro to CS\nData Structures\n"));
        assert!(prompt.contains("Question: What is CS101?"));
    }

    #[tokio::test]
    async fn test_compose_returns_model_text() {
        let stub = Arc::new(StubModel::new(Ok(Content::model("CS101 is an intro course."))));
        let model: Arc<dyn Model> = stub.clone();

        let outcome = composer(Some(model)).compose("What is CS101?", "Intro to CS").await;
        assert_eq!(outcome, StepOutcome::Completed("CS101 is an intro course.".to_string()));

        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Intro to CS"));
    }

    #[tokio::test]
    async fn test_thinking_parts_not_in_answer() {
        let reply = Content {
            role: "model".to_string(),
            parts: vec![Part::Thinking("draft".to_string()), Part::Text("Final".to_string())],
        };
        let model: Arc<dyn Model> = Arc::new(StubModel::new(Ok(reply)));
        let outcome = composer(Some(model)).compose("q", "c").await;
        assert_eq!(outcome, StepOutcome::Completed("Final".to_string()));
    }

    #[tokio::test]
    async fn test_unconfigured_model_is_reported() {
        match composer(None).compose("q", "c").await {
            StepOutcome::Failed(msg) => {
                assert!(msg.starts_with("I encountered an error while generating a response: "));
                assert!(msg.contains("LLM not initialized"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_error_is_reported() {
        let model: Arc<dyn Model> = Arc::new(StubModel::new(Err("quota exceeded")));
        assert_eq!(
            composer(Some(model)).compose("q", "c").await,
            StepOutcome::Failed(
                "I encountered an error while generating a response: quota exceeded".to_string()
            )
        );
    }
}
