// SPDX-License-Identifier: MIT

use super::bounded;
use super::state::StepOutcome;
use crate::advisor::retriever::Retriever;
use std::sync::Arc;
use std::time::Duration;

pub const NO_COURSE_INFO: &str = "No relevant course information found.";

/// Fetches course-catalog passages for the course branch
pub struct CourseContextFetcher {
    retriever: Arc<dyn Retriever>,
    top_k: usize,
    timeout: Duration,
}

impl CourseContextFetcher {
    pub fn new(retriever: Arc<dyn Retriever>, top_k: usize, timeout: Duration) -> Self {
        Self {
            retriever,
            top_k,
            timeout,
        }
    }

    pub async fn fetch(&self, query: &str) -> StepOutcome {
        log::info!("course node: checking retriever");
        let call = self.retriever.get_relevant(query, self.top_k);
        match bounded("course retrieval", self.timeout, call).await {
            Ok(passages) if passages.is_empty() => {
                StepOutcome::Completed(NO_COURSE_INFO.to_string())
            }
            Ok(passages) => StepOutcome::Completed(
                passages
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Err(e) => {
                log::error!("Error in course node: {}", e);
                StepOutcome::Failed(format!("Error retrieving course information: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::retriever::Passage;
    use async_trait::async_trait;
    use std::error::Error;

    enum Behaviour {
        Passages(Vec<&'static str>),
        Fail(&'static str),
        Hang,
    }

    struct StubRetriever(Behaviour);

    #[async_trait]
    impl Retriever for StubRetriever {
        async fn get_relevant(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<Passage>, Box<dyn Error + Send + Sync>> {
            match &self.0 {
                Behaviour::Passages(texts) => Ok(texts
                    .iter()
                    .take(limit)
                    .map(|t| Passage {
                        text: t.to_string(),
                    })
                    .collect()),
                Behaviour::Fail(msg) => Err((*msg).into()),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(vec![])
                }
            }
        }
    }

    fn fetcher(behaviour: Behaviour) -> CourseContextFetcher {
        CourseContextFetcher::new(
            Arc::new(StubRetriever(behaviour)),
            4,
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_passages_joined_with_newlines() {
        let outcome = fetcher(Behaviour::Passages(vec!["Intro to CS", "Data Structures"]))
            .fetch("List CS catalog courses")
            .await;
        assert_eq!(
            outcome,
            StepOutcome::Completed("Intro to CS\nData Structures".to_string())
        );
    }

    #[tokio::test]
    async fn test_top_k_is_passed_to_retriever() {
        let outcome = fetcher(Behaviour::Passages(vec!["a", "b", "c", "d", "e", "f"]))
            .fetch("course")
            .await;
        assert_eq!(outcome, StepOutcome::Completed("a\nb\nc\nd".to_string()));
    }

    #[tokio::test]
    async fn test_no_passages_uses_placeholder() {
        let outcome = fetcher(Behaviour::Passages(vec![])).fetch("course").await;
        assert_eq!(outcome, StepOutcome::Completed(NO_COURSE_INFO.to_string()));
    }

    #[tokio::test]
    async fn test_retriever_error_is_reported() {
        let outcome = fetcher(Behaviour::Fail("index unavailable"))
            .fetch("course")
            .await;
        assert_eq!(
            outcome,
            StepOutcome::Failed(
                "Error retrieving course information: index unavailable".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_slow_retriever_times_out() {
        match fetcher(Behaviour::Hang).fetch("course").await {
            StepOutcome::Failed(msg) => assert!(msg.contains("timed out"), "{}", msg),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
