pub mod output;


use futures::stream::{self, StreamExt, TryStreamExt};
use insight_core::{CategoryResult, CoreError};
use llm_interface::{parse_llm_output, LlmProvider};
use std::sync::Arc;
use tracing::{debug, info};

pub use output::{write_results, CONTENT_FILE_PREFIX, RESULTS_FILE};

/// Runs captions through an [`LlmProvider`] and parses every reply.
#[derive(Clone)]
pub struct Categorizer {
    provider: Arc<dyn LlmProvider>,
    concurrency: usize,
}

impl Categorizer {
    /// `concurrency` bounds the calls in flight; 1 keeps them sequential.
    pub fn new(provider: Arc<dyn LlmProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// One result per caption, in input order. The first failed call aborts
    /// the batch and nothing is returned for the captions already done.
    pub async fn categorize(
        &self,
        captions: &[String],
        model: &str,
    ) -> Result<Vec<CategoryResult>, CoreError> {
        if captions.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "Categorizing {} captions with {} (concurrency {})",
            captions.len(),
            model,
            self.concurrency
        );

        let tasks: Vec<_> = captions
            .iter()
            .enumerate()
            .map(|(index, caption)| self.categorize_one(index, caption, model))
            .collect();
        let results: Vec<CategoryResult> = stream::iter(tasks)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        info!("Categorized {} captions", results.len());
        Ok(results)
    }

    async fn categorize_one(
        &self,
        index: usize,
        caption: &str,
        model: &str,
    ) -> Result<CategoryResult, CoreError> {
        let completion = self.provider.complete(caption, model).await?;
        let result = parse_llm_output(&completion.content);
        debug!(
            "Caption {} -> {} categories {:?}",
            index,
            result.categories.len(),
            result.categories
        );
        Ok(result)
    }
}
