//! Research pipeline: normalize → compose → complete → recover.

use crate::error::ResearchError;
use crate::normalizer::normalize;
use crate::prompts::{build_user_message, SYSTEM_PROMPT};
use crate::recovery::recover;
use campaign_common::{
    CampaignResearchResult, CompletionClient, CompletionRequest, LlmConfig, ResearchRequest,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Runs one research request against the completion service
#[derive(Clone)]
pub struct ResearchService {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
}

impl ResearchService {
    pub fn new(client: Arc<dyn CompletionClient>, llm: &LlmConfig) -> Self {
        Self {
            client,
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Produce a validated research result or the reason there is none.
    ///
    /// Normalization failures return before any completion call. The
    /// completion service is called at most once.
    pub async fn run(
        &self,
        request: ResearchRequest,
    ) -> Result<CampaignResearchResult, ResearchError> {
        let request_id = Uuid::new_v4();
        self.run_inner(request)
            .instrument(info_span!("research", %request_id))
            .await
    }

    async fn run_inner(
        &self,
        request: ResearchRequest,
    ) -> Result<CampaignResearchResult, ResearchError> {
        let canonical = normalize(request)?;

        let completion = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user_message: build_user_message(&canonical),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
        };

        info!("  Calling completion service (model {})", self.model);
        let started = Instant::now();
        let text = self.client.complete(&completion).await?;
        info!(
            "  Completion returned {} bytes in {}ms",
            text.len(),
            started.elapsed().as_millis()
        );

        let result = recover(&text)?;
        info!(
            "  Research result: {} directions, {} trends, {} competitors",
            result.content_directions.len(),
            result.trends.len(),
            result.competitors.len()
        );

        Ok(result)
    }
}
