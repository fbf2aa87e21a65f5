//! Campaign Common - shared types for the campaign research gateway.
//!
//! Holds the research data model and the completion-client seam so the
//! daemon and its tests agree on one set of types.

pub mod llm_client;
pub mod research;

pub use llm_client::{
    AnthropicClient, CompletionClient, CompletionError, CompletionRequest, FakeCompletionClient,
    LlmConfig,
};
pub use research::{
    BrandConfig, CampaignBrief, CampaignResearchResult, ChannelExamples, Competitor,
    ContentDirection, PostExample, ResearchRequest, ResearchResponse, ShapeError, ThreadsExample, Trend,
    VideoExample, MAX_COMPETITORS, MAX_TRENDS, REQUIRED_DIRECTIONS, REQUIRED_SUBSEQUENT_THREADS,
};
