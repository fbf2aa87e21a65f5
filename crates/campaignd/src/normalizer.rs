//! Request normalization.
//!
//! Turns either request variant into the canonical brand config / campaign
//! brief pair the prompt composer works from.

use campaign_common::{BrandConfig, CampaignBrief, ResearchRequest};
use serde_json::Value;

/// Market assumed for prompt-only requests
pub const DEFAULT_MARKET: &str = "Hong Kong";

/// Industry assumed for prompt-only requests
pub const DEFAULT_INDUSTRY: &str = "General";

/// Audience assumed for prompt-only requests
pub const DEFAULT_TARGET_AUDIENCE: &str = "Hong Kong market";

/// Normalized request pair
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRequest {
    pub brand_config: BrandConfig,
    pub campaign_brief: CampaignBrief,
}

/// Neither the explicit pair nor a usable prompt was supplied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing brand_config or campaign_brief in request body")]
pub struct MissingInputError;

/// Derive the canonical pair. Explicit fields win over `prompt` when both are present.
pub fn normalize(request: ResearchRequest) -> Result<CanonicalRequest, MissingInputError> {
    let prompt = request.usable_prompt().map(str::to_owned);

    match (request.brand_config, request.campaign_brief, prompt) {
        (Some(brand_config), Some(campaign_brief), _) => Ok(CanonicalRequest {
            brand_config,
            campaign_brief,
        }),
        (_, _, Some(prompt)) => Ok(from_prompt(prompt)),
        _ => Err(MissingInputError),
    }
}

fn from_prompt(prompt: String) -> CanonicalRequest {
    let mut brand_config = BrandConfig::new();
    brand_config.insert("market".to_string(), Value::from(DEFAULT_MARKET));
    brand_config.insert("industry".to_string(), Value::from(DEFAULT_INDUSTRY));

    let mut campaign_brief = CampaignBrief::new();
    campaign_brief.insert("objective".to_string(), Value::String(prompt));
    campaign_brief.insert(
        "target_audience".to_string(),
        Value::from(DEFAULT_TARGET_AUDIENCE),
    );

    CanonicalRequest {
        brand_config,
        campaign_brief,
    }
}
