//! Prompt templates for campaign research.

use crate::normalizer::CanonicalRequest;
use serde_json::{Map, Value};

/// System instruction sent with every research request
pub const SYSTEM_PROMPT: &str = r#"You are a campaign strategist. Analyze the brand and campaign brief provided, then output a COMPACT research result in JSON format with these exact fields:

{
  "content_directions": [
    {
      "direction_title": "string",
      "rationale": "string",
      "examples": {
        "post": { "caption": "string", "visual_concept": "string" },
        "video": { "hook": "string", "script": "string", "visual_notes": "string" },
        "threads": { "first_thread": "string", "subsequent_threads": ["string", "string"] }
      }
    }
  ],
  "trends": [
    { "trend_name": "string", "relevance": "string" }
  ],
  "competitors": [
    { "name": "string", "approach": "string" }
  ]
}

CONSTRAINTS:
- Exactly 2 content directions
- Maximum 3 trends
- Maximum 3 competitors
- 1 post + 1 video + 1 threads example per direction
- Exactly 2 subsequent_threads entries per threads example

Output ONLY valid JSON, no markdown code blocks."#;

/// Render the user message for a canonical request
pub fn build_user_message(request: &CanonicalRequest) -> String {
    format!(
        "BRAND CONFIG:\n{}\nCAMPAIGN BRIEF:\n{}\nGenerate the campaign research result.",
        pretty(&request.brand_config),
        pretty(&request.campaign_brief),
    )
}

fn pretty(map: &Map<String, Value>) -> String {
    // A map of JSON values always serializes
    serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
}
