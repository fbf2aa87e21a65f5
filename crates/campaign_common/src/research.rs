//! Research data model.
//!
//! Inbound request shapes and the campaign research result the model is asked
//! to produce. Brand config and campaign brief stay open JSON maps; the result
//! is fully typed and carries its own shape validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Brand configuration forwarded verbatim into the prompt
pub type BrandConfig = Map<String, Value>;

/// Campaign brief forwarded verbatim into the prompt
pub type CampaignBrief = Map<String, Value>;

/// Exactly this many content directions per result
pub const REQUIRED_DIRECTIONS: usize = 2;

/// Upper bound on trends per result
pub const MAX_TRENDS: usize = 3;

/// Upper bound on competitors per result
pub const MAX_COMPETITORS: usize = 3;

/// Exactly this many follow-up entries per threads example
pub const REQUIRED_SUBSEQUENT_THREADS: usize = 2;

// ============================================================================
// Request
// ============================================================================

/// Body of `POST /api/research`.
///
/// Either the explicit pair or the `prompt` shorthand is expected. JSON `null`
/// deserializes to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_config: Option<BrandConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_brief: Option<CampaignBrief>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl ResearchRequest {
    /// Shorthand request carrying only a free-text prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    /// Explicit request carrying both maps
    pub fn explicit(brand_config: BrandConfig, campaign_brief: CampaignBrief) -> Self {
        Self {
            brand_config: Some(brand_config),
            campaign_brief: Some(campaign_brief),
            prompt: None,
        }
    }

    /// Prompt text, if present and not blank
    pub fn usable_prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.trim().is_empty())
    }
}

// ============================================================================
// Result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostExample {
    pub caption: String,
    pub visual_concept: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoExample {
    pub hook: String,
    pub script: String,
    pub visual_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadsExample {
    pub first_thread: String,
    pub subsequent_threads: Vec<String>,
}

/// One example per channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelExamples {
    pub post: PostExample,
    pub video: VideoExample,
    pub threads: ThreadsExample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDirection {
    pub direction_title: String,
    pub rationale: String,
    pub examples: ChannelExamples,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub trend_name: String,
    pub relevance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub approach: String,
}

/// Structured research output returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignResearchResult {
    pub content_directions: Vec<ContentDirection>,

    #[serde(default)]
    pub trends: Vec<Trend>,

    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

/// Success envelope of `POST /api/research`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub campaign_research_result: CampaignResearchResult,
}

/// Count invariant a decoded result failed to meet
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected exactly {expected} content directions, got {actual}")]
    DirectionCount { expected: usize, actual: usize },

    #[error("expected at most {max} trends, got {actual}")]
    TooManyTrends { max: usize, actual: usize },

    #[error("expected at most {max} competitors, got {actual}")]
    TooManyCompetitors { max: usize, actual: usize },

    #[error("direction {index}: expected exactly {expected} subsequent threads, got {actual}")]
    SubsequentThreadCount {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

impl CampaignResearchResult {
    /// Check the count invariants that typed decoding cannot express
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.content_directions.len() != REQUIRED_DIRECTIONS {
            return Err(ShapeError::DirectionCount {
                expected: REQUIRED_DIRECTIONS,
                actual: self.content_directions.len(),
            });
        }

        if self.trends.len() > MAX_TRENDS {
            return Err(ShapeError::TooManyTrends {
                max: MAX_TRENDS,
                actual: self.trends.len(),
            });
        }

        if self.competitors.len() > MAX_COMPETITORS {
            return Err(ShapeError::TooManyCompetitors {
                max: MAX_COMPETITORS,
                actual: self.competitors.len(),
            });
        }

        for (index, direction) in self.content_directions.iter().enumerate() {
            let actual = direction.examples.threads.subsequent_threads.len();
            if actual != REQUIRED_SUBSEQUENT_THREADS {
                return Err(ShapeError::SubsequentThreadCount {
                    index,
                    expected: REQUIRED_SUBSEQUENT_THREADS,
                    actual,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direction(title: &str, followups: usize) -> ContentDirection {
        ContentDirection {
            direction_title: title.to_string(),
            rationale: "fits the audience".to_string(),
            examples: ChannelExamples {
                post: PostExample {
                    caption: "caption".to_string(),
                    visual_concept: "flat lay".to_string(),
                },
                video: VideoExample {
                    hook: "hook".to_string(),
                    script: "script".to_string(),
                    visual_notes: "handheld".to_string(),
                },
                threads: ThreadsExample {
                    first_thread: "first".to_string(),
                    subsequent_threads: (0..followups).map(|i| format!("next {}", i)).collect(),
                },
            },
        }
    }

    fn result() -> CampaignResearchResult {
        CampaignResearchResult {
            content_directions: vec![direction("A", 2), direction("B", 2)],
            trends: vec![Trend {
                trend_name: "retro runners".to_string(),
                relevance: "high".to_string(),
            }],
            competitors: vec![],
        }
    }

    #[test]
    fn test_valid_result_passes() {
        assert_eq!(result().validate(), Ok(()));
    }

    #[test]
    fn test_direction_count_enforced() {
        let mut r = result();
        r.content_directions.push(direction("C", 2));
        assert_eq!(
            r.validate(),
            Err(ShapeError::DirectionCount {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_trend_and_competitor_caps() {
        let mut r = result();
        r.trends = (0..4)
            .map(|i| Trend {
                trend_name: format!("t{}", i),
                relevance: "x".to_string(),
            })
            .collect();
        assert!(matches!(r.validate(), Err(ShapeError::TooManyTrends { .. })));

        let mut r = result();
        r.competitors = (0..4)
            .map(|i| Competitor {
                name: format!("c{}", i),
                approach: "x".to_string(),
            })
            .collect();
        assert!(matches!(r.validate(), Err(ShapeError::TooManyCompetitors { .. })));
    }

    #[test]
    fn test_subsequent_thread_count_enforced() {
        let mut r = result();
        r.content_directions[1] = direction("B", 1);
        assert_eq!(
            r.validate(),
            Err(ShapeError::SubsequentThreadCount {
                index: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_missing_trends_and_competitors_default_empty() {
        let json = serde_json::json!({
            "content_directions": serde_json::to_value(&result().content_directions).unwrap()
        });
        let r: CampaignResearchResult = serde_json::from_value(json).unwrap();
        assert!(r.trends.is_empty());
        assert!(r.competitors.is_empty());
        assert_eq!(r.validate(), Ok(()));
    }

    #[test]
    fn test_request_null_fields_are_absent() {
        let req: ResearchRequest =
            serde_json::from_str(r#"{"brand_config": null, "prompt": "launch"}"#).unwrap();
        assert!(req.brand_config.is_none());
        assert_eq!(req.usable_prompt(), Some("launch"));
    }

    #[test]
    fn test_blank_prompt_not_usable() {
        assert_eq!(ResearchRequest::from_prompt("   ").usable_prompt(), None);
        assert_eq!(ResearchRequest::default().usable_prompt(), None);
    }
}
