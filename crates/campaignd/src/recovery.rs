//! Response recovery.
//!
//! Turns the completion service's raw text into a validated
//! `CampaignResearchResult`:
//!
//! 1. strip markdown code fences and surrounding whitespace
//! 2. decode the cleaned text strictly and validate its shape
//! 3. otherwise try each brace-balanced top-level `{...}` object in order,
//!    falling back to the original text when the cleaned text has none
//! 4. otherwise fail with `UpstreamFormatError`, keeping the original text
//!
//! The completion call is never retried from here.

use campaign_common::CampaignResearchResult;
use tracing::{debug, warn};

/// The model answered, but not with a usable research result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("model output is not a valid research result: {reason}")]
pub struct UpstreamFormatError {
    /// Model output as received, kept for diagnostics
    pub raw: String,
    /// Last decode or validation failure
    pub reason: String,
}

/// Recover a research result from model output
pub fn recover(text: &str) -> Result<CampaignResearchResult, UpstreamFormatError> {
    let cleaned = strip_code_fences(text);

    let mut reason = match decode(cleaned) {
        Ok(result) => return Ok(result),
        Err(e) => e,
    };

    let mut candidates = top_level_objects(cleaned);
    if candidates.is_empty() {
        candidates = top_level_objects(text);
    }
    debug!(
        "Direct decode failed ({}), trying {} embedded object(s)",
        reason,
        candidates.len()
    );

    if candidates.is_empty() && !text.contains('{') {
        reason = "no JSON object found in model output".to_string();
    }

    for candidate in candidates {
        match decode(candidate) {
            Ok(result) => return Ok(result),
            Err(e) => reason = e,
        }
    }

    warn!("Model output rejected: {}", reason);
    Err(UpstreamFormatError {
        raw: text.to_string(),
        reason,
    })
}

fn decode(text: &str) -> Result<CampaignResearchResult, String> {
    let result: CampaignResearchResult =
        serde_json::from_str(text).map_err(|e| format!("invalid JSON: {}", e))?;
    result
        .validate()
        .map_err(|e| format!("unexpected shape: {}", e))?;
    Ok(result)
}

/// Strip a leading ```` ``` ```` / ```` ```json ```` marker, a trailing
/// ```` ``` ```` marker and surrounding whitespace.
///
/// Only the language tag after the opening fence is dropped, so an object
/// starting on the fence line survives.
pub fn strip_code_fences(text: &str) -> &str {
    let mut t = text.trim();

    if let Some(rest) = t.strip_prefix("```") {
        t = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }

    if let Some(rest) = t.trim_end().strip_suffix("```") {
        t = rest;
    }

    t.trim()
}

/// Brace-balanced top-level objects in order of appearance.
///
/// Braces inside JSON strings are ignored; quotes outside any object are not
/// treated as strings so apostrophes in surrounding prose are harmless. An
/// object left open at end of input yields nothing.
pub fn top_level_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    objects
}
