//! Classifier output parsing.

use clinsight_core::LabelScore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scoring backend errors.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

pub type ScoringResult<T> = Result<T, ScoringError>;

/// One raw score entry as emitted by hosted classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScore {
    pub label: String,
    pub score: f64,
}

/// Parse classifier output JSON into label scores.
///
/// Accepts both the flat form `[{"label": ..., "score": ...}]` and the
/// nested form some inference endpoints return for single-input batches.
/// Extra text around the JSON array is ignored.
pub fn parse_classifier_output(raw: &str) -> ScoringResult<Vec<LabelScore>> {
    // Try to find the JSON array in the response (in case the service adds extra text)
    let start = raw
        .find('[')
        .ok_or_else(|| ScoringError::InvalidFormat("No JSON array found in response".into()))?;
    let end = raw
        .rfind(']')
        .ok_or_else(|| ScoringError::InvalidFormat("No closing bracket found in response".into()))?;
    let slice = &raw[start..=end];

    let scores: Vec<RawScore> = match serde_json::from_str(slice) {
        Ok(scores) => scores,
        Err(_) => {
            let nested: Vec<Vec<RawScore>> = serde_json::from_str(slice)?;
            nested.into_iter().next().unwrap_or_default()
        }
    };

    Ok(scores
        .into_iter()
        .map(|raw| LabelScore {
            label: raw.label,
            score: raw.score,
        })
        .collect())
}
