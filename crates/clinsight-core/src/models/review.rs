//! Expert reviews attached to feedback records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clinician's review of one piece of feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertReview {
    /// Database id (0 until inserted).
    pub id: i64,
    pub feedback_id: i64,
    pub reviewer_name: String,
    /// 1 to 5.
    pub medical_accuracy: u8,
    /// 1 to 5.
    pub cultural_relevance: u8,
    pub suggested_correction: Option<String>,
    pub additional_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ExpertReview {
    pub fn new(
        feedback_id: i64,
        reviewer_name: impl Into<String>,
        medical_accuracy: u8,
        cultural_relevance: u8,
    ) -> Self {
        Self {
            id: 0,
            feedback_id,
            reviewer_name: reviewer_name.into(),
            medical_accuracy,
            cultural_relevance,
            suggested_correction: None,
            additional_notes: None,
            created_at: Utc::now(),
        }
    }
}
