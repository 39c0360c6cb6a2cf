//! User feedback on assistant responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One rating event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Database id (0 until inserted).
    pub id: i64,
    pub session_id: i64,
    /// Rating from 1 to 5.
    pub rating: u8,
    pub culturally_appropriate: bool,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        session_id: i64,
        rating: u8,
        culturally_appropriate: bool,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            session_id,
            rating,
            culturally_appropriate,
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feedback() {
        let fb = FeedbackRecord::new(7, 4, true, "helpful answer");
        assert_eq!(fb.id, 0);
        assert_eq!(fb.session_id, 7);
        assert_eq!(fb.rating, 4);
        assert!(fb.culturally_appropriate);
    }
}
