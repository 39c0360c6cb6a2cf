//! Feedback and expert-review database operations.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{ExpertReview, FeedbackRecord};

fn check_rating(name: &str, value: u8) -> DbResult<()> {
    if !(1..=5).contains(&value) {
        return Err(DbError::Constraint(format!(
            "{name} must be between 1 and 5, got {value}"
        )));
    }
    Ok(())
}

impl Database {
    /// Insert a feedback record, returning its id.
    pub fn insert_feedback(&self, feedback: &FeedbackRecord) -> DbResult<i64> {
        check_rating("rating", feedback.rating)?;
        self.conn.execute(
            "INSERT INTO feedback (session_id, rating, culturally_appropriate, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                feedback.session_id,
                feedback.rating,
                feedback.culturally_appropriate,
                feedback.comment,
                feedback.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get one feedback record by id.
    pub fn get_feedback(&self, id: i64) -> DbResult<Option<FeedbackRecord>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, session_id, rating, culturally_appropriate, comment, created_at
                 FROM feedback WHERE id = ?",
                [id],
                map_feedback_row,
            )
            .optional()?;
        Ok(result)
    }

    /// Feedback created within `[from, to]`, both dates inclusive.
    pub fn list_feedback_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<FeedbackRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, rating, culturally_appropriate, comment, created_at
             FROM feedback
             WHERE date(created_at) BETWEEN ?1 AND ?2
             ORDER BY created_at, id",
        )?;

        let rows = stmt.query_map(
            params![from.to_string(), to.to_string()],
            map_feedback_row,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Insert an expert review, returning its id.
    pub fn insert_expert_review(&self, review: &ExpertReview) -> DbResult<i64> {
        check_rating("medical_accuracy", review.medical_accuracy)?;
        check_rating("cultural_relevance", review.cultural_relevance)?;
        if self.get_feedback(review.feedback_id)?.is_none() {
            return Err(DbError::NotFound(format!(
                "feedback {}",
                review.feedback_id
            )));
        }
        self.conn.execute(
            "INSERT INTO expert_reviews (
                feedback_id, reviewer_name, medical_accuracy, cultural_relevance,
                suggested_correction, additional_notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                review.feedback_id,
                review.reviewer_name,
                review.medical_accuracy,
                review.cultural_relevance,
                review.suggested_correction,
                review.additional_notes,
                review.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All reviews attached to one feedback record, oldest first.
    pub fn list_reviews_for_feedback(&self, feedback_id: i64) -> DbResult<Vec<ExpertReview>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, feedback_id, reviewer_name, medical_accuracy, cultural_relevance,
                    suggested_correction, additional_notes, created_at
             FROM expert_reviews WHERE feedback_id = ? ORDER BY created_at, id",
        )?;

        let rows = stmt.query_map([feedback_id], |row| {
            Ok(ExpertReview {
                id: row.get(0)?,
                feedback_id: row.get(1)?,
                reviewer_name: row.get(2)?,
                medical_accuracy: row.get(3)?,
                cultural_relevance: row.get(4)?,
                suggested_correction: row.get(5)?,
                additional_notes: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn map_feedback_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    let created_at: DateTime<Utc> = row.get(5)?;
    Ok(FeedbackRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        rating: row.get(2)?,
        culturally_appropriate: row.get(3)?,
        comment: row.get(4)?,
        created_at,
    })
}
