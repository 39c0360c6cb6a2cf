//! SQLite schema definition.

/// Complete database schema for clinsight.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Chat Sessions
-- ============================================================================

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES sessions(id),
    role TEXT NOT NULL CHECK (role IN ('system', 'user', 'assistant')),
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id);

-- ============================================================================
-- User Context (one row per session, JSON-encoded fields)
-- ============================================================================

CREATE TABLE IF NOT EXISTS user_contexts (
    session_id INTEGER PRIMARY KEY REFERENCES sessions(id),
    symptoms TEXT NOT NULL DEFAULT '{}',          -- JSON object
    symptom_durations TEXT NOT NULL DEFAULT '{}', -- JSON object
    treatments_tried TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    medical_history TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    cultural_preferences TEXT NOT NULL DEFAULT '{}', -- JSON object
    language TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Feedback and Expert Reviews
-- ============================================================================

CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES sessions(id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    culturally_appropriate INTEGER NOT NULL,
    comment TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_feedback_session ON feedback(session_id);
CREATE INDEX IF NOT EXISTS idx_feedback_created ON feedback(created_at);

CREATE TABLE IF NOT EXISTS expert_reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    feedback_id INTEGER NOT NULL REFERENCES feedback(id),
    reviewer_name TEXT NOT NULL,
    medical_accuracy INTEGER NOT NULL CHECK (medical_accuracy BETWEEN 1 AND 5),
    cultural_relevance INTEGER NOT NULL CHECK (cultural_relevance BETWEEN 1 AND 5),
    suggested_correction TEXT,
    additional_notes TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_feedback ON expert_reviews(feedback_id);

-- ============================================================================
-- Analytics Metrics (one row per metric_type and date)
-- ============================================================================

CREATE TABLE IF NOT EXISTS analytics_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    metric_type TEXT NOT NULL CHECK (
        metric_type IN ('avg_rating', 'cultural_score', 'feedback_count', 'common_issue')
    ),
    date TEXT NOT NULL,                          -- YYYY-MM-DD
    value REAL NOT NULL,
    text_value TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(metric_type, date)
);

CREATE INDEX IF NOT EXISTS idx_metrics_date ON analytics_metrics(date);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_rating_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute("INSERT INTO sessions DEFAULT VALUES", []).unwrap();

        let result = conn.execute(
            "INSERT INTO feedback (session_id, rating, culturally_appropriate, created_at)
             VALUES (1, 6, 1, '2026-01-01T00:00:00+00:00')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO feedback (session_id, rating, culturally_appropriate, created_at)
             VALUES (1, 5, 1, '2026-01-01T00:00:00+00:00')",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_metric_unique_per_day() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO analytics_metrics (metric_type, date, value) VALUES ('avg_rating', '2026-01-01', 4.5)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO analytics_metrics (metric_type, date, value) VALUES ('avg_rating', '2026-01-01', 3.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_role_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute("INSERT INTO sessions DEFAULT VALUES", []).unwrap();

        let result = conn.execute(
            "INSERT INTO messages (session_id, role, content, timestamp)
             VALUES (1, 'moderator', 'hi', '2026-01-01T00:00:00+00:00')",
            [],
        );
        assert!(result.is_err());
    }
}
