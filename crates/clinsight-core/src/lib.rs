//! Clinsight Core Library
//!
//! Feedback-driven analytics engine for a telehealth assistant.
//!
//! # Architecture
//!
//! ```text
//! Patient message ──► Entity Extraction ──► per-message EntityMap
//!        │                                        │
//!        └─────────► Emotion Classification ──────┤
//!                    (gated, degrades to          │
//!                     "unknown")                  ▼
//!                                   [Conversation Digest]
//!                                                 │
//! Feedback + Expert Reviews ──► Analytics Pipeline
//!                                    │            │
//!                                    ▼            ▼
//!                           analytics_metrics   training_data_*.json
//!                           (dashboard rows)    (fine-tuning export)
//! ```
//!
//! # Core Principle
//!
//! **Classification never fails a conversation.** Backend errors, short text,
//! and low-confidence scores all degrade to the `unknown` label.
//!
//! # Modules
//!
//! - [`db`]: SQLite persistence for sessions, feedback, and metrics
//! - [`models`]: Domain types (ChatMessage, FeedbackRecord, UserContext, etc.)
//! - [`patterns`]: Compiled medical entity pattern library
//! - [`extract`]: Rule-based entity extraction
//! - [`emotion`]: Emotion label vocabulary and gating policy
//! - [`digest`]: Conversation-level aggregation
//! - [`analytics`]: Metric extraction, persistence, and training-data export

pub mod analytics;
pub mod db;
pub mod digest;
pub mod emotion;
pub mod extract;
pub mod models;
pub mod patterns;

// Re-export commonly used types
pub use analytics::{AnalyticsPipeline, IssueCategory, MetricsBundle, MetricsUpdate, TrainingStats};
pub use db::Database;
pub use digest::{ConversationAnalyzer, ConversationDigest};
pub use emotion::{
    EmotionClassifier, EmotionError, EmotionLabel, EmotionModel, EmotionScore, LabelScore,
    ModelResult,
};
pub use extract::{EntityExtractor, EntityMap};
pub use models::{
    AnalyticsMetric, ChatMessage, ExpertReview, FeedbackRecord, MetricType, Role, UserContext,
};
pub use patterns::{EntityCategory, PatternLibrary};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// Service Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClinsightError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Pattern error: {0}")]
    PatternError(String),
}

impl From<db::DbError> for ClinsightError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => ClinsightError::NotFound(what),
            db::DbError::Constraint(what) => ClinsightError::InvalidInput(what),
            other => ClinsightError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClinsightError {
    fn from(e: serde_json::Error) -> Self {
        ClinsightError::SerializationError(e.to_string())
    }
}

impl From<patterns::PatternError> for ClinsightError {
    fn from(e: patterns::PatternError) -> Self {
        ClinsightError::PatternError(e.to_string())
    }
}

impl From<analytics::AnalyticsError> for ClinsightError {
    fn from(e: analytics::AnalyticsError) -> Self {
        match e {
            analytics::AnalyticsError::Db(db) => db.into(),
            analytics::AnalyticsError::Json(json) => {
                ClinsightError::SerializationError(json.to_string())
            }
            analytics::AnalyticsError::InvalidRating(_)
            | analytics::AnalyticsError::InvalidDateRange => {
                ClinsightError::InvalidInput(e.to_string())
            }
            analytics::AnalyticsError::Io(io) => ClinsightError::DatabaseError(io.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinsightError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinsightError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Main Service Object
// =========================================================================

/// Thread-safe facade over the database, extractor, and classifier.
pub struct Clinsight {
    db: Arc<Mutex<Database>>,
    extractor: EntityExtractor,
    classifier: EmotionClassifier,
    data_dir: PathBuf,
}

impl Clinsight {
    /// Open or create a database at the given path.
    pub fn open(
        db_path: impl AsRef<Path>,
        data_dir: impl AsRef<Path>,
        model: Box<dyn EmotionModel>,
    ) -> Result<Self, ClinsightError> {
        let db = Database::open(db_path)?;
        Self::with_database(db, data_dir, model)
    }

    /// Create a service over an in-memory database (for testing).
    pub fn open_in_memory(
        data_dir: impl AsRef<Path>,
        model: Box<dyn EmotionModel>,
    ) -> Result<Self, ClinsightError> {
        let db = Database::open_in_memory()?;
        Self::with_database(db, data_dir, model)
    }

    fn with_database(
        db: Database,
        data_dir: impl AsRef<Path>,
        model: Box<dyn EmotionModel>,
    ) -> Result<Self, ClinsightError> {
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            extractor: EntityExtractor::new(PatternLibrary::standard()?),
            classifier: EmotionClassifier::new(model),
            data_dir: data_dir.as_ref().to_path_buf(),
        })
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Start a new chat session.
    pub fn create_session(&self) -> Result<i64, ClinsightError> {
        let db = self.db.lock()?;
        Ok(db.create_session()?)
    }

    /// Append a message to a session.
    pub fn add_message(
        &self,
        session_id: i64,
        role: Role,
        content: String,
    ) -> Result<i64, ClinsightError> {
        let db = self.db.lock()?;
        let message = ChatMessage::new(role, content);
        Ok(db.insert_message(session_id, &message)?)
    }

    /// Full transcript of a session in chronological order.
    pub fn get_messages(&self, session_id: i64) -> Result<Vec<ChatMessage>, ClinsightError> {
        let db = self.db.lock()?;
        Ok(db.list_messages(session_id)?)
    }

    /// Merge a context update into the session's stored context.
    pub fn update_context(&self, update: &UserContext) -> Result<UserContext, ClinsightError> {
        let db = self.db.lock()?;
        Ok(db.merge_user_context(update)?)
    }

    // =========================================================================
    // Extraction and Classification
    // =========================================================================

    /// Extract medical entities from one message.
    pub fn extract_entities(&self, text: &str) -> EntityMap {
        self.extractor.extract(text)
    }

    /// Classify the emotion of one message.
    pub fn classify_emotion(&self, text: &str) -> EmotionScore {
        self.classifier.classify(text)
    }

    /// Digest a whole session's conversation.
    pub fn summarize_session(&self, session_id: i64) -> Result<ConversationDigest, ClinsightError> {
        let messages = self.get_messages(session_id)?;
        let analyzer = ConversationAnalyzer::new(&self.extractor, &self.classifier);
        Ok(analyzer.summarize(&messages))
    }

    // =========================================================================
    // Feedback Operations
    // =========================================================================

    /// Record feedback for a session, returning the feedback id.
    pub fn submit_feedback(
        &self,
        session_id: i64,
        rating: u8,
        culturally_appropriate: bool,
        comment: String,
    ) -> Result<i64, ClinsightError> {
        let db = self.db.lock()?;
        let feedback = FeedbackRecord::new(session_id, rating, culturally_appropriate, comment);
        Ok(db.insert_feedback(&feedback)?)
    }

    /// Attach an expert review to a feedback record.
    pub fn add_expert_review(&self, review: &ExpertReview) -> Result<i64, ClinsightError> {
        let db = self.db.lock()?;
        Ok(db.insert_expert_review(review)?)
    }

    // =========================================================================
    // Analytics Operations
    // =========================================================================

    /// Compute the metrics bundle for a date range.
    pub fn extract_metrics(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<MetricsBundle, ClinsightError> {
        let db = self.db.lock()?;
        let pipeline = AnalyticsPipeline::new(&db, &self.data_dir)?;
        Ok(pipeline.extract_metrics(from, to)?)
    }

    /// Recompute and persist dashboard metrics.
    pub fn update_analytics_metrics(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<MetricsUpdate, ClinsightError> {
        let db = self.db.lock()?;
        let pipeline = AnalyticsPipeline::new(&db, &self.data_dir)?;
        Ok(pipeline.update_analytics_metrics(from, to)?)
    }

    /// Assemble and optionally export training samples.
    pub fn prepare_training_data(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        min_rating: Option<u8>,
        export: bool,
    ) -> Result<TrainingStats, ClinsightError> {
        let db = self.db.lock()?;
        let pipeline = AnalyticsPipeline::new(&db, &self.data_dir)?;
        Ok(pipeline.prepare_training_data(from, to, min_rating, export)?)
    }
}
