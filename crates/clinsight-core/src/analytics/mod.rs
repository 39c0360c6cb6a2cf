//! Feedback analytics and training-data pipeline.
//!
//! Computes dashboard metrics over stored feedback, persists them as
//! `analytics_metrics` rows, and exports rated conversations as training
//! samples. All date ranges are inclusive on both ends.

mod issues;
mod metrics;
mod training;

pub use issues::*;
pub use metrics::*;
pub use training::*;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::db::{Database, DbError};

/// Analytics pipeline errors.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("from date is after to date")]
    InvalidDateRange,
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Feedback analytics pipeline over one database.
pub struct AnalyticsPipeline<'a> {
    pub(crate) db: &'a Database,
    pub(crate) data_dir: PathBuf,
}

impl<'a> AnalyticsPipeline<'a> {
    /// Create a pipeline writing exports under `data_dir`.
    ///
    /// The directory is created if missing.
    pub fn new(db: &'a Database, data_dir: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { db, data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Whether the export directory is usable.
    pub fn ready(&self) -> bool {
        self.data_dir.is_dir()
    }
}
