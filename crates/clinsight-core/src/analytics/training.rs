//! Training-data assembly and export.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::{AnalyticsError, AnalyticsPipeline, AnalyticsResult};
use crate::models::{ChatMessage, ExpertReview, UserContext};

/// Feedback detail embedded in a training sample.
#[derive(Debug, Clone, Serialize)]
pub struct SampleFeedback {
    pub rating: u8,
    pub culturally_appropriate: bool,
    pub comment: String,
}

/// One rated conversation, ready for fine-tuning.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSample {
    pub feedback_id: i64,
    pub conversation: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_context: Option<UserContext>,
    pub feedback: SampleFeedback,
    pub expert_reviews: Vec<ExpertReview>,
}

/// Statistics for one `prepare_training_data` run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingStats {
    pub total_samples: usize,
    pub with_expert_reviews: usize,
    pub with_user_context: usize,
    /// Sample count per rating value.
    pub by_rating: BTreeMap<u8, usize>,
    /// Samples written to disk; zero when export was skipped or failed.
    pub exported_samples: usize,
    pub export_path: Option<PathBuf>,
}

impl AnalyticsPipeline<'_> {
    /// Assemble training samples from feedback in `[from, to]`.
    ///
    /// `from` defaults to ninety days before today, `to` to today. Feedback
    /// below `min_rating` is skipped, as is feedback whose session holds no
    /// messages. With `export` set the samples are written to a timestamped
    /// JSON file under the data directory; an export failure is logged and
    /// reported through the stats rather than failing the run.
    pub fn prepare_training_data(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        min_rating: Option<u8>,
        export: bool,
    ) -> AnalyticsResult<TrainingStats> {
        if let Some(rating) = min_rating {
            if !(1..=5).contains(&rating) {
                return Err(AnalyticsError::InvalidRating(rating));
            }
        }

        let today = Utc::now().date_naive();
        let from = from.unwrap_or(today - Duration::days(90));
        let to = to.unwrap_or(today);
        if from > to {
            return Err(AnalyticsError::InvalidDateRange);
        }

        let mut samples: Vec<TrainingSample> = Vec::new();
        for record in self.db.list_feedback_between(from, to)? {
            if let Some(min) = min_rating {
                if record.rating < min {
                    continue;
                }
            }

            let conversation = self.db.list_messages(record.session_id)?;
            if conversation.is_empty() {
                continue;
            }

            let user_context = self
                .db
                .get_user_context(record.session_id)?
                .filter(|context| !context.is_empty());
            let expert_reviews = self.db.list_reviews_for_feedback(record.id)?;

            samples.push(TrainingSample {
                feedback_id: record.id,
                conversation,
                user_context,
                feedback: SampleFeedback {
                    rating: record.rating,
                    culturally_appropriate: record.culturally_appropriate,
                    comment: record.comment,
                },
                expert_reviews,
            });
        }

        let mut by_rating: BTreeMap<u8, usize> = BTreeMap::new();
        for sample in &samples {
            *by_rating.entry(sample.feedback.rating).or_insert(0) += 1;
        }

        let mut stats = TrainingStats {
            total_samples: samples.len(),
            with_expert_reviews: samples
                .iter()
                .filter(|s| !s.expert_reviews.is_empty())
                .count(),
            with_user_context: samples.iter().filter(|s| s.user_context.is_some()).count(),
            by_rating,
            exported_samples: 0,
            export_path: None,
        };

        if export && !samples.is_empty() {
            match self.export_samples(&samples) {
                Ok(path) => {
                    stats.exported_samples = samples.len();
                    stats.export_path = Some(path);
                }
                Err(err) => {
                    warn!(error = %err, "training data export failed");
                }
            }
        }

        info!(
            total = stats.total_samples,
            exported = stats.exported_samples,
            "training data prepared"
        );
        Ok(stats)
    }

    fn export_samples(&self, samples: &[TrainingSample]) -> AnalyticsResult<PathBuf> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.data_dir.join(format!("training_data_{timestamp}.json"));
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), samples)?;
        Ok(path)
    }
}
