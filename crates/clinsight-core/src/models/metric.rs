//! Persisted dashboard metric rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metric kinds persisted for the dashboard, keyed with a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    AvgRating,
    CulturalScore,
    FeedbackCount,
    CommonIssue,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::AvgRating => "avg_rating",
            MetricType::CulturalScore => "cultural_score",
            MetricType::FeedbackCount => "feedback_count",
            MetricType::CommonIssue => "common_issue",
        }
    }

    pub fn parse(s: &str) -> Option<MetricType> {
        match s {
            "avg_rating" => Some(MetricType::AvgRating),
            "cultural_score" => Some(MetricType::CulturalScore),
            "feedback_count" => Some(MetricType::FeedbackCount),
            "common_issue" => Some(MetricType::CommonIssue),
            _ => None,
        }
    }
}

/// A (metric_type, date) keyed value row.
///
/// At most one row exists per (metric_type, date); recomputation overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsMetric {
    pub id: i64,
    pub metric_type: MetricType,
    pub date: NaiveDate,
    pub value: f64,
    pub text_value: Option<String>,
}
