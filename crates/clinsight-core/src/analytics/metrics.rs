//! Metric extraction and persistence.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use super::{count_issues, AnalyticsError, AnalyticsPipeline, AnalyticsResult, IssueCategory};
use crate::models::{FeedbackRecord, MetricType};

/// One day of feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub count: usize,
    pub avg_rating: f64,
    /// Percent of feedback marked culturally appropriate, 0 to 100.
    pub cultural_score: f64,
}

/// One week or month of feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    pub count: usize,
    pub avg_rating: f64,
}

/// Feedback counts over time. Periods with no feedback are absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeSeries {
    /// Keyed by calendar day.
    pub daily: BTreeMap<NaiveDate, DailyBucket>,
    /// Keyed by the Monday starting each ISO week.
    pub weekly: BTreeMap<NaiveDate, PeriodBucket>,
    /// Keyed by the first day of each calendar month.
    pub monthly: BTreeMap<NaiveDate, PeriodBucket>,
}

/// Per-language slice of the feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStats {
    pub count: usize,
    pub avg_rating: f64,
    pub cultural_score: f64,
}

/// Everything `extract_metrics` computes for one date range.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsBundle {
    pub total_feedback: usize,
    pub avg_rating: f64,
    pub cultural_score: f64,
    /// Top issues by mention count, at most five.
    pub common_issues: Vec<(IssueCategory, usize)>,
    pub time_series: TimeSeries,
    /// Keyed by session language, `"unknown"` for sessions without one.
    /// Empty when no session in range has any stored context.
    pub by_language: BTreeMap<String, LanguageStats>,
}

impl MetricsBundle {
    fn empty() -> Self {
        Self {
            total_feedback: 0,
            avg_rating: 0.0,
            cultural_score: 0.0,
            common_issues: Vec::new(),
            time_series: TimeSeries::default(),
            by_language: BTreeMap::new(),
        }
    }
}

/// Outcome of one `update_analytics_metrics` run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsUpdate {
    pub created: usize,
    pub updated: usize,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // with_day(1) is always valid
    date.with_day(1).unwrap_or(date)
}

struct Accumulator {
    count: usize,
    rating_sum: u64,
    cultural_count: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            count: 0,
            rating_sum: 0,
            cultural_count: 0,
        }
    }

    fn add(&mut self, feedback: &FeedbackRecord) {
        self.count += 1;
        self.rating_sum += feedback.rating as u64;
        if feedback.culturally_appropriate {
            self.cultural_count += 1;
        }
    }

    fn avg_rating(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.rating_sum as f64 / self.count as f64
        }
    }

    fn cultural_score(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.cultural_count as f64 / self.count as f64 * 100.0
        }
    }
}

impl AnalyticsPipeline<'_> {
    /// Compute the full metrics bundle for `[from, to]`.
    ///
    /// `from` defaults to thirty days before today, `to` to today. A range
    /// with no feedback yields a zeroed bundle, not an error.
    pub fn extract_metrics(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AnalyticsResult<MetricsBundle> {
        let today = Utc::now().date_naive();
        let from = from.unwrap_or(today - Duration::days(30));
        let to = to.unwrap_or(today);
        if from > to {
            return Err(AnalyticsError::InvalidDateRange);
        }

        let feedback = self.db.list_feedback_between(from, to)?;
        if feedback.is_empty() {
            return Ok(MetricsBundle::empty());
        }

        let mut overall = Accumulator::new();
        let mut daily: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
        let mut weekly: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
        let mut monthly: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();

        for record in &feedback {
            let day = record.created_at.date_naive();
            overall.add(record);
            daily.entry(day).or_insert_with(Accumulator::new).add(record);
            weekly
                .entry(monday_of(day))
                .or_insert_with(Accumulator::new)
                .add(record);
            monthly
                .entry(first_of_month(day))
                .or_insert_with(Accumulator::new)
                .add(record);
        }

        let time_series = TimeSeries {
            daily: daily
                .into_iter()
                .map(|(day, acc)| {
                    (
                        day,
                        DailyBucket {
                            count: acc.count,
                            avg_rating: acc.avg_rating(),
                            cultural_score: acc.cultural_score(),
                        },
                    )
                })
                .collect(),
            weekly: weekly
                .into_iter()
                .map(|(week, acc)| {
                    (
                        week,
                        PeriodBucket {
                            count: acc.count,
                            avg_rating: acc.avg_rating(),
                        },
                    )
                })
                .collect(),
            monthly: monthly
                .into_iter()
                .map(|(month, acc)| {
                    (
                        month,
                        PeriodBucket {
                            count: acc.count,
                            avg_rating: acc.avg_rating(),
                        },
                    )
                })
                .collect(),
        };

        let mut common_issues =
            count_issues(feedback.iter().map(|record| record.comment.as_str()));
        common_issues.truncate(5);

        let by_language = self.group_by_language(&feedback)?;

        Ok(MetricsBundle {
            total_feedback: overall.count,
            avg_rating: overall.avg_rating(),
            cultural_score: overall.cultural_score(),
            common_issues,
            time_series,
            by_language,
        })
    }

    /// Group feedback by the language stored in each session's context.
    ///
    /// Empty when no session in the set has stored context; otherwise
    /// sessions without a language land in the `"unknown"` bucket.
    fn group_by_language(
        &self,
        feedback: &[FeedbackRecord],
    ) -> AnalyticsResult<BTreeMap<String, LanguageStats>> {
        let mut languages: BTreeMap<i64, Option<String>> = BTreeMap::new();
        let mut any_context = false;
        for record in feedback {
            if let std::collections::btree_map::Entry::Vacant(entry) =
                languages.entry(record.session_id)
            {
                let context = self.db.get_user_context(record.session_id)?;
                if let Some(context) = context {
                    any_context = true;
                    entry.insert(context.language);
                } else {
                    entry.insert(None);
                }
            }
        }

        if !any_context {
            return Ok(BTreeMap::new());
        }

        let mut buckets: BTreeMap<String, Accumulator> = BTreeMap::new();
        for record in feedback {
            let language = languages
                .get(&record.session_id)
                .and_then(|l| l.clone())
                .unwrap_or_else(|| "unknown".to_string());
            buckets
                .entry(language)
                .or_insert_with(Accumulator::new)
                .add(record);
        }

        Ok(buckets
            .into_iter()
            .map(|(language, acc)| {
                (
                    language,
                    LanguageStats {
                        count: acc.count,
                        avg_rating: acc.avg_rating(),
                        cultural_score: acc.cultural_score(),
                    },
                )
            })
            .collect())
    }

    /// Recompute metrics and persist them as `analytics_metrics` rows.
    ///
    /// When `from` is omitted the run resumes one day after the most recent
    /// persisted metric, or thirty days back on a cold start. A derived range
    /// that is already caught up does no work and is not an error; an
    /// explicitly inverted range is.
    pub fn update_analytics_metrics(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AnalyticsResult<MetricsUpdate> {
        let today = Utc::now().date_naive();
        let to = to.unwrap_or(today);

        let (from, derived) = match from {
            Some(date) => (date, false),
            None => match self.db.latest_metric_date()? {
                Some(latest) => (latest + Duration::days(1), true),
                None => (today - Duration::days(30), true),
            },
        };

        if from > to {
            if derived {
                return Ok(MetricsUpdate {
                    created: 0,
                    updated: 0,
                    from,
                    to,
                });
            }
            return Err(AnalyticsError::InvalidDateRange);
        }

        let bundle = self.extract_metrics(Some(from), Some(to))?;

        let mut created = 0usize;
        let mut updated = 0usize;
        let mut tally = |was_created: bool| {
            if was_created {
                created += 1;
            } else {
                updated += 1;
            }
        };

        for (day, bucket) in &bundle.time_series.daily {
            tally(self.db.upsert_metric(
                MetricType::AvgRating,
                *day,
                bucket.avg_rating,
                None,
            )?);
            tally(self.db.upsert_metric(
                MetricType::CulturalScore,
                *day,
                bucket.cultural_score,
                None,
            )?);
            tally(self.db.upsert_metric(
                MetricType::FeedbackCount,
                *day,
                bucket.count as f64,
                None,
            )?);
        }

        if !bundle.common_issues.is_empty() {
            let text = bundle
                .common_issues
                .iter()
                .map(|(issue, count)| format!("{}: {}", issue.as_str(), count))
                .collect::<Vec<_>>()
                .join("; ");
            tally(self.db.upsert_metric(
                MetricType::CommonIssue,
                to,
                bundle.common_issues.len() as f64,
                Some(&text),
            )?);
        }

        info!(
            created,
            updated,
            from = %from,
            to = %to,
            "analytics metrics refreshed"
        );

        Ok(MetricsUpdate {
            created,
            updated,
            from,
            to,
        })
    }
}
