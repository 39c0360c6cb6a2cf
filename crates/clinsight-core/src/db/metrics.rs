//! Analytics metric persistence.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{AnalyticsMetric, MetricType};

struct MetricRow {
    id: i64,
    metric_type: String,
    date: NaiveDate,
    value: f64,
    text_value: Option<String>,
}

impl TryFrom<MetricRow> for AnalyticsMetric {
    type Error = DbError;

    fn try_from(row: MetricRow) -> DbResult<AnalyticsMetric> {
        let metric_type = MetricType::parse(&row.metric_type).ok_or_else(|| {
            DbError::Constraint(format!("unknown metric type: {}", row.metric_type))
        })?;
        Ok(AnalyticsMetric {
            id: row.id,
            metric_type,
            date: row.date,
            value: row.value,
            text_value: row.text_value,
        })
    }
}

impl Database {
    /// Insert or overwrite the metric row for `(metric_type, date)`.
    ///
    /// Returns `true` when a new row was created, `false` when an existing
    /// row was updated.
    pub fn upsert_metric(
        &self,
        metric_type: MetricType,
        date: NaiveDate,
        value: f64,
        text_value: Option<&str>,
    ) -> DbResult<bool> {
        let existed: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM analytics_metrics WHERE metric_type = ?1 AND date = ?2",
                params![metric_type.as_str(), date.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        self.conn.execute(
            r#"
            INSERT INTO analytics_metrics (metric_type, date, value, text_value, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'))
            ON CONFLICT(metric_type, date) DO UPDATE SET
                value = excluded.value,
                text_value = excluded.text_value,
                updated_at = datetime('now')
            "#,
            params![metric_type.as_str(), date.to_string(), value, text_value],
        )?;

        Ok(existed.is_none())
    }

    /// Most recent date with any persisted metric, if one exists.
    pub fn latest_metric_date(&self) -> DbResult<Option<NaiveDate>> {
        let date: Option<NaiveDate> = self.conn.query_row(
            "SELECT MAX(date) FROM analytics_metrics",
            [],
            |row| row.get(0),
        )?;
        Ok(date)
    }

    /// One metric row by type and date.
    pub fn get_metric(
        &self,
        metric_type: MetricType,
        date: NaiveDate,
    ) -> DbResult<Option<AnalyticsMetric>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, metric_type, date, value, text_value
                 FROM analytics_metrics WHERE metric_type = ?1 AND date = ?2",
                params![metric_type.as_str(), date.to_string()],
                map_metric_row,
            )
            .optional()?;
        result.map(|row| row.try_into()).transpose()
    }

    /// Metric rows of one type within `[from, to]`, oldest first.
    pub fn list_metrics_between(
        &self,
        metric_type: MetricType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<AnalyticsMetric>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, metric_type, date, value, text_value
             FROM analytics_metrics
             WHERE metric_type = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date",
        )?;

        let rows = stmt.query_map(
            params![metric_type.as_str(), from.to_string(), to.to_string()],
            map_metric_row,
        )?;
        rows.map(|r| r.map_err(DbError::from).and_then(AnalyticsMetric::try_from))
            .collect()
    }
}

fn map_metric_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MetricRow> {
    Ok(MetricRow {
        id: row.get(0)?,
        metric_type: row.get(1)?,
        date: row.get(2)?,
        value: row.get(3)?,
        text_value: row.get(4)?,
    })
}
