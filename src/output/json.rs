//! JSON output formatting
//!
//! Serializes an [`ExperimentReport`] with one entry per distribution run.
//! Durations carry both microseconds and a human-readable form; timestamps
//! are RFC 3339 UTC.

use crate::coordinator::ExperimentReport;
use crate::distribution::DistributionKind;
use crate::stats::histogram::IntervalHistogram;
use crate::stats::CacheStatistics;
use crate::traffic::RunSummary;
use crate::util::time::format_duration;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            micros: d.as_micros() as u64,
            human: format_duration(d),
        }
    }
}

/// Scheduled wait statistics for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonIntervals {
    pub count: u64,
    pub total: JsonDuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<JsonDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<JsonDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50: Option<JsonDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p90: Option<JsonDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99: Option<JsonDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<JsonDuration>,
}

impl JsonIntervals {
    fn from_histogram(hist: &IntervalHistogram) -> Self {
        let json = |d: Option<Duration>| d.map(JsonDuration::from_duration);
        Self {
            count: hist.len(),
            total: JsonDuration::from_duration(hist.total()),
            min: json(hist.min()),
            mean: json(hist.mean()),
            p50: json(hist.percentile(50.0)),
            p90: json(hist.percentile(90.0)),
            p99: json(hist.percentile(99.0)),
            max: json(hist.max()),
        }
    }
}

/// Cache statistics with the derived totals spelled out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total: u64,
    pub hit_rate: f64,
    pub hit_rate_display: String,
}

impl From<CacheStatistics> for JsonCacheStats {
    fn from(stats: CacheStatistics) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            total: stats.total(),
            hit_rate: stats.hit_rate(),
            hit_rate_display: stats.hit_rate_display(),
        }
    }
}

/// One distribution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRun {
    pub distribution: DistributionKind,
    pub requested: u64,
    pub issued: u64,
    pub served: u64,
    pub empty: u64,
    pub abandoned: u64,
    pub cache: JsonCacheStats,
    pub elapsed: JsonDuration,
    pub intervals: JsonIntervals,
    pub cancelled: bool,
}

impl From<&RunSummary> for JsonRun {
    fn from(run: &RunSummary) -> Self {
        Self {
            distribution: run.distribution,
            requested: run.requested,
            issued: run.issued,
            served: run.served,
            empty: run.empty,
            abandoned: run.abandoned,
            cache: run.statistics.into(),
            elapsed: JsonDuration::from_duration(run.elapsed),
            intervals: JsonIntervals::from_histogram(&run.intervals),
            cancelled: run.cancelled,
        }
    }
}

/// Complete experiment report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub event_count: u64,
    pub query_count: u64,
    pub distributions: Vec<DistributionKind>,
    pub runs: Vec<JsonRun>,
}

impl From<&ExperimentReport> for JsonReport {
    fn from(report: &ExperimentReport) -> Self {
        Self {
            started_at: report.started_at,
            finished_at: report.finished_at,
            event_count: report.event_count,
            query_count: report.plan.query_count,
            distributions: report.plan.distributions.clone(),
            runs: report.runs.iter().map(JsonRun::from).collect(),
        }
    }
}

/// Write the report to `output_path`
pub fn write_json_output(output_path: &Path, report: &ExperimentReport, pretty: bool) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output: {}", output_path.display()))?;
    let writer = BufWriter::new(file);
    let json = JsonReport::from(report);

    if pretty {
        serde_json::to_writer_pretty(writer, &json)?;
    } else {
        serde_json::to_writer(writer, &json)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::ExperimentPlan;

    fn report() -> ExperimentReport {
        let mut intervals = IntervalHistogram::new();
        intervals.record(Duration::from_millis(250));
        intervals.record(Duration::ZERO);
        let run = RunSummary {
            distribution: DistributionKind::Uniform,
            requested: 2,
            issued: 2,
            served: 2,
            empty: 0,
            abandoned: 0,
            statistics: CacheStatistics { hits: 1, misses: 1 },
            intervals,
            elapsed: Duration::from_millis(250),
            cancelled: false,
        };
        let now = Utc::now();
        ExperimentReport {
            started_at: now,
            finished_at: now,
            event_count: 10,
            plan: ExperimentPlan {
                distributions: vec![DistributionKind::Uniform],
                query_count: 2,
            },
            runs: vec![run],
        }
    }

    #[test]
    fn test_json_duration() {
        let d = JsonDuration::from_duration(Duration::from_micros(2500));
        assert_eq!(d.micros, 2500);
        assert_eq!(d.human, "2.50ms");
    }

    #[test]
    fn test_report_fields() {
        let json = JsonReport::from(&report());
        let value = serde_json::to_value(&json).unwrap();

        assert_eq!(value["event_count"], 10);
        assert_eq!(value["distributions"][0], "uniform");
        let run = &value["runs"][0];
        assert_eq!(run["distribution"], "uniform");
        assert_eq!(run["cache"]["hit_rate_display"], "50.00%");
        assert_eq!(run["intervals"]["count"], 2);
        assert_eq!(run["intervals"]["min"]["micros"], 0);
    }

    #[test]
    fn test_empty_intervals_omitted() {
        let mut report = report();
        report.runs[0].intervals = IntervalHistogram::new();

        let value = serde_json::to_value(JsonReport::from(&report)).unwrap();
        let intervals = &value["runs"][0]["intervals"];
        assert_eq!(intervals["count"], 0);
        assert!(intervals.get("mean").is_none());
    }

    #[test]
    fn test_write_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_json_output(&path, &report(), true).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: JsonReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.runs.len(), 1);
        assert_eq!(parsed.runs[0].cache.hits, 1);
    }
}
