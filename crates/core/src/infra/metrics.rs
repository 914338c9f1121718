use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::domain::error::ErrorCode;
use crate::domain::ingest::BatchReport;
use crate::domain::types::TokenUsage;

/// Latency records kept in memory
const MAX_LATENCY_RECORDS: usize = 1000;

/// In-process metrics collector
pub struct Metrics {
    counters: Mutex<MetricsCounters>,
    latencies: Mutex<Vec<LatencyRecord>>,
}

#[derive(Debug, Default)]
struct MetricsCounters {
    requests_succeeded: u64,
    uploads_succeeded: u64,
    files_processed: u64,
    files_failed: u64,
    files_skipped: u64,
    input_tokens: u64,
    output_tokens: u64,
    cost_usd: f64,
    errors: BTreeMap<&'static str, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRecord {
    pub phase: String,
    pub duration_ms: u64,
    pub timestamp: String,
}

/// Snapshot returned by the metrics operation
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub requests_succeeded: u64,
    pub uploads_succeeded: u64,
    pub files: FileCounts,
    pub tokens: TokenTotals,
    pub total_cost_usd: f64,
    pub error_counts: BTreeMap<&'static str, u64>,
    pub avg_latency_ms: AvgLatency,
    pub recent_latencies: Vec<LatencyRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileCounts {
    pub processed: u64,
    pub failed: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenTotals {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvgLatency {
    pub rewrite: Option<f64>,
    pub upload: Option<f64>,
    pub folder_pass: Option<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(MetricsCounters::default()),
            latencies: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_requests_succeeded(&self) {
        self.counters.lock().unwrap().requests_succeeded += 1;
    }

    pub fn inc_uploads_succeeded(&self) {
        self.counters.lock().unwrap().uploads_succeeded += 1;
    }

    pub fn inc_error(&self, code: ErrorCode) {
        *self
            .counters
            .lock()
            .unwrap()
            .errors
            .entry(code.as_str())
            .or_insert(0) += 1;
    }

    /// Adds one completion call's usage and cost.
    pub fn record_usage(&self, usage: &TokenUsage, cost_usd: f64) {
        let mut c = self.counters.lock().unwrap();
        c.input_tokens += usage.input_tokens;
        c.output_tokens += usage.output_tokens;
        c.cost_usd += cost_usd;
    }

    pub fn record_batch(&self, report: &BatchReport) {
        let mut c = self.counters.lock().unwrap();
        c.files_processed += report.processed as u64;
        c.files_failed += report.failed as u64;
        c.files_skipped += report.skipped as u64;
    }

    pub fn record_latency(&self, phase: &str, duration_ms: u64) {
        let record = LatencyRecord {
            phase: phase.to_string(),
            duration_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut latencies = self.latencies.lock().unwrap();
        latencies.push(record);
        if latencies.len() > MAX_LATENCY_RECORDS {
            let excess = latencies.len() - MAX_LATENCY_RECORDS;
            latencies.drain(0..excess);
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let c = self.counters.lock().unwrap();
        let latencies = self.latencies.lock().unwrap();

        let avg = |phase: &str| -> Option<f64> {
            let vals: Vec<f64> = latencies
                .iter()
                .filter(|r| r.phase == phase)
                .map(|r| r.duration_ms as f64)
                .collect();
            if vals.is_empty() {
                None
            } else {
                Some(vals.iter().sum::<f64>() / vals.len() as f64)
            }
        };

        let recent: Vec<LatencyRecord> = latencies.iter().rev().take(20).cloned().collect();

        MetricsSummary {
            requests_succeeded: c.requests_succeeded,
            uploads_succeeded: c.uploads_succeeded,
            files: FileCounts {
                processed: c.files_processed,
                failed: c.files_failed,
                skipped: c.files_skipped,
            },
            tokens: TokenTotals {
                input: c.input_tokens,
                output: c.output_tokens,
                total: c.input_tokens + c.output_tokens,
            },
            total_cost_usd: (c.cost_usd * 1_000_000.0).round() / 1_000_000.0,
            error_counts: c.errors.clone(),
            avg_latency_ms: AvgLatency {
                rewrite: avg("rewrite"),
                upload: avg("upload"),
                folder_pass: avg("folder_pass"),
            },
            recent_latencies: recent,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingest::FileReport;

    #[test]
    fn test_counters() {
        let m = Metrics::new();
        m.inc_requests_succeeded();
        m.inc_requests_succeeded();
        m.inc_uploads_succeeded();
        m.inc_error(ErrorCode::Validation);
        m.inc_error(ErrorCode::Validation);
        m.inc_error(ErrorCode::Upstream);

        let s = m.summary();
        assert_eq!(s.requests_succeeded, 2);
        assert_eq!(s.uploads_succeeded, 1);
        assert_eq!(s.error_counts.get("E_VALIDATION"), Some(&2));
        assert_eq!(s.error_counts.get("E_UPSTREAM"), Some(&1));
        assert_eq!(s.error_counts.get("E_STORAGE"), None);
    }

    #[test]
    fn test_usage_totals() {
        let m = Metrics::new();
        m.record_usage(&TokenUsage::new(100, 50), 0.00125);
        m.record_usage(&TokenUsage::new(10, 5), 0.000125);

        let s = m.summary();
        assert_eq!(s.tokens.input, 110);
        assert_eq!(s.tokens.output, 55);
        assert_eq!(s.tokens.total, 165);
        assert!((s.total_cost_usd - 0.001375).abs() < 1e-12);
    }

    #[test]
    fn test_batch_counts() {
        let m = Metrics::new();
        m.record_batch(&BatchReport::from_results(vec![
            FileReport::success("a".into(), "o".into(), Some("m".into()), "c".into()),
            FileReport::error("b".into(), "boom".into(), None),
            FileReport::skipped("c".into(), "too short".into()),
            FileReport::skipped("d".into(), "too short".into()),
        ]));

        let s = m.summary();
        assert_eq!(s.files.processed, 1);
        assert_eq!(s.files.failed, 1);
        assert_eq!(s.files.skipped, 2);
    }

    #[test]
    fn test_latency_recording() {
        let m = Metrics::new();
        m.record_latency("rewrite", 120);
        m.record_latency("rewrite", 80);
        m.record_latency("upload", 200);

        let s = m.summary();
        assert!((s.avg_latency_ms.rewrite.unwrap() - 100.0).abs() < f64::EPSILON);
        assert!((s.avg_latency_ms.upload.unwrap() - 200.0).abs() < f64::EPSILON);
        assert!(s.avg_latency_ms.folder_pass.is_none());
        assert_eq!(s.recent_latencies.len(), 3);
        assert_eq!(s.recent_latencies[0].phase, "upload");
    }

    #[test]
    fn test_latency_cap() {
        let m = Metrics::new();
        for i in 0..1100 {
            m.record_latency("rewrite", i);
        }
        let latencies = m.latencies.lock().unwrap();
        assert_eq!(latencies.len(), MAX_LATENCY_RECORDS);
        assert_eq!(latencies[0].duration_ms, 100);
    }
}
