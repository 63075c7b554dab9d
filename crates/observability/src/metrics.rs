//! Uplink metric recording and aggregation
//!
//! Counter/gauge/histogram names are prefixed `uplink_` and labelled by
//! sensor, lane or endpoint so a single Prometheus scrape covers every
//! device feed.

use std::collections::HashMap;

use contracts::{RawSignal, SignalDescriptor};
use metrics::{counter, gauge, histogram};

/// Record one raw signal accepted from the sensor layer
pub fn record_signal_received(device_id: &str, sensor_id: &str, kind: &str) {
    counter!(
        "uplink_signals_received_total",
        "device_id" => device_id.to_string(),
        "sensor_id" => sensor_id.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record one signal rejected by descriptor validation
pub fn record_signal_rejected(sensor_id: &str) {
    counter!(
        "uplink_signals_rejected_total",
        "sensor_id" => sensor_id.to_string()
    )
    .increment(1);
}

/// Record a payload handed to a send lane ("raw" / "derived")
pub fn record_payload_scheduled(kind: &'static str) {
    counter!("uplink_payloads_scheduled_total", "kind" => kind).increment(1);
}

/// Record a payload dropped on a full lane queue
pub fn record_payload_dropped(lane: &'static str) {
    counter!("uplink_payloads_dropped_total", "lane" => lane).increment(1);
}

/// Record the outcome of one endpoint send
pub fn record_send_result(endpoint: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "uplink_sends_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a credential fetch failure for one send
pub fn record_auth_failure(endpoint: &str) {
    counter!(
        "uplink_auth_failures_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}

/// Record one inference outcome ("prediction" / "empty" / "failure" / "timeout")
pub fn record_inference_outcome(outcome: &'static str) {
    counter!("uplink_inference_outcomes_total", "outcome" => outcome).increment(1);
}

/// Record inference wall time
pub fn record_inference_latency_ms(latency_ms: f64) {
    histogram!("uplink_inference_latency_ms").record(latency_ms);
}

/// Record the depth of a lane queue
pub fn record_queue_depth(lane: &'static str, depth: usize) {
    gauge!("uplink_queue_depth", "lane" => lane).set(depth as f64);
}

/// In-memory aggregator for end-of-run summaries
///
/// Updated per signal from the feed callback; independent of the Prometheus
/// recorder so summaries work in runs with metrics disabled.
#[derive(Debug, Clone, Default)]
pub struct UplinkMetricsAggregator {
    /// Total signals observed
    pub total_signals: u64,

    /// Signals rejected by validation
    pub total_rejected: u64,

    /// Signal counts per sensor
    pub sensor_counts: HashMap<String, u64>,

    /// Scalar sample statistics per sensor (bpm, percent, celsius)
    pub sample_stats: HashMap<String, RunningStats>,

    /// Time-bucket distribution
    pub bucket_counts: HashMap<&'static str, u64>,
}

impl UplinkMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics from one signal
    pub fn update(&mut self, descriptor: &SignalDescriptor, signal: &RawSignal) {
        self.total_signals += 1;

        *self
            .sensor_counts
            .entry(descriptor.sensor_id.to_string())
            .or_insert(0) += 1;

        *self
            .bucket_counts
            .entry(descriptor.time_bucket.as_str())
            .or_insert(0) += 1;

        if let Some(value) = signal.scalar() {
            self.sample_stats
                .entry(descriptor.sensor_id.to_string())
                .or_default()
                .push(value);
        }
    }

    /// Count one rejected signal
    pub fn record_rejected(&mut self) {
        self.total_rejected += 1;
    }

    /// Produce a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_signals: self.total_signals,
            total_rejected: self.total_rejected,
            rejection_rate: if self.total_signals + self.total_rejected > 0 {
                self.total_rejected as f64 / (self.total_signals + self.total_rejected) as f64
                    * 100.0
            } else {
                0.0
            },
            sensor_counts: self.sensor_counts.clone(),
            sample_stats: self
                .sample_stats
                .iter()
                .map(|(k, v)| (k.clone(), StatsSummary::from(v)))
                .collect(),
            bucket_counts: self.bucket_counts.clone(),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary report for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_signals: u64,
    pub total_rejected: u64,
    pub rejection_rate: f64,
    pub sensor_counts: HashMap<String, u64>,
    pub sample_stats: HashMap<String, StatsSummary>,
    pub bucket_counts: HashMap<&'static str, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Uplink Metrics Summary ===")?;
        writeln!(f, "Total signals: {}", self.total_signals)?;
        writeln!(
            f,
            "Rejected signals: {} ({:.2}%)",
            self.total_rejected, self.rejection_rate
        )?;

        if !self.sensor_counts.is_empty() {
            writeln!(f, "Signals per sensor:")?;
            for (sensor, count) in &self.sensor_counts {
                writeln!(f, "  {}: {}", sensor, count)?;
            }
        }

        if !self.sample_stats.is_empty() {
            writeln!(f, "Sample statistics:")?;
            for (sensor, stats) in &self.sample_stats {
                writeln!(f, "  {}: {}", sensor, stats)?;
            }
        }

        if !self.bucket_counts.is_empty() {
            writeln!(f, "Time buckets:")?;
            for (bucket, count) in &self.bucket_counts {
                writeln!(f, "  {}: {}", bucket, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum value
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum value
    pub fn max(&self) -> f64 {
        self.max
    }
}
