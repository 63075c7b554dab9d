//! Pipeline statistics and metrics.

use std::time::Duration;

use dispatcher::DispatchSnapshot;
use observability::UplinkMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Signals the dispatcher accepted
    pub signals_accepted: u64,

    /// Signals rejected by descriptor validation
    pub signals_rejected: u64,

    /// Number of sensor sources that were active
    pub active_sensors: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Final dispatch counters
    pub dispatch: DispatchSnapshot,

    /// Per-sensor sample aggregates
    pub uplink_metrics: UplinkMetricsAggregator,
}

impl PipelineStats {
    /// Calculate signals per second throughput
    pub fn signals_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.signals_accepted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate drop rate across both lanes as percentage
    #[allow(dead_code)]
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dispatch.raw_dropped + self.dispatch.predict_dropped;
        let total = self.dispatch.total_scheduled() + dropped;
        if total > 0 {
            (dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Signals accepted: {}", self.signals_accepted);
        println!("  Signals rejected: {}", self.signals_rejected);
        println!("  Rate: {:.2}/s", self.signals_per_sec());
        println!("  Active sensors: {}", self.active_sensors);

        println!("\nDispatch");
        println!("  Raw scheduled: {}", self.dispatch.raw_scheduled);
        println!("  Derived scheduled: {}", self.dispatch.derived_scheduled);
        println!("  Sends completed: {}", self.dispatch.sends_completed);
        println!("  Send failures: {}", self.dispatch.send_failures);
        println!("  Auth failures: {}", self.dispatch.auth_failures);
        println!(
            "  Dropped (raw/predict): {}/{}",
            self.dispatch.raw_dropped, self.dispatch.predict_dropped
        );

        println!("\nInference");
        println!("  Predictions: {}", self.dispatch.predictions);
        println!("  Empty: {}", self.dispatch.inference_empty);
        println!("  Failures: {}", self.dispatch.inference_failures);
        println!("  Timeouts: {}", self.dispatch.inference_timeouts);

        println!("\n{}", self.uplink_metrics.summary());
    }
}
