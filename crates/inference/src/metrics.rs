use crate::error::Stage;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::time::Duration;

/// Classification metrics. Without a global meter provider these are no-ops.
pub struct PipelineMetrics {
    duration: Histogram<f64>,
    classifications: Counter<u64>,
    failures: Counter<u64>,
    predictions: Counter<u64>,
}

impl PipelineMetrics {
    pub fn new(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let latency_buckets = [
            0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0,
        ];

        let duration = meter
            .f64_histogram("classification_duration_seconds")
            .with_description("Time to classify one image (decode through ranking)")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build();
        let classifications = meter
            .u64_counter("classifications_total")
            .with_description("Images classified successfully")
            .build();
        let failures = meter
            .u64_counter("classification_failures_total")
            .with_description("Classifications aborted, by failing stage")
            .build();
        let predictions = meter
            .u64_counter("classification_predictions_total")
            .with_description("Labels returned above the threshold")
            .build();

        Self {
            duration,
            classifications,
            failures,
            predictions,
        }
    }

    pub fn record_success(&self, elapsed: Duration, predictions: usize) {
        self.duration.record(elapsed.as_secs_f64(), &[]);
        self.classifications.add(1, &[]);
        self.predictions.add(predictions as u64, &[]);
    }

    pub fn record_failure(&self, stage: Stage) {
        self.failures.add(1, &[KeyValue::new("stage", stage.as_str())]);
    }
}
