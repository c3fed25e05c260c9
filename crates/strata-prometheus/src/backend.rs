use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use strata_core::{JobOutcome, MetricsBackend};

const NAMESPACE: &str = "strata";

/// Classifier jobs run from seconds (feature extraction on small slices) to
/// hours (forest training).
const DURATION_BUCKETS: &[f64] = &[1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 14400.0];

/// Prometheus metrics backend.
///
/// Labels are bounded: `stage` is one of the pipeline stage names and
/// `outcome` one of the [`JobOutcome`] labels.
#[derive(Clone)]
pub struct PrometheusMetrics {
    jobs_started: CounterVec,
    jobs_completed: CounterVec,
    jobs_skipped: CounterVec,
    job_duration: HistogramVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let jobs_started = CounterVec::new(
            Opts::new("jobs_started_total", "Jobs handed to the executor").namespace(NAMESPACE),
            &["stage"],
        )?;
        registry.register(Box::new(jobs_started.clone()))?;

        let jobs_completed = CounterVec::new(
            Opts::new("jobs_completed_total", "Jobs that reached a terminal state after running")
                .namespace(NAMESPACE),
            &["stage", "outcome"],
        )?;
        registry.register(Box::new(jobs_completed.clone()))?;

        let jobs_skipped = CounterVec::new(
            Opts::new("jobs_skipped_total", "Jobs dropped by resume because outputs were valid")
                .namespace(NAMESPACE),
            &["stage"],
        )?;
        registry.register(Box::new(jobs_skipped.clone()))?;

        let job_duration = HistogramVec::new(
            HistogramOpts::new("job_duration_seconds", "Job wall clock time in seconds")
                .namespace(NAMESPACE)
                .buckets(DURATION_BUCKETS.to_vec()),
            &["stage"],
        )?;
        registry.register(Box::new(job_duration.clone()))?;

        Ok(Self {
            jobs_started,
            jobs_completed,
            jobs_skipped,
            job_duration,
            registry,
        })
    }

    /// Backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_job_started(&self, stage: &str) {
        self.jobs_started.with_label_values(&[stage]).inc();
    }

    fn record_job_completed(&self, stage: &str, outcome: JobOutcome, duration_ms: u64) {
        self.jobs_completed
            .with_label_values(&[stage, outcome.as_label()])
            .inc();
        self.job_duration
            .with_label_values(&[stage])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_job_skipped(&self, stage: &str) {
        self.jobs_skipped.with_label_values(&[stage]).inc();
    }
}
