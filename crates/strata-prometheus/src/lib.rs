//! Prometheus metrics backend for the strata batch driver.
//!
//! [`PrometheusMetrics`] implements [`strata_core::MetricsBackend`]. Batch runs
//! are short-lived, so there is no scrape endpoint: the binary renders the
//! text exposition with [`PrometheusMetrics::encode_text`] and writes it to a
//! file for node-exporter's textfile collector or for inspection.
//!
//! ## Metrics
//! - `strata_jobs_started_total{stage}` - Counter
//! - `strata_jobs_completed_total{stage, outcome}` - Counter
//! - `strata_jobs_skipped_total{stage}` - Counter
//! - `strata_job_duration_seconds{stage}` - Histogram
mod backend;
pub use backend::PrometheusMetrics;
