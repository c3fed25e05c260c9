use std::{fmt, time::Duration};

use strata_model::StageName;
use tracing::error;

use crate::{driver::JobState, metrics::JobOutcome};

/// Final record of one job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Position of the job in the submitted batch.
    pub index: usize,
    pub job_id: String,
    pub state: JobState,
    /// `None` for skipped jobs.
    pub outcome: Option<JobOutcome>,
    pub reason: Option<String>,
    /// `true` once the job was handed to the executor.
    pub started: bool,
    pub duration: Duration,
}

impl JobRecord {
    pub(crate) fn pending(index: usize, job_id: &str) -> Self {
        Self {
            index,
            job_id: job_id.to_string(),
            state: JobState::Pending,
            outcome: None,
            reason: None,
            started: false,
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn advance(&mut self, next: JobState) -> bool {
        if !self.state.can_transition_to(next) {
            error!(job = %self.job_id, from = %self.state, to = %next, "illegal job transition ignored");
            return false;
        }
        self.state = next;
        true
    }

    pub(crate) fn skip(&mut self) {
        self.advance(JobState::Skipped);
    }

    pub(crate) fn start(&mut self) {
        self.started = self.advance(JobState::Running);
    }

    pub(crate) fn cancel_before_start(&mut self) {
        if self.advance(JobState::Failed) {
            self.outcome = Some(JobOutcome::Canceled);
            self.reason = Some("canceled before start".into());
        }
    }

    pub(crate) fn finish(&mut self, outcome: JobOutcome, reason: Option<String>, duration: Duration) {
        let next = if outcome.is_success() {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        if self.advance(next) {
            self.outcome = Some(outcome);
            self.reason = reason;
            self.duration = duration;
        }
    }
}

/// Outcome of one batch: every job with its terminal state.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub stage: StageName,
    pub records: Vec<JobRecord>,
    pub elapsed: Duration,
    /// Cancellation was requested while the batch ran.
    pub canceled: bool,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    fn count(&self, state: JobState) -> usize {
        self.records.iter().filter(|r| r.state == state).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(JobState::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(JobState::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(JobState::Skipped)
    }

    /// Jobs handed to the executor.
    pub fn executed(&self) -> usize {
        self.records.iter().filter(|r| r.started).count()
    }

    /// Conjunction of all job outcomes; skipped jobs count as success.
    pub fn is_success(&self) -> bool {
        self.records
            .iter()
            .all(|r| matches!(r.state, JobState::Succeeded | JobState::Skipped))
    }

    /// Non-empty batch where resume dropped every job.
    pub fn fully_skipped(&self) -> bool {
        !self.records.is_empty() && self.skipped() == self.records.len()
    }

    pub fn failed_jobs(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.state == JobState::Failed)
            .map(|r| r.job_id.as_str())
            .collect()
    }

    pub fn record(&self, job_id: &str) -> Option<&JobRecord> {
        self.records.iter().find(|r| r.job_id == job_id)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stage {}: {} jobs, {} ran, {} succeeded, {} failed, {} skipped",
            self.stage,
            self.total(),
            self.executed(),
            self.succeeded(),
            self.failed(),
            self.skipped(),
        )?;
        if self.fully_skipped() {
            f.write_str(" (all outputs present)")?;
        }
        if self.canceled {
            f.write_str(" (canceled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(records: Vec<JobRecord>) -> BatchReport {
        BatchReport {
            stage: "bcf".into(),
            records,
            elapsed: Duration::from_secs(1),
            canceled: false,
        }
    }

    #[test]
    fn counts_follow_terminal_states() {
        let mut ok = JobRecord::pending(0, "p1");
        ok.start();
        ok.finish(JobOutcome::Success, None, Duration::from_millis(5));

        let mut bad = JobRecord::pending(1, "p2");
        bad.start();
        bad.finish(JobOutcome::InvalidOutput, Some("empty".into()), Duration::ZERO);

        let mut skip = JobRecord::pending(2, "p3");
        skip.skip();

        let r = report(vec![ok, bad, skip]);
        assert_eq!((r.succeeded(), r.failed(), r.skipped(), r.executed()), (1, 1, 1, 2));
        assert!(!r.is_success());
        assert_eq!(r.failed_jobs(), ["p2"]);
        assert_eq!(
            r.to_string(),
            "stage bcf: 3 jobs, 2 ran, 1 succeeded, 1 failed, 1 skipped"
        );
    }

    #[test]
    fn fully_skipped_batch_is_successful_and_flagged() {
        let mut a = JobRecord::pending(0, "p1");
        a.skip();
        let r = report(vec![a]);
        assert!(r.is_success());
        assert!(r.fully_skipped());
        assert!(r.to_string().ends_with("(all outputs present)"));

        let empty = report(Vec::new());
        assert!(empty.is_success());
        assert!(!empty.fully_skipped());
    }

    #[test]
    fn terminal_record_ignores_later_transitions() {
        let mut r = JobRecord::pending(0, "p1");
        r.skip();
        r.start();
        assert_eq!(r.state, JobState::Skipped);
        assert!(!r.started);
    }

    #[test]
    fn cancel_before_start_is_a_failure() {
        let mut r = JobRecord::pending(0, "p1");
        r.cancel_before_start();
        assert_eq!(r.state, JobState::Failed);
        assert_eq!(r.outcome, Some(JobOutcome::Canceled));
        assert!(!r.started);
    }
}
