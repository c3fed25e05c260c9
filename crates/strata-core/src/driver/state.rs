use std::fmt;

/// Lifecycle of one job inside a batch.
///
/// ```text
/// Pending -> Skipped
/// Pending -> Running -> Succeeded | Failed
/// Pending -> Failed                (canceled before start)
/// ```
/// Terminal states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Skipped,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Skipped | JobState::Succeeded | JobState::Failed)
    }

    /// Whether `self -> next` is an edge of the job state machine.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Pending, JobState::Skipped)
                | (JobState::Pending, JobState::Running)
                | (JobState::Pending, JobState::Failed)
                | (JobState::Running, JobState::Succeeded)
                | (JobState::Running, JobState::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Skipped => "skipped",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::JobState::{self, *};

    const ALL: [JobState; 5] = [Pending, Skipped, Running, Succeeded, Failed];

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn running_is_only_reachable_from_pending() {
        for from in ALL {
            assert_eq!(from.can_transition_to(Running), from == Pending);
        }
    }

    #[test]
    fn skipped_never_follows_running() {
        assert!(!Running.can_transition_to(Skipped));
        assert!(Pending.can_transition_to(Skipped));
    }
}
