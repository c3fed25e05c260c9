use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence for run identifiers.
static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_seq() -> u64 {
    RUN_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Build a run id used to correlate logs of one job execution.
///
/// Format: `{stage}-{item}-{seq:x}`.
pub fn make_run_id(stage: &str, item: &str) -> String {
    format!("{stage}-{item}-{seq:x}", seq = next_seq())
}
