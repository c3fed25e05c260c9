use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use strata_model::{BatchPolicy, JobSpec, StageName};

use crate::error::CoreError;

/// Jobs of one stage plus the policy they run under.
///
/// Construction enforces the batch invariants: valid policy, valid jobs,
/// unique job ids, and no output path declared by two jobs. Jobs must not
/// read each other's outputs; dependent work belongs in a later batch.
#[derive(Debug, Clone)]
pub struct Batch {
    stage: StageName,
    jobs: Vec<JobSpec>,
    policy: BatchPolicy,
}

impl Batch {
    pub fn new(
        stage: impl Into<StageName>,
        jobs: Vec<JobSpec>,
        policy: BatchPolicy,
    ) -> Result<Self, CoreError> {
        let stage = stage.into();
        if stage.trim().is_empty() {
            return Err(CoreError::InvalidBatch("stage name cannot be empty".into()));
        }
        policy.validate()?;

        let mut ids = HashSet::with_capacity(jobs.len());
        let mut owners: HashMap<&Path, &str> = HashMap::with_capacity(jobs.len() * 2);
        for job in &jobs {
            job.validate()?;
            if !ids.insert(job.id.as_str()) {
                return Err(CoreError::DuplicateJob(job.id.clone()));
            }
            for output in job.outputs() {
                if let Some(first) = owners.insert(output.path.as_path(), job.id.as_str()) {
                    return Err(CoreError::DuplicateOutput {
                        path: output.path.clone(),
                        first: first.to_string(),
                        second: job.id.clone(),
                    });
                }
            }
        }

        Ok(Self { stage, jobs, policy })
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn jobs(&self) -> &[JobSpec] {
        &self.jobs
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(crate) fn into_parts(self) -> (StageName, Vec<JobSpec>, BatchPolicy) {
        (self.stage, self.jobs, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_model::OutputSpec;

    fn job(id: &str, out: &str) -> JobSpec {
        JobSpec::new(id, "tool", OutputSpec::new(out))
    }

    #[test]
    fn accepts_disjoint_outputs() {
        let b = Batch::new(
            "segi",
            vec![job("p1", "/r/p1.png"), job("p2", "/r/p2.png")],
            BatchPolicy::with_concurrency(2),
        )
        .unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b.stage(), "segi");
    }

    #[test]
    fn rejects_shared_output_path() {
        let a = job("p1", "/r/p1.png");
        let b = job("p2", "/r/p2.png").with_secondary(OutputSpec::new("/r/p1.png"));

        match Batch::new("segi", vec![a, b], BatchPolicy::default()) {
            Err(CoreError::DuplicateOutput { first, second, .. }) => {
                assert_eq!(first, "p1");
                assert_eq!(second, "p2");
            }
            other => panic!("expected DuplicateOutput, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_ids_and_bad_policy() {
        let dup = Batch::new(
            "segi",
            vec![job("p1", "/r/a"), job("p1", "/r/b")],
            BatchPolicy::default(),
        );
        assert!(matches!(dup, Err(CoreError::DuplicateJob(id)) if id == "p1"));

        let zero = Batch::new("segi", vec![job("p1", "/r/a")], BatchPolicy::with_concurrency(0));
        assert!(matches!(zero, Err(CoreError::Model(_))));

        let unnamed = Batch::new(" ", Vec::new(), BatchPolicy::default());
        assert!(matches!(unnamed, Err(CoreError::InvalidBatch(_))));
    }
}
