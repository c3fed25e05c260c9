//! Final greedy segmentation.
use strata_model::{JobSpec, OutputSpec, ValidityRule};

use super::{StagePlan, float_arg};
use crate::layout::ResultDir;

impl StagePlan {
    /// `segment_greedy -s <segi> -o <order> -p <bcp> -t <threshold> -r true -u true -f <seg> --toi <segtest>`
    pub(super) fn segment_jobs(&self) -> Vec<JobSpec> {
        let threshold = float_arg(self.config.params.segment.threshold);
        let program = self.config.bin("segment_greedy");
        self.items
            .all()
            .map(|i| {
                let out = self.results.file(ResultDir::Seg, i);
                let toi = self.results.file(ResultDir::SegTest, i);
                JobSpec::new(i, &program, OutputSpec::new(&out).with_validity(ValidityRule::Png))
                    .path_opt("-s", &self.results.file(ResultDir::Segi, i))
                    .path_opt("-o", &self.results.file(ResultDir::Order, i))
                    .path_opt("-p", &self.results.file(ResultDir::Bcp, i))
                    .opt("-t", threshold.as_str())
                    .opt("-r", "true")
                    .opt("-u", "true")
                    .path_opt("-f", &out)
                    .path_opt("--toi", &toi)
                    .with_secondary(OutputSpec::new(toi).with_validity(ValidityRule::Unchecked))
            })
            .collect()
    }
}
