//! Watershed superpixels and their pre-merging.
use strata_model::{JobSpec, OutputSpec, ValidityRule};

use super::{StagePlan, float_arg};
use crate::layout::ResultDir;

impl StagePlan {
    /// `watershed -i <blurred> -l <level> -t <threshold> -u true -o <segii> --toi <segiitest>`
    pub(super) fn watershed_jobs(&self) -> Vec<JobSpec> {
        let p = &self.config.params.watershed;
        let program = self.config.bin("watershed");
        self.items
            .all()
            .map(|i| {
                let out = self.results.file(ResultDir::Segii, i);
                let toi = self.results.file(ResultDir::SegiiTest, i);
                JobSpec::new(i, &program, OutputSpec::new(&out).with_validity(ValidityRule::Png))
                    .path_opt("-i", &self.inputs.blurred(i))
                    .opt("-l", float_arg(p.water_level))
                    .opt("-t", float_arg(p.threshold))
                    .opt("-u", "true")
                    .path_opt("-o", &out)
                    .path_opt("--toi", &toi)
                    .with_secondary(OutputSpec::new(toi).with_validity(ValidityRule::Unchecked))
            })
            .collect()
    }

    /// `pre_merge -s <segii> -p <boundary> -t <small> <large> -b <boundary threshold> ...`
    pub(super) fn pre_merge_jobs(&self) -> Vec<JobSpec> {
        let p = &self.config.params.pre_merge;
        let program = self.config.bin("pre_merge");
        self.items
            .all()
            .map(|i| {
                let out = self.results.file(ResultDir::Segi, i);
                let toi = self.results.file(ResultDir::SegiTest, i);
                JobSpec::new(i, &program, OutputSpec::new(&out).with_validity(ValidityRule::Png))
                    .path_opt("-s", &self.results.file(ResultDir::Segii, i))
                    .path_opt("-p", &self.inputs.boundary(i))
                    .arg("-t")
                    .args(p.size_thresholds.iter().map(u32::to_string))
                    .opt("-b", float_arg(p.boundary_threshold))
                    .opt("-r", "true")
                    .opt("-u", "true")
                    .path_opt("-o", &out)
                    .path_opt("--toi", &toi)
                    .with_secondary(OutputSpec::new(toi).with_validity(ValidityRule::Unchecked))
            })
            .collect()
    }
}
