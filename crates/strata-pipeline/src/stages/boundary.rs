//! Boundary classifier: features, labels, training and prediction.
use std::path::Path;

use strata_model::{JobSpec, OutputSpec, ValidityRule};

use super::{StagePlan, bool_arg, float_arg};
use crate::layout::ResultDir;

/// Job id of the single training job.
pub(crate) const TRAIN_JOB: &str = "bcm";

impl StagePlan {
    /// `bc_feat` over every item. Ray features are taken from the raw image
    /// and the boundary map with the same binning.
    pub(super) fn feature_jobs(&self) -> Vec<JobSpec> {
        let p = &self.config.params.features;
        let program = self.config.bin("bc_feat");
        let ray = |job: JobSpec, image: &Path| {
            job.path_opt("--rbi", image)
                .opt("--rbb", p.ray_bins.to_string())
                .opt("--rbl", float_arg(p.ray_lower))
                .opt("--rbu", float_arg(p.ray_upper))
        };
        self.items
            .all()
            .map(|i| {
                let out = self.results.file(ResultDir::Bcf, i);
                let boundary = self.inputs.boundary(i);
                let job = JobSpec::new(i, &program, OutputSpec::new(&out).with_validity(ValidityRule::Table))
                    .path_opt("-s", &self.results.file(ResultDir::Segi, i))
                    .path_opt("-o", &self.results.file(ResultDir::Order, i))
                    .path_opt("-y", &self.results.file(ResultDir::Sal, i));
                let job = ray(ray(job, &self.inputs.gray_all(i)), &boundary);
                job.path_opt("--pb", &boundary)
                    .opt("--s0", float_arg(p.s0))
                    .opt("--sb", float_arg(p.sb))
                    .arg("--bt")
                    .args(p.boundary_thresholds.iter().map(u32::to_string))
                    .opt("-n", "false")
                    .opt("-l", "false")
                    .opt("--simpf", "false")
                    .path_opt("-b", &out)
            })
            .collect()
    }

    /// `bc_label_ri` over training items; test items have no ground truth.
    pub(super) fn label_jobs(&self) -> Vec<JobSpec> {
        let p = &self.config.params.labels;
        let program = self.config.bin("bc_label_ri");
        self.items
            .training()
            .iter()
            .map(|i| {
                let out = self.results.file(ResultDir::Bcl, i);
                JobSpec::new(i, &program, OutputSpec::new(&out).with_validity(ValidityRule::Table))
                    .path_opt("-s", &self.results.file(ResultDir::Segi, i))
                    .path_opt("-o", &self.results.file(ResultDir::Order, i))
                    .path_opt("-t", &self.inputs.truth(i))
                    .opt("--f1", bool_arg(p.f1))
                    .opt("-d", float_arg(p.threshold))
                    .opt("-g", p.background.to_string())
                    .opt("-p", "false")
                    .opt("-w", "false")
                    .path_opt("-l", &out)
            })
            .collect()
    }

    /// One `train_rf` job over all training features and labels.
    pub(super) fn train_jobs(&self) -> Vec<JobSpec> {
        let p = &self.config.params.training;
        let model = self.results.model();
        let mut job = JobSpec::new(
            TRAIN_JOB,
            self.config.bin("train_rf"),
            OutputSpec::new(&model),
        )
        .opt("--nt", p.trees.to_string())
        .opt("--mt", p.mtry.to_string())
        .opt("--sr", float_arg(p.sample_ratio))
        .opt("--ns", p.node_size.to_string())
        .opt("--bal", bool_arg(p.balance))
        .path_opt("--m", &model);
        for i in self.items.training() {
            job = job
                .path_opt("--f", &self.results.file(ResultDir::Bcf, i))
                .path_opt("--l", &self.results.file(ResultDir::Bcl, i));
        }
        vec![job]
    }

    /// `pred_rf --m <model> --l -1 --f <bcf> --p <bcp>` over every item.
    pub(super) fn predict_jobs(&self) -> Vec<JobSpec> {
        let model = self.results.model();
        let program = self.config.bin("pred_rf");
        self.items
            .all()
            .map(|i| {
                let out = self.results.file(ResultDir::Bcp, i);
                JobSpec::new(i, &program, OutputSpec::new(&out).with_validity(ValidityRule::Table))
                    .path_opt("--m", &model)
                    .opt("--l", "-1")
                    .path_opt("--f", &self.results.file(ResultDir::Bcf, i))
                    .path_opt("--p", &out)
            })
            .collect()
    }
}
