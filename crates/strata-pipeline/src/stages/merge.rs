//! Merge trees and boundary saliencies.
use strata_model::{JobSpec, OutputSpec, ValidityRule};

use super::StagePlan;
use crate::layout::ResultDir;

impl StagePlan {
    /// `merge_order_pb -s <segi> -p <boundary> -t <criterion> -o <order> -y <sal>`
    ///
    /// Both the tree and the saliency table must be valid for resume to skip
    /// an item.
    pub(super) fn merge_jobs(&self) -> Vec<JobSpec> {
        let criterion = self.config.params.merge.criterion.to_string();
        let program = self.config.bin("merge_order_pb");
        self.items
            .all()
            .map(|i| {
                let order = self.results.file(ResultDir::Order, i);
                let sal = self.results.file(ResultDir::Sal, i);
                JobSpec::new(i, &program, OutputSpec::new(&order).with_validity(ValidityRule::Table))
                    .path_opt("-s", &self.results.file(ResultDir::Segi, i))
                    .path_opt("-p", &self.inputs.boundary(i))
                    .opt("-t", criterion.as_str())
                    .path_opt("-o", &order)
                    .path_opt("-y", &sal)
                    .with_secondary(OutputSpec::new(sal).with_validity(ValidityRule::Table))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{args_of, plan};
    use crate::stages::Stage;
    use strata_model::ValidityRule;

    #[test]
    fn order_and_sal_are_both_checked() {
        let jobs = plan().jobs(Stage::OrderSal);
        let job = &jobs[1];
        assert_eq!(
            args_of(job),
            [
                "-s",
                "/res/segi/p2.png",
                "-p",
                "/in/chm/p2.mha",
                "-t",
                "1",
                "-o",
                "/res/order/p2.ssv",
                "-y",
                "/res/sal/p2.ssv",
            ]
        );
        let rules: Vec<_> = job.outputs().map(|o| &o.validity).collect();
        assert_eq!(rules, [&ValidityRule::Table, &ValidityRule::Table]);
    }
}
