//! Optional image-tool stages around the classifier: boundary blurring before
//! it, segmentation padding after it.
use strata_model::{JobSpec, OutputSpec, ValidityRule};

use super::StagePlan;
use crate::layout::ResultDir;

/// Directory, job id suffix and output pixel type of each padded set.
const PAD_TARGETS: [(ResultDir, &str, &str); 2] = [
    (ResultDir::Seg, "", "ushort"),
    (ResultDir::SegTest, ".test", "uchar"),
];

impl StagePlan {
    /// `blur_image --inputImage=<boundary> --outputImage=<blurred> --sigma= --kernelWidth=`
    /// for every discovered boundary map.
    pub(super) fn blur_jobs(&self) -> Vec<JobSpec> {
        let p = &self.config.params.blur;
        let program = self.config.tool("blur_image");
        let out_dir = &self.inputs.dirs().blurred;
        self.boundary
            .iter()
            .filter_map(|input| {
                let name = input.file_name()?;
                let id = input.file_stem()?.to_string_lossy().into_owned();
                let out = out_dir.join(name);
                Some(
                    JobSpec::new(id, &program, OutputSpec::new(&out))
                        .arg(format!("--inputImage={}", input.display()))
                        .arg(format!("--outputImage={}", out.display()))
                        .arg(format!("--sigma={}", p.sigma))
                        .arg(format!("--kernelWidth={}", p.kernel_width)),
                )
            })
            .collect()
    }

    /// `PadImage <in> <out> <bounds..> <pixel type>` for each final
    /// segmentation and its test-output twin.
    pub(super) fn pad_jobs(&self) -> Vec<JobSpec> {
        let bounds = self.config.params.pad.bounds;
        let program = self.config.tool("PadImage");
        PAD_TARGETS
            .iter()
            .flat_map(move |(dir, suffix, pixel)| {
                self.items.all().map(move |i| (*dir, format!("{i}{suffix}"), i, *pixel))
            })
            .map(|(dir, id, i, pixel)| {
                let input = self.results.file(dir, i);
                let out = self.results.padded(dir, i);
                JobSpec::new(id, &program, OutputSpec::new(&out).with_validity(ValidityRule::Png))
                    .arg(input.to_string_lossy())
                    .arg(out.to_string_lossy())
                    .args(bounds.iter().map(u32::to_string))
                    .arg(pixel)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{args_of, plan, program_of};
    use crate::stages::Stage;
    use std::path::Path;

    #[test]
    fn blur_writes_into_blurred_dir() {
        let jobs = plan().jobs(Stage::Blur);
        assert_eq!(jobs.len(), 3);
        let job = &jobs[0];
        assert_eq!(job.id, "p1");
        assert_eq!(program_of(job), Path::new("/tools/blur_image"));
        assert_eq!(
            args_of(job),
            [
                "--inputImage=/in/chm/p1.mha",
                "--outputImage=/in/chm-blur/p1.mha",
                "--sigma=1",
                "--kernelWidth=3",
            ]
        );
    }

    #[test]
    fn pad_covers_seg_and_segtest() {
        let jobs = plan().jobs(Stage::Pad);
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "t1", "p1.test", "p2.test", "t1.test"]);
        assert_eq!(
            args_of(&jobs[0]),
            ["/res/seg/p1.png", "/res/seg/p1_pad.png", "0", "0", "0", "59", "0", "ushort"]
        );
        assert_eq!(args_of(&jobs[3]).last(), Some(&"uchar"));
        assert_eq!(program_of(&jobs[3]), Path::new("/tools/PadImage"));
    }
}
