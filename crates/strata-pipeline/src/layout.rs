//! File naming for inputs and results.
//!
//! Every path a stage reads or writes is derived from an item id here, so job
//! builders never format paths by hand.
use std::path::{Path, PathBuf};

use crate::{
    config::InputDirs,
    discovery::{IMAGE_EXT, LABEL_EXT},
};

/// Subdirectory of the results root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultDir {
    /// Watershed superpixels.
    Segii,
    SegiiTest,
    /// Pre-merged superpixels.
    Segi,
    SegiTest,
    /// Merge trees.
    Order,
    /// Merge saliencies.
    Sal,
    /// Boundary features.
    Bcf,
    /// Boundary labels.
    Bcl,
    /// Boundary classifier model.
    Bcm,
    /// Boundary predictions.
    Bcp,
    /// Final segmentations.
    Seg,
    SegTest,
}

impl ResultDir {
    pub const ALL: [ResultDir; 12] = [
        ResultDir::Segii,
        ResultDir::SegiiTest,
        ResultDir::Segi,
        ResultDir::SegiTest,
        ResultDir::Order,
        ResultDir::Sal,
        ResultDir::Bcf,
        ResultDir::Bcl,
        ResultDir::Bcm,
        ResultDir::Bcp,
        ResultDir::Seg,
        ResultDir::SegTest,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResultDir::Segii => "segii",
            ResultDir::SegiiTest => "segiitest",
            ResultDir::Segi => "segi",
            ResultDir::SegiTest => "segitest",
            ResultDir::Order => "order",
            ResultDir::Sal => "sal",
            ResultDir::Bcf => "bcf",
            ResultDir::Bcl => "bcl",
            ResultDir::Bcm => "bcm",
            ResultDir::Bcp => "bcp",
            ResultDir::Seg => "seg",
            ResultDir::SegTest => "segtest",
        }
    }

    /// Extension of per-item files: label images are png, tables are ssv.
    pub fn ext(&self) -> &'static str {
        match self {
            ResultDir::Order | ResultDir::Sal | ResultDir::Bcf | ResultDir::Bcl | ResultDir::Bcp => {
                "ssv"
            }
            ResultDir::Bcm => "bin",
            _ => LABEL_EXT,
        }
    }
}

/// Paths under the results root.
#[derive(Debug, Clone)]
pub struct ResultLayout {
    root: PathBuf,
}

impl ResultLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, dir: ResultDir) -> PathBuf {
        self.root.join(dir.name())
    }

    /// `<root>/<dir>/<item>.<ext>`
    pub fn file(&self, dir: ResultDir, item: &str) -> PathBuf {
        self.dir(dir).join(format!("{item}.{}", dir.ext()))
    }

    /// The single trained model, `<root>/bcm/bcm.bin`.
    pub fn model(&self) -> PathBuf {
        self.dir(ResultDir::Bcm).join("bcm.bin")
    }

    /// Padded copy written next to a segmentation, `<item>_pad.png`.
    pub fn padded(&self, dir: ResultDir, item: &str) -> PathBuf {
        self.dir(dir).join(format!("{item}_pad.{LABEL_EXT}"))
    }
}

/// Paths of per-item inputs.
#[derive(Debug, Clone)]
pub struct InputLayout {
    dirs: InputDirs,
}

impl InputLayout {
    pub fn new(dirs: InputDirs) -> Self {
        Self { dirs }
    }

    /// Raw grayscale image, looked up across training and test.
    pub fn gray_all(&self, item: &str) -> PathBuf {
        self.dirs.gray_all.join(format!("{item}.{IMAGE_EXT}"))
    }

    /// Boundary probability map.
    pub fn boundary(&self, item: &str) -> PathBuf {
        self.dirs.boundary.join(format!("{item}.{IMAGE_EXT}"))
    }

    /// Blurred boundary probability map.
    pub fn blurred(&self, item: &str) -> PathBuf {
        self.dirs.blurred.join(format!("{item}.{IMAGE_EXT}"))
    }

    pub fn truth(&self, item: &str) -> PathBuf {
        self.dirs.truth.join(format!("{item}.{LABEL_EXT}"))
    }

    pub fn dirs(&self) -> &InputDirs {
        &self.dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_files_follow_directory_kind() {
        let res = ResultLayout::new("/res");
        assert_eq!(res.file(ResultDir::Segii, "p1"), PathBuf::from("/res/segii/p1.png"));
        assert_eq!(res.file(ResultDir::Sal, "p1"), PathBuf::from("/res/sal/p1.ssv"));
        assert_eq!(res.file(ResultDir::SegTest, "t3"), PathBuf::from("/res/segtest/t3.png"));
        assert_eq!(res.model(), PathBuf::from("/res/bcm/bcm.bin"));
        assert_eq!(res.padded(ResultDir::Seg, "p1"), PathBuf::from("/res/seg/p1_pad.png"));
    }

    #[test]
    fn directory_names_are_unique() {
        let mut names: Vec<_> = ResultDir::ALL.iter().map(ResultDir::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ResultDir::ALL.len());
    }

    #[test]
    fn input_files_use_expected_extensions() {
        let inputs = InputLayout::new(InputDirs {
            gray_training: "/in/gray".into(),
            gray_test: "/in/gray_test".into(),
            gray_all: "/in/gray_all".into(),
            boundary: "/in/chm".into(),
            blurred: "/in/chm-blur".into(),
            truth: "/in/truth".into(),
        });
        assert_eq!(inputs.gray_all("p1"), PathBuf::from("/in/gray_all/p1.mha"));
        assert_eq!(inputs.blurred("p1"), PathBuf::from("/in/chm-blur/p1.mha"));
        assert_eq!(inputs.truth("p1"), PathBuf::from("/in/truth/p1.png"));
    }
}
