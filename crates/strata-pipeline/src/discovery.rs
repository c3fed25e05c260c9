//! Input discovery.
//!
//! Item identifiers are the stems of the grayscale training and test images.
//! Every required input category must be non-empty before any job is built.
use std::{
    fs,
    path::{Path, PathBuf},
};

use strata_model::ItemIds;
use tracing::{debug, info};

use crate::{
    config::InputDirs,
    error::{PipelineError, PipelineResult},
};

pub const IMAGE_EXT: &str = "mha";
pub const LABEL_EXT: &str = "png";

/// Regular files in `dir` whose extension matches `ext` case-insensitively,
/// sorted by path so discovery order is stable across runs.
pub fn list_files(dir: &Path, ext: &str) -> PipelineResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), ext, count = files.len(), "listed inputs");
    Ok(files)
}

/// Result of scanning the input directories.
#[derive(Debug, Clone)]
pub struct Discovered {
    pub items: ItemIds,
    pub boundary: Vec<PathBuf>,
    /// Empty until checked; see [`Discovered::check_blurred`].
    pub blurred: Vec<PathBuf>,
    pub truth: Vec<PathBuf>,
}

impl Discovered {
    /// Scan all categories. With `expect_blurred` false the blurred maps are
    /// not inspected yet, because a blur stage will produce them.
    pub fn scan(inputs: &InputDirs, expect_blurred: bool) -> PipelineResult<Self> {
        let training = require(&inputs.gray_training, IMAGE_EXT, "grayscale training")?;
        let test = require(&inputs.gray_test, IMAGE_EXT, "grayscale test")?;
        let boundary = require(&inputs.boundary, IMAGE_EXT, "boundary")?;
        let truth = require(&inputs.truth, LABEL_EXT, "ground truth")?;

        let items = ItemIds::from_paths(&training, &test)
            .map_err(|e| PipelineError::Discovery(e.to_string()))?;

        let mut found = Self {
            items,
            boundary,
            blurred: Vec::new(),
            truth,
        };
        if expect_blurred {
            found.check_blurred(inputs)?;
        }
        info!(
            training = found.items.training().len(),
            test = found.items.test().len(),
            boundary = found.boundary.len(),
            "inputs discovered"
        );
        Ok(found)
    }

    /// Require the blurred maps and one per boundary map.
    pub fn check_blurred(&mut self, inputs: &InputDirs) -> PipelineResult<()> {
        let blurred = require(&inputs.blurred, IMAGE_EXT, "blurred boundary")?;
        if blurred.len() != self.boundary.len() {
            return Err(PipelineError::Discovery(format!(
                "require same number of boundary and blurred boundary files ({} vs {})",
                self.boundary.len(),
                blurred.len()
            )));
        }
        self.blurred = blurred;
        Ok(())
    }
}

fn require(dir: &Path, ext: &str, what: &str) -> PipelineResult<Vec<PathBuf>> {
    let files = list_files(dir, ext)?;
    if files.is_empty() {
        return Err(PipelineError::Discovery(format!(
            "missing {what} files (*.{ext}) in {}",
            dir.display()
        )));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn touch(dir: &Path, names: &[&str]) {
        fs::create_dir_all(dir).unwrap();
        for n in names {
            fs::write(dir.join(n), b"x").unwrap();
        }
    }

    fn inputs(root: &Path) -> InputDirs {
        InputDirs {
            gray_training: root.join("gray"),
            gray_test: root.join("gray_test"),
            gray_all: root.join("gray_all"),
            boundary: root.join("chm"),
            blurred: root.join("chm-blur"),
            truth: root.join("truth"),
        }
    }

    fn populate(root: &Path) {
        touch(&root.join("gray"), &["p2.mha", "p1.MHA", "notes.txt"]);
        touch(&root.join("gray_test"), &["t1.mha"]);
        touch(&root.join("gray_all"), &["p1.mha", "p2.mha", "t1.mha"]);
        touch(&root.join("chm"), &["p1.mha", "p2.mha", "t1.mha"]);
        touch(&root.join("chm-blur"), &["p1.mha", "p2.mha", "t1.mha"]);
        touch(&root.join("truth"), &["p1.png", "p2.png"]);
    }

    #[test]
    fn list_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["b.mha", "a.mha", "c.png"]);
        fs::create_dir(dir.path().join("d.mha")).unwrap();

        let files = list_files(dir.path(), "mha").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.mha", "b.mha"]);
    }

    #[test]
    fn items_come_from_gray_stems() {
        let root = tempfile::tempdir().unwrap();
        populate(root.path());

        let found = Discovered::scan(&inputs(root.path()), true).unwrap();
        assert_eq!(found.items.training(), ["p1", "p2"]);
        assert_eq!(found.items.test(), ["t1"]);
        assert_eq!(found.items.all().collect::<Vec<_>>(), ["p1", "p2", "t1"]);
        assert_eq!(found.blurred.len(), 3);
    }

    #[test]
    fn empty_category_fails_fast() {
        let root = tempfile::tempdir().unwrap();
        populate(root.path());
        fs::remove_file(root.path().join("truth/p1.png")).unwrap();
        fs::remove_file(root.path().join("truth/p2.png")).unwrap();

        let err = Discovered::scan(&inputs(root.path()), true).unwrap_err();
        assert!(matches!(&err, PipelineError::Discovery(m) if m.contains("ground truth")), "{err}");
    }

    #[test]
    fn blurred_count_must_match_boundary_count() {
        let root = tempfile::tempdir().unwrap();
        populate(root.path());
        fs::remove_file(root.path().join("chm-blur/t1.mha")).unwrap();

        assert!(matches!(
            Discovered::scan(&inputs(root.path()), true),
            Err(PipelineError::Discovery(_))
        ));
    }

    #[test]
    fn blurred_check_can_be_deferred() {
        let root = tempfile::tempdir().unwrap();
        populate(root.path());
        fs::remove_dir_all(root.path().join("chm-blur")).unwrap();

        let mut found = Discovered::scan(&inputs(root.path()), false).unwrap();
        assert!(found.blurred.is_empty());

        touch(&root.path().join("chm-blur"), &["p1.mha", "p2.mha", "t1.mha"]);
        found.check_blurred(&inputs(root.path())).unwrap();
        assert_eq!(found.blurred.len(), 3);
    }
}
