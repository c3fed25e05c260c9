use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Item identifiers discovered from the training and test inputs.
///
/// Ids are file stems (basename without extension) in discovery order.
/// The set is fixed after construction and shared read-only by every stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIds {
    training: Vec<String>,
    test: Vec<String>,
}

impl ItemIds {
    /// Build the set from explicit id lists.
    ///
    /// An id may appear only once across both partitions; otherwise two jobs
    /// of the same stage would write the same output file.
    pub fn new(training: Vec<String>, test: Vec<String>) -> ModelResult<Self> {
        let mut seen = HashSet::with_capacity(training.len() + test.len());
        for id in training.iter().chain(test.iter()) {
            if id.is_empty() {
                return Err(ModelError::Invalid("item id cannot be empty".into()));
            }
            if !seen.insert(id.as_str()) {
                return Err(ModelError::DuplicateItem(id.clone()));
            }
        }
        Ok(Self { training, test })
    }

    /// Build the set from discovered file paths, keeping their order.
    pub fn from_paths(training: &[PathBuf], test: &[PathBuf]) -> ModelResult<Self> {
        let stems = |paths: &[PathBuf]| -> ModelResult<Vec<String>> {
            paths.iter().map(|p| stem_of(p)).collect()
        };
        Self::new(stems(training)?, stems(test)?)
    }

    pub fn training(&self) -> &[String] {
        &self.training
    }

    pub fn test(&self) -> &[String] {
        &self.test
    }

    /// Training ids followed by test ids.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.training
            .iter()
            .chain(self.test.iter())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.training.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn stem_of(path: &Path) -> ModelResult<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .ok_or_else(|| ModelError::Invalid(format!("no usable file stem in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_training_then_test() {
        let ids = ItemIds::new(vec!["p1".into(), "p2".into()], vec!["p9".into()]).unwrap();
        let all: Vec<&str> = ids.all().collect();
        assert_eq!(all, ["p1", "p2", "p9"]);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn from_paths_strips_directory_and_extension() {
        let training = vec![PathBuf::from("/data/gray/p1.mha"), PathBuf::from("/data/gray/p2.mha")];
        let test = vec![PathBuf::from("/data/gray_test/t7.mha")];

        let ids = ItemIds::from_paths(&training, &test).unwrap();
        assert_eq!(ids.training(), ["p1", "p2"]);
        assert_eq!(ids.test(), ["t7"]);
    }

    #[test]
    fn id_shared_between_partitions_is_rejected() {
        let err = ItemIds::new(vec!["p1".into()], vec!["p1".into()]).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateItem(id) if id == "p1"));
    }
}
