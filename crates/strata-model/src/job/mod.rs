mod validity;
pub use validity::ValidityRule;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    Env,
    error::{ModelError, ModelResult},
};

/// File a job is expected to produce, with the rule used to judge it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub validity: ValidityRule,
}

impl OutputSpec {
    /// Output judged by the default rule (exists with non-zero size).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            validity: ValidityRule::default(),
        }
    }

    pub fn with_validity(mut self, validity: ValidityRule) -> Self {
        self.validity = validity;
        self
    }

    /// `true` if this output takes part in resume and postcondition checks.
    pub fn is_checked(&self) -> bool {
        !matches!(self.validity, ValidityRule::Unchecked)
    }
}

/// One external command invocation within a stage.
///
/// `id` names the item the job works on and is unique within a batch.
/// Output paths are owned exclusively by this job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub id: String,
    pub program: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Env::is_empty")]
    pub env: Env,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    pub output: OutputSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<OutputSpec>,
}

impl JobSpec {
    /// Start a job for item `id` running `program` and writing `output`.
    pub fn new(id: impl Into<String>, program: impl Into<PathBuf>, output: OutputSpec) -> Self {
        Self {
            id: id.into(),
            program: program.into(),
            args: Vec::new(),
            env: Env::default(),
            cwd: None,
            output,
            secondary: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a flag followed by its value, e.g. `-o <path>`.
    pub fn opt(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Append a flag followed by a path value.
    pub fn path_opt(self, flag: &str, path: &Path) -> Self {
        self.opt(flag, path.to_string_lossy())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_secondary(mut self, output: OutputSpec) -> Self {
        self.secondary = Some(output);
        self
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// All declared outputs, primary first.
    pub fn outputs(&self) -> impl Iterator<Item = &OutputSpec> {
        std::iter::once(&self.output).chain(self.secondary.iter())
    }

    /// Program followed by its arguments, as they will be passed to the OS.
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Reject jobs that cannot possibly run.
    ///
    /// Rules:
    /// - `id` is not empty;
    /// - `program` is not empty;
    /// - primary and secondary outputs differ.
    pub fn validate(&self) -> ModelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ModelError::Invalid("job id cannot be empty".into()));
        }
        if self.program.as_os_str().is_empty() {
            return Err(ModelError::Invalid(format!(
                "job '{}' has an empty program",
                self.id
            )));
        }
        if let Some(secondary) = &self.secondary {
            if secondary.path == self.output.path {
                return Err(ModelError::Invalid(format!(
                    "job '{}' declares {} twice",
                    self.id,
                    self.output.path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watershed() -> JobSpec {
        JobSpec::new("p1", "/opt/glia/watershed", OutputSpec::new("/res/segii/p1.png"))
            .path_opt("-i", Path::new("/in/pbb/p1.mha"))
            .opt("-l", "0.008")
            .with_secondary(
                OutputSpec::new("/res/segiitest/p1.png").with_validity(ValidityRule::Unchecked),
            )
    }

    #[test]
    fn command_line_starts_with_program() {
        let job = watershed();
        assert_eq!(
            job.command_line(),
            ["/opt/glia/watershed", "-i", "/in/pbb/p1.mha", "-l", "0.008"]
        );
    }

    #[test]
    fn outputs_lists_primary_first() {
        let job = watershed();
        let paths: Vec<_> = job.outputs().map(|o| o.path.clone()).collect();
        assert_eq!(paths[0], PathBuf::from("/res/segii/p1.png"));
        assert_eq!(paths[1], PathBuf::from("/res/segiitest/p1.png"));
        assert!(!job.secondary.as_ref().unwrap().is_checked());
    }

    #[test]
    fn validate_rejects_empty_program_and_shared_output() {
        let empty = JobSpec::new("p1", "", OutputSpec::new("/a"));
        assert!(empty.validate().is_err());

        let shared = JobSpec::new("p1", "tool", OutputSpec::new("/a")).with_secondary(OutputSpec::new("/a"));
        assert!(shared.validate().is_err());

        assert!(watershed().validate().is_ok());
    }

    #[test]
    fn serde_defaults_optional_parts() {
        let json = r#"{"id":"p1","program":"tool","output":{"path":"/a"}}"#;
        let job: JobSpec = serde_json::from_str(json).unwrap();
        assert!(job.args.is_empty());
        assert!(job.secondary.is_none());
        assert_eq!(job.output.validity, ValidityRule::NonEmpty);
    }
}
