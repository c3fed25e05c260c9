//! Output validity checks.
//!
//! A [`ValidityRule`] on an [`OutputSpec`] names *what* to check; the
//! [`CheckRegistry`] maps it to an [`OutputCheck`] that knows *how*. Custom
//! checks are registered under a name and referenced with `ValidityRule::Named`.
mod builtin;
pub use builtin::{ExistsCheck, NonEmptyCheck, PngCheck, TableCheck};

use std::{collections::HashMap, path::Path, sync::Arc};

use strata_model::{JobSpec, OutputSpec, ValidityRule};
use tracing::trace;

use crate::error::CoreError;

/// Predicate deciding whether a file on disk is a finished output.
///
/// Must be cheap enough to run once per output before and after every job.
pub trait OutputCheck: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, path: &Path) -> bool;
}

/// Resolves validity rules to checks.
#[derive(Clone)]
pub struct CheckRegistry {
    exists: Arc<dyn OutputCheck>,
    non_empty: Arc<dyn OutputCheck>,
    table: Arc<dyn OutputCheck>,
    png: Arc<dyn OutputCheck>,
    named: HashMap<String, Arc<dyn OutputCheck>>,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRegistry {
    /// Registry with the built-in checks and no named ones.
    pub fn new() -> Self {
        Self {
            exists: Arc::new(ExistsCheck),
            non_empty: Arc::new(NonEmptyCheck),
            table: Arc::new(TableCheck),
            png: Arc::new(PngCheck),
            named: HashMap::new(),
        }
    }

    /// Register a custom check reachable through `ValidityRule::Named(name)`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        check: Arc<dyn OutputCheck>,
    ) -> Result<(), CoreError> {
        let name = name.into();
        if self.named.contains_key(&name) {
            return Err(CoreError::DuplicateCheck(name));
        }
        self.named.insert(name, check);
        Ok(())
    }

    /// Check for `rule`; `None` for [`ValidityRule::Unchecked`].
    pub fn resolve(&self, rule: &ValidityRule) -> Result<Option<&Arc<dyn OutputCheck>>, CoreError> {
        let check = match rule {
            ValidityRule::Exists => &self.exists,
            ValidityRule::NonEmpty => &self.non_empty,
            ValidityRule::Table => &self.table,
            ValidityRule::Png => &self.png,
            ValidityRule::Named(name) => self
                .named
                .get(name)
                .ok_or_else(|| CoreError::UnknownCheck(name.clone()))?,
            ValidityRule::Unchecked => return Ok(None),
        };
        Ok(Some(check))
    }

    /// `true` if the output passes its rule. Unchecked outputs always pass.
    pub fn is_valid(&self, output: &OutputSpec) -> Result<bool, CoreError> {
        let Some(check) = self.resolve(&output.validity)? else {
            return Ok(true);
        };
        let ok = check.check(&output.path);
        trace!(path = %output.path.display(), check = check.name(), ok, "output checked");
        Ok(ok)
    }

    /// `true` if every checked output of `job` is valid.
    pub fn job_satisfied(&self, job: &JobSpec) -> Result<bool, CoreError> {
        for output in job.outputs() {
            if !self.is_valid(output)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// First output of `job` that fails its rule, as a human-readable reason.
    pub fn first_invalid(&self, job: &JobSpec) -> Result<Option<String>, CoreError> {
        for output in job.outputs() {
            if !self.is_valid(output)? {
                return Ok(Some(format!(
                    "output {} failed {} check",
                    output.path.display(),
                    output.validity
                )));
            }
        }
        Ok(None)
    }

    /// Fail early if any job references a named check that is not registered.
    pub fn ensure_resolvable<'a>(
        &self,
        jobs: impl IntoIterator<Item = &'a JobSpec>,
    ) -> Result<(), CoreError> {
        for job in jobs {
            for output in job.outputs() {
                self.resolve(&output.validity)?;
            }
        }
        Ok(())
    }
}
