use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Rule deciding whether an output file counts as finished work.
///
/// Used twice: before a job runs (resume pre-filter) and right after it
/// reports success (postcondition).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidityRule {
    /// File exists, whatever its size.
    Exists,
    /// File exists and is not empty.
    #[default]
    NonEmpty,
    /// Whitespace-separated numeric table with a constant column count.
    Table,
    /// File starts with the PNG signature.
    Png,
    /// Check registered by name at driver construction time.
    Named(String),
    /// Never checked; the output is informational only.
    Unchecked,
}

impl fmt::Display for ValidityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityRule::Exists => f.write_str("exists"),
            ValidityRule::NonEmpty => f.write_str("non-empty"),
            ValidityRule::Table => f.write_str("table"),
            ValidityRule::Png => f.write_str("png"),
            ValidityRule::Named(name) => write!(f, "named:{name}"),
            ValidityRule::Unchecked => f.write_str("unchecked"),
        }
    }
}

impl FromStr for ValidityRule {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("named:") {
            if name.is_empty() {
                return Err(ModelError::UnknownValidity(s.to_string()));
            }
            return Ok(ValidityRule::Named(name.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "exists" => Ok(ValidityRule::Exists),
            "non-empty" | "nonempty" | "" => Ok(ValidityRule::NonEmpty),
            "table" | "ssv" => Ok(ValidityRule::Table),
            "png" => Ok(ValidityRule::Png),
            "unchecked" | "none" => Ok(ValidityRule::Unchecked),
            other => Err(ModelError::UnknownValidity(other.to_string())),
        }
    }
}
