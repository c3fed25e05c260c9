use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Suffix of the HOST state entry holding a layer's data status.
const DATA_STATE_SUFFIX: &str = "::data";

/// Opaque identifier of a HOST-owned layer.
///
/// The HOST exposes the data status of a layer under the state key
/// `"<id>::data"`; see [`LayerId::state_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayerId(String);

impl LayerId {
    /// Create a layer id. Empty or whitespace-only ids are rejected.
    pub fn new(id: impl Into<String>) -> ModelResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::Invalid("layer id cannot be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// State key under which the HOST publishes this layer's [`LayerStatus`].
    pub fn state_key(&self) -> String {
        format!("{}{DATA_STATE_SUFFIX}", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LayerId {
    type Error = ModelError;
    fn try_from(s: String) -> ModelResult<Self> {
        Self::new(s)
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> Self {
        id.0
    }
}

/// Data status of a HOST layer.
///
/// Reads of a layer are only meaningful once it is [`LayerStatus::Available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerStatus {
    /// Layer is being allocated; no data yet.
    Creating,
    /// A filter is writing into the layer.
    Processing,
    /// Layer data is locked by another operation.
    InUse,
    /// Layer data is complete.
    Available,
    /// The producing operation failed.
    Error,
}

impl LayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerStatus::Creating => "creating",
            LayerStatus::Processing => "processing",
            LayerStatus::InUse => "in_use",
            LayerStatus::Available => "available",
            LayerStatus::Error => "error",
        }
    }
}

impl fmt::Display for LayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerStatus {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creating" => Ok(LayerStatus::Creating),
            "processing" => Ok(LayerStatus::Processing),
            "in_use" | "inuse" | "in-use" => Ok(LayerStatus::InUse),
            "available" => Ok(LayerStatus::Available),
            "error" => Ok(LayerStatus::Error),
            other => Err(ModelError::UnknownLayerStatus(other.to_string())),
        }
    }
}
