mod domain;
pub use domain::{Env, Flag, ItemIds, KeyValue, LayerId, LayerStatus, StageName, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod job;
pub use job::{JobSpec, OutputSpec, ValidityRule};

mod policy;
pub use policy::{BatchPolicy, CancelMode};
