mod kv;
pub use kv::KeyValue;

mod env;
pub use env::Env;

mod flag;
pub use flag::Flag;

mod layer;
pub use layer::{LayerId, LayerStatus};

mod items;
pub use items::ItemIds;

/// Name of one pipeline stage (e.g. `"segii"`, `"bcf"`).
///
/// Used as the batch label in reports, logs and metrics.
pub type StageName = String;

/// Timeout value in milliseconds.
pub type TimeoutMs = u64;
