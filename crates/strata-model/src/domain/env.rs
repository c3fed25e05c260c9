use serde::{Deserialize, Serialize};

use crate::KeyValue;

/// Ordered list of environment variables for a job.
///
/// Later entries win on lookup, so merging is plain concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(pub Vec<KeyValue>);

impl Env {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Resolve a variable, returning the last binding for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key() == key)
            .map(|kv| kv.value())
    }

    /// Append a binding; it overrides earlier ones with the same key.
    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(KeyValue::new(key, value));
    }

    /// Concatenate `other` after `self`, so `other` takes precedence.
    pub fn merged(&self, other: &Env) -> Env {
        let mut out = self.0.clone();
        out.extend(other.0.iter().cloned());
        Env(out)
    }
}

#[cfg(test)]
mod tests {
    use super::Env;

    #[test]
    fn last_binding_wins() {
        let mut env = Env::new();
        env.push("OMP_NUM_THREADS", "1");
        env.push("ITK_DIR", "/opt/itk");
        env.push("OMP_NUM_THREADS", "8");

        assert_eq!(env.get("OMP_NUM_THREADS"), Some("8"));
        assert_eq!(env.get("ITK_DIR"), Some("/opt/itk"));
        assert!(env.get("MISSING").is_none());
    }

    #[test]
    fn merged_prefers_other() {
        let mut base = Env::new();
        base.push("A", "base");
        base.push("B", "keep");

        let mut job = Env::new();
        job.push("A", "job");

        let merged = base.merged(&job);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("A"), Some("job"));
        assert_eq!(merged.get("B"), Some("keep"));
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut env = Env::new();
        env.push("A", "1");
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.starts_with('['));

        let back: Env = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }
}
