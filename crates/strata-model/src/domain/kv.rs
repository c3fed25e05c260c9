use serde::{Deserialize, Serialize};

/// Single environment variable handed to an external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    key: String,
    value: String,
}

impl KeyValue {
    /// Create a new variable binding.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Variable name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Variable value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<(&str, &str)> for KeyValue {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::KeyValue;

    #[test]
    fn tuple_conversion_keeps_both_sides() {
        let kv: KeyValue = ("OMP_NUM_THREADS", "4").into();
        assert_eq!(kv.key(), "OMP_NUM_THREADS");
        assert_eq!(kv.value(), "4");
    }

    #[test]
    fn serde_uses_camel_case_fields() {
        let kv = KeyValue::new("A", "b");
        let json = serde_json::to_string(&kv).unwrap();
        assert_eq!(json, r#"{"key":"A","value":"b"}"#);
    }
}
