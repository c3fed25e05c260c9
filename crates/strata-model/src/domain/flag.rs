use std::fmt;

use serde::{Deserialize, Serialize};

/// Boolean switch with explicit enable/disable semantics.
///
/// Serialized as a bare `true`/`false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(bool);

impl Flag {
    pub const fn enabled() -> Self {
        Self(true)
    }

    pub const fn disabled() -> Self {
        Self(false)
    }

    pub const fn is_enabled(&self) -> bool {
        self.0
    }

    pub const fn is_disabled(&self) -> bool {
        !self.0
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl From<Flag> for bool {
    fn from(f: Flag) -> Self {
        f.0
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "on" } else { "off" })
    }
}

#[cfg(test)]
mod tests {
    use super::Flag;

    #[test]
    fn default_is_disabled() {
        assert!(Flag::default().is_disabled());
    }

    #[test]
    fn converts_to_and_from_bool() {
        let on: Flag = true.into();
        assert!(on.is_enabled());
        assert!(!bool::from(Flag::disabled()));
    }

    #[test]
    fn serde_is_transparent() {
        assert_eq!(serde_json::to_string(&Flag::enabled()).unwrap(), "true");
        let back: Flag = serde_json::from_str("false").unwrap();
        assert!(back.is_disabled());
    }
}
