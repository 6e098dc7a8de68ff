use docpack_markup::Serializer;
use serde::{Deserialize, Serialize};

/// Package behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Write dirty trees back when leaving a tree session instead of
    /// dropping them
    pub write_back_on_exit: bool,

    /// Indent unit for formatted write-back
    pub indent: String,

    /// Log a warning whenever unsaved edits are dropped at a boundary
    pub warn_on_discard: bool,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            write_back_on_exit: false,
            indent: "  ".to_string(),
            warn_on_discard: true,
        }
    }
}

impl PackageConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub(crate) fn formatting_serializer(&self) -> Serializer {
        Serializer::with_indent(&self.indent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = PackageConfig::from_json(r#"{ "write_back_on_exit": true }"#).unwrap();
        assert!(config.write_back_on_exit);
        assert_eq!(config.indent, "  ");
        assert!(config.warn_on_discard);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(PackageConfig::from_json("{}").unwrap(), PackageConfig::default());
    }
}
