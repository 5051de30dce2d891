use anyhow::{anyhow, Context};
use schemars::JsonSchema;
use serde::Deserialize;

pub const DEFAULT_SCHEME: &str = "splitter-loader";

pub const DEFAULT_MODULE_EXTENSIONS: [&str; 8] =
    [".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx", ".mts", ".cts"];

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_module_extensions() -> Vec<String> {
    DEFAULT_MODULE_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

/// A JSON serializable proxy for the SplitterConfig struct
///
/// This struct is used to deserialize the splitter configuration from a
/// config file with serde, before it is validated.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SplitterJSONConfig {
    /// Prefix of every import address the splitter writes, and of the
    /// content registry keys. The host routes addresses with this scheme
    /// back to the splitter.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Extensions of files that are split when reached through a bare
    /// package specifier. Files with other extensions are treated as
    /// assets and imported unchanged.
    ///
    /// Relative and absolute imports are always split.
    #[serde(default = "default_module_extensions")]
    pub module_extensions: Vec<String>,
}

impl Default for SplitterJSONConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            module_extensions: default_module_extensions(),
        }
    }
}

/// Validated configuration of a [`crate::Splitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    pub scheme: String,
    pub module_extensions: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            module_extensions: default_module_extensions(),
        }
    }
}

impl SplitterConfig {
    pub fn from_json_str(json: &str) -> Result<Self, anyhow::Error> {
        let raw: SplitterJSONConfig =
            serde_json::from_str(json).context("failed to parse splitter config")?;
        Self::try_from(raw)
    }
}

impl TryFrom<SplitterJSONConfig> for SplitterConfig {
    type Error = anyhow::Error;

    fn try_from(value: SplitterJSONConfig) -> Result<Self, Self::Error> {
        if value.scheme.is_empty() {
            return Err(anyhow!("scheme must not be empty"));
        }
        if let Some(reserved) = value.scheme.chars().find(|c| matches!(c, '?' | '!' | ':')) {
            return Err(anyhow!(
                "scheme '{}' must not contain '{}'",
                value.scheme,
                reserved
            ));
        }
        for ext in &value.module_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(anyhow!(
                    "module extension '{}' must start with a '.' followed by the extension",
                    ext
                ));
            }
        }

        Ok(SplitterConfig {
            scheme: value.scheme,
            module_extensions: value.module_extensions,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = SplitterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SplitterConfig::default());
        assert_eq!(config.scheme, "splitter-loader");
    }

    #[test]
    fn reads_camel_case_fields() {
        let config =
            SplitterConfig::from_json_str(r#"{"scheme":"split","moduleExtensions":[".js"]}"#)
                .unwrap();
        assert_eq!(
            config,
            SplitterConfig {
                scheme: "split".to_string(),
                module_extensions: vec![".js".to_string()],
            }
        );
    }

    #[test]
    fn rejects_reserved_scheme_characters() {
        for scheme in ["", "a:b", "a?b", "a!b"] {
            let result = SplitterConfig::try_from(SplitterJSONConfig {
                scheme: scheme.to_string(),
                ..Default::default()
            });
            assert!(result.is_err(), "scheme {:?} should be rejected", scheme);
        }
    }

    #[test]
    fn rejects_extensions_without_dot() {
        let result = SplitterConfig::from_json_str(r#"{"moduleExtensions":["js"]}"#);
        assert!(result.is_err());
    }
}
