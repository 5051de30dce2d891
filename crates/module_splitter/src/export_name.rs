use std::{fmt::Display, path::PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The binding a fragment is produced for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RequestedExport {
    /// A single binding. The default export is `Named("default")`.
    Named(String),
    /// The fragment holding every `let`/`var` declaration and control-flow
    /// statement of a file.
    SideEffects,
    /// Matches every binding. Requested by namespace imports,
    /// `export * as ns from` and dynamic `import()`.
    Namespace,
}

impl RequestedExport {
    pub fn named(name: impl Into<String>) -> Self {
        RequestedExport::Named(name.into())
    }

    pub fn default_export() -> Self {
        RequestedExport::Named("default".to_string())
    }

    /// True if a binding exported as `name` belongs in this request's fragment.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            RequestedExport::Named(requested) => requested == name,
            RequestedExport::Namespace => true,
            RequestedExport::SideEffects => false,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, RequestedExport::Named(name) if name == "default")
    }
}

impl Display for RequestedExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestedExport::Named(name) => write!(f, "{}", name),
            RequestedExport::SideEffects => write!(f, "<side-effects>"),
            RequestedExport::Namespace => write!(f, "*"),
        }
    }
}

/// One invocation of the splitter: which file, which binding, and whether a
/// missing binding is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub target_file: PathBuf,
    pub export: RequestedExport,
    /// When false the request is speculative and may produce an empty fragment.
    pub require_match: bool,
}

impl ExportRequest {
    pub fn new(target_file: impl Into<PathBuf>, export: RequestedExport, require_match: bool) -> Self {
        Self {
            target_file: target_file.into(),
            export,
            require_match,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn namespace_matches_everything() {
        assert!(RequestedExport::Namespace.matches("a"));
        assert!(RequestedExport::Namespace.matches("default"));
    }

    #[test]
    fn side_effects_match_nothing() {
        assert!(!RequestedExport::SideEffects.matches("a"));
        assert!(!RequestedExport::SideEffects.matches("*"));
    }

    #[test]
    fn named_matches_by_name() {
        let request = RequestedExport::named("a");
        assert!(request.matches("a"));
        assert!(!request.matches("b"));
        assert!(RequestedExport::default_export().is_default());
    }

    #[test]
    fn serializes_in_camel_case() {
        assert_eq!(
            serde_json::to_string(&RequestedExport::SideEffects).unwrap(),
            r#""sideEffects""#
        );
        assert_eq!(
            serde_json::to_string(&RequestedExport::named("a")).unwrap(),
            r#"{"named":"a"}"#
        );
    }
}
