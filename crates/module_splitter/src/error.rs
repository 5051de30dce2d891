use std::{io, path::PathBuf, sync::Arc};

/// Every way splitting or rewriting a module can fail.
///
/// Failures are deterministic functions of the input, so none of them are retried.
#[derive(thiserror::Error, Debug)]
pub enum SplitError {
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: swc_utils_parse::ParseError,
    },

    #[error("unsupported top-level {kind} at {location} in {}", path.display())]
    UnsupportedStatement {
        path: PathBuf,
        location: String,
        kind: &'static str,
    },

    #[error(
        "import of {count} specifiers from '{source_specifier}' at {location} in {} is not supported; use one import statement per specifier",
        path.display()
    )]
    MultiSpecifierImport {
        path: PathBuf,
        location: String,
        source_specifier: String,
        count: usize,
    },

    #[error("export '{export}' was not found in {}", path.display())]
    ExportNotFound { export: String, path: PathBuf },

    #[error("malformed declaration at {location} in {}: {reason}", path.display())]
    MalformedDeclaration {
        path: PathBuf,
        location: String,
        reason: &'static str,
    },

    #[error("failed to resolve '{specifier}' from {}: {source}", context.display())]
    Resolve {
        specifier: String,
        context: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid import address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    ReadContent {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("{} is not valid UTF-8: {source}", path.display())]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("failed to print the rewritten {}: {source}", path.display())]
    Print {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl SplitError {
    /// The file the failure was detected in, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            SplitError::Parse { path, .. }
            | SplitError::UnsupportedStatement { path, .. }
            | SplitError::MultiSpecifierImport { path, .. }
            | SplitError::ExportNotFound { path, .. }
            | SplitError::MalformedDeclaration { path, .. }
            | SplitError::ReadContent { path, .. }
            | SplitError::InvalidUtf8 { path, .. }
            | SplitError::Print { path, .. } => Some(path),
            SplitError::Resolve { context, .. } => Some(context),
            SplitError::InvalidAddress { .. } => None,
        }
    }
}
