use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{error::SplitError, export_name::RequestedExport};

/// The decoded form of an import source that points back at the splitter.
///
/// Encoded as `{scheme}?{query json}!{scheme}:{absolute path}`. The part after
/// the `!` names the physical file and is the content registry key; the query
/// carries what to carve out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAddress {
    pub path: PathBuf,
    pub context: PathBuf,
    pub export: RequestedExport,
    pub require_match: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressQuery {
    context: PathBuf,
    export: RequestedExport,
    require_match: bool,
}

/// Content registry key of a physical file.
pub fn registry_key(scheme: &str, path: &Path) -> String {
    format!("{}:{}", scheme, path.display())
}

impl ImportAddress {
    /// Addresses `export` of the file at `path`, resolving its imports from the
    /// directory that contains it.
    pub fn new(path: impl Into<PathBuf>, export: RequestedExport, require_match: bool) -> Self {
        let path = path.into();
        let context = abspath::context_dir(&path);
        Self {
            path,
            context,
            export,
            require_match,
        }
    }

    pub fn registry_key(&self, scheme: &str) -> String {
        registry_key(scheme, &self.path)
    }

    pub fn encode(&self, scheme: &str) -> Result<String, SplitError> {
        let query = AddressQuery {
            context: self.context.clone(),
            export: self.export.clone(),
            require_match: self.require_match,
        };
        let query_json =
            serde_json::to_string(&query).map_err(|err| SplitError::InvalidAddress {
                address: self.registry_key(scheme),
                reason: err.to_string(),
            })?;
        Ok(format!(
            "{}?{}!{}",
            scheme,
            query_json,
            self.registry_key(scheme)
        ))
    }

    pub fn decode(scheme: &str, address: &str) -> Result<Self, SplitError> {
        let invalid = |reason: &str| SplitError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let query_and_key = address
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix('?'))
            .ok_or_else(|| invalid("missing scheme prefix"))?;

        // the query is a single json object; the file path follows right after it
        let mut stream =
            serde_json::Deserializer::from_str(query_and_key).into_iter::<AddressQuery>();
        let query = match stream.next() {
            Some(Ok(query)) => query,
            Some(Err(err)) => return Err(invalid(&err.to_string())),
            None => return Err(invalid("missing query")),
        };
        let key = &query_and_key[stream.byte_offset()..];

        let path = key
            .strip_prefix('!')
            .and_then(|rest| rest.strip_prefix(scheme))
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| invalid("missing file key"))?;
        let path = PathBuf::from(path);
        if !path.is_absolute() {
            return Err(invalid("file path is not absolute"));
        }

        Ok(Self {
            path,
            context: query.context,
            export: query.export,
            require_match: query.require_match,
        })
    }
}
