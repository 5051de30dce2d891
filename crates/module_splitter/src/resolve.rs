use std::path::{Path, PathBuf};

use ahashmap::AHashMap;
use anyhow::{anyhow, Error};
use path_clean::PathClean;
use swc_common::FileName;
use swc_core::ecma::loader::resolvers::{lru::CachingResolver, node::NodeModulesResolver};
use swc_ecma_loader::{
    resolve::{Resolution, Resolve},
    TargetEnv,
};

use crate::{
    address::ImportAddress, error::SplitError, export_name::RequestedExport,
    registry::ContentRegistry,
};

/// Decides whether a resolved file takes part in the module graph, as opposed
/// to an opaque asset (stylesheets, images, json) that is never split.
pub trait ModuleKindProbe {
    fn is_module(&self, path: &Path) -> bool;
}

/// Treats files with one of a fixed set of extensions as modules.
#[derive(Debug, Clone)]
pub struct ExtensionProbe {
    extensions: Vec<String>,
}

impl ExtensionProbe {
    pub fn new<S: Into<String>>(extensions: impl IntoIterator<Item = S>) -> Self {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModuleKindProbe for ExtensionProbe {
    fn is_module(&self, path: &Path) -> bool {
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };
        self.extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }
}

pub type NodeResolver = CachingResolver<NodeModulesResolver>;

/// Node-style resolution: extension probing, directory indexes and
/// `node_modules` lookup, targeting the browser.
pub fn create_node_resolver() -> NodeResolver {
    CachingResolver::new(
        60_000,
        NodeModulesResolver::new(TargetEnv::Browser, Default::default(), false),
    )
}

/// Resolves specifiers without probing the filesystem.
///
/// Relative and absolute specifiers are joined onto the base directory as
/// written. Bare specifiers are looked up in an explicit map of package roots;
/// `pkg` resolves to `<root>/index.js` and `pkg/sub/path.js` to `<root>/sub/path.js`.
#[derive(Debug, Default, Clone)]
pub struct FullySpecifiedResolver {
    packages: AHashMap<String, PathBuf>,
}

impl FullySpecifiedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.packages.insert(name.into(), root.into());
        self
    }

    fn resolve_package(&self, specifier: &str) -> Option<PathBuf> {
        // longest matching package name wins, so `@scope/pkg` beats `@scope`
        let (name, root) = self
            .packages
            .iter()
            .filter(|(name, _)| {
                specifier == name.as_str()
                    || specifier
                        .strip_prefix(name.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(name, _)| name.len())?;

        let subpath = specifier[name.len()..].trim_start_matches('/');
        if subpath.is_empty() {
            Some(root.join("index.js"))
        } else {
            Some(root.join(subpath))
        }
    }
}

impl Resolve for FullySpecifiedResolver {
    fn resolve(&self, base: &FileName, module_specifier: &str) -> Result<Resolution, Error> {
        let base_dir = match base {
            FileName::Real(path) => path,
            _ => return Err(anyhow!("Base must be a real file path")),
        };

        let path = if abspath::is_path_specifier(module_specifier) {
            abspath::join_abspath(base_dir, module_specifier)?
        } else {
            self.resolve_package(module_specifier)
                .ok_or_else(|| anyhow!("no package provides '{}'", module_specifier))?
        };

        Ok(Resolution {
            filename: FileName::Real(path),
            slug: None,
        })
    }
}

/// Builds import addresses for the sources found in one file.
pub(crate) struct FileAddresser<'a> {
    pub resolver: &'a dyn Resolve,
    pub probe: &'a dyn ModuleKindProbe,
    pub registry: &'a ContentRegistry,
    pub scheme: &'a str,
    /// The file being rewritten.
    pub file: &'a Path,
    /// Directory its import specifiers are resolved from.
    pub context: &'a Path,
}

impl FileAddresser<'_> {
    /// Address of `export` in whatever `specifier` resolves to.
    ///
    /// Specifiers that resolve outside the module graph come back unchanged.
    pub fn address(
        &self,
        specifier: &str,
        export: RequestedExport,
        require_match: bool,
    ) -> Result<String, SplitError> {
        let resolution = self
            .resolver
            .resolve(&FileName::Real(self.context.to_path_buf()), specifier)
            .map_err(|source| SplitError::Resolve {
                specifier: specifier.to_string(),
                context: self.context.to_path_buf(),
                source,
            })?;

        let resolved = match resolution.filename {
            FileName::Real(path) => path.clean(),
            // builtins and other non-file modules
            _ => return Ok(specifier.to_string()),
        };
        if !abspath::is_path_specifier(specifier) && !self.probe.is_module(&resolved) {
            return Ok(specifier.to_string());
        }

        self.address_path(resolved, export, require_match)
    }

    /// Address of `export` in the file being rewritten.
    pub fn address_self(&self, export: RequestedExport) -> Result<String, SplitError> {
        self.address_path(self.file.to_path_buf(), export, true)
    }

    fn address_path(
        &self,
        path: PathBuf,
        export: RequestedExport,
        require_match: bool,
    ) -> Result<String, SplitError> {
        let address = ImportAddress::new(path, export, require_match);
        self.registry
            .register(&address.registry_key(self.scheme), &address.path);
        address.encode(self.scheme)
    }
}
