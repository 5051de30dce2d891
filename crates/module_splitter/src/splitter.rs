use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use ast_name_tracker::find_free_names;
use logger::{debug_logf, Logger};
use logger_srcfile::WrapFileLogger;
use swc_common::{
    comments::{Comments, SingleThreadedComments},
    sync::Lrc,
    SourceMap,
};
use swc_ecma_ast::Module;
use swc_ecma_loader::resolve::Resolve;

use crate::{
    address::{registry_key, ImportAddress},
    assemble::{assemble_fragment, FragmentParts},
    classify::classify_module,
    config::SplitterConfig,
    entry::rewrite_entry_module,
    error::SplitError,
    export_name::{ExportRequest, RequestedExport},
    exports::resolve_exports,
    prune::prune_imports,
    registry::ContentRegistry,
    resolve::{create_node_resolver, ExtensionProbe, FileAddresser, ModuleKindProbe, NodeResolver},
    side_effects::{bare_import, needs_side_effect_import},
    walker::DynamicImportRewriter,
};

/// Produces fragments of modules on request.
///
/// One `Splitter` lives for a whole build: its content registry remembers
/// every file it has handed out an address for.
pub struct Splitter<TResolver, TLogger> {
    config: SplitterConfig,
    resolver: TResolver,
    probe: Box<dyn ModuleKindProbe + Send + Sync>,
    registry: Arc<ContentRegistry>,
    logger: TLogger,
}

impl<TLogger: Logger> Splitter<NodeResolver, TLogger> {
    /// A splitter that resolves imports the way node does.
    pub fn with_node_resolution(config: SplitterConfig, logger: TLogger) -> Self {
        Self::new(config, create_node_resolver(), logger)
    }
}

impl<TResolver: Resolve, TLogger: Logger> Splitter<TResolver, TLogger> {
    pub fn new(config: SplitterConfig, resolver: TResolver, logger: TLogger) -> Self {
        let probe = ExtensionProbe::new(config.module_extensions.iter().cloned());
        Self {
            config,
            resolver,
            probe: Box::new(probe),
            registry: Arc::new(ContentRegistry::with_fs_reader()),
            logger,
        }
    }

    /// Shares `registry` with this splitter, e.g. to serve content from memory.
    pub fn with_registry(mut self, registry: Arc<ContentRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_probe(mut self, probe: impl ModuleKindProbe + Send + Sync + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ContentRegistry> {
        &self.registry
    }

    /// The address a host should import to get `export` of `path`.
    pub fn address_of(
        &self,
        path: impl Into<PathBuf>,
        export: RequestedExport,
        require_match: bool,
    ) -> Result<String, SplitError> {
        let address = ImportAddress::new(path, export, require_match);
        self.registry
            .register(&address.registry_key(&self.config.scheme), &address.path);
        address.encode(&self.config.scheme)
    }

    fn addresser<'a>(&'a self, file: &'a Path, context: &'a Path) -> FileAddresser<'a> {
        FileAddresser {
            resolver: &self.resolver,
            probe: &*self.probe,
            registry: &self.registry,
            scheme: &self.config.scheme,
            file,
            context,
        }
    }

    /// Produces the fragment of `source` that provides `request.export`.
    ///
    /// `context` is the directory the module's import specifiers are resolved from.
    pub fn split_source(
        &self,
        source: &str,
        request: &ExportRequest,
        context: &Path,
    ) -> Result<String, SplitError> {
        let path = request.target_file.as_path();
        let comments = SingleThreadedComments::default();
        let (cm, module) = parse(path, source, &comments)?;
        let file_logger = WrapFileLogger::new(&*cm, &self.logger);
        let addresser = self.addresser(path, context);

        let mut classified = classify_module(module.body, path, &file_logger, &addresser)?;
        let file_has_side_effects = classified.has_side_effects();
        let mut resolved = resolve_exports(&mut classified, request, &addresser)?;

        DynamicImportRewriter::new(&addresser).rewrite_items(&mut resolved.kept)?;

        let free_names = find_free_names(&file_logger, &resolved.kept);
        let imports = prune_imports(
            classified
                .imports
                .into_iter()
                .chain(resolved.synthesized_imports),
            &free_names,
        );

        let side_effect_import = if file_has_side_effects {
            let side_effect_address = addresser.address_self(RequestedExport::SideEffects)?;
            let needed = needs_side_effect_import(
                file_has_side_effects,
                &request.export,
                &side_effect_address,
                imports.iter().map(|record| &*record.decl.src.value),
            );
            needed.then(|| bare_import(side_effect_address))
        } else {
            None
        };

        let fragment = assemble_fragment(FragmentParts {
            directives: classified.directives,
            side_effect_import,
            imports,
            kept: resolved.kept,
            export_alls: resolved.export_alls,
        });
        let out = print(path, &cm, &fragment, &comments)?;

        debug_logf!(
            self.logger,
            "split {} for {} ({} bytes)",
            path.display(),
            request.export,
            out.len()
        );
        Ok(out)
    }

    /// Rewrites the imports of an entry module to point at fragments.
    pub fn rewrite_entry(&self, path: &Path, source: &str) -> Result<String, SplitError> {
        let comments = SingleThreadedComments::default();
        let (cm, module) = parse(path, source, &comments)?;
        let file_logger = WrapFileLogger::new(&*cm, &self.logger);
        let context = abspath::context_dir(path);
        let addresser = self.addresser(path, &context);

        let rewritten = rewrite_entry_module(module, path, &file_logger, &addresser)?;
        let out = print(path, &cm, &rewritten, &comments)?;

        debug_logf!(self.logger, "rewrote entry {}", path.display());
        Ok(out)
    }

    /// Dereferences an address produced by this splitter.
    pub async fn load(&self, address: &str) -> Result<String, SplitError> {
        let decoded = ImportAddress::decode(&self.config.scheme, address)?;
        let source = self.read_source(&decoded.path).await?;
        let request = ExportRequest::new(decoded.path, decoded.export, decoded.require_match);
        self.split_source(&source, &request, &decoded.context)
    }

    /// Reads an entry module and rewrites its imports.
    pub async fn load_entry(&self, path: &Path) -> Result<String, SplitError> {
        let source = self.read_source(path).await?;
        self.rewrite_entry(path, &source)
    }

    async fn read_source(&self, path: &Path) -> Result<String, SplitError> {
        let key = registry_key(&self.config.scheme, path);
        let entry = self.registry.register(&key, path);
        let bytes = match entry.content().await {
            Ok(bytes) => bytes,
            Err(source) => {
                self.logger.warn(format!(
                    "failed to read {}, it will be read again on next request",
                    path.display()
                ));
                self.registry.evict(&key, &entry);
                return Err(SplitError::ReadContent {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        std::str::from_utf8(&bytes)
            .map(str::to_owned)
            .map_err(|source| SplitError::InvalidUtf8 {
                path: path.to_path_buf(),
                source,
            })
    }

}

fn parse(
    path: &Path,
    source: &str,
    comments: &SingleThreadedComments,
) -> Result<(Lrc<SourceMap>, Module), SplitError> {
    let comments: &dyn Comments = comments;
    swc_utils_parse::parse_module(path, source, Some(comments)).map_err(|source| {
        SplitError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn print(
    path: &Path,
    cm: &Lrc<SourceMap>,
    module: &Module,
    comments: &SingleThreadedComments,
) -> Result<String, SplitError> {
    let comments: &dyn Comments = comments;
    swc_utils_print::module_to_string(cm, module, Some(comments)).map_err(|source| {
        SplitError::Print {
            path: path.to_path_buf(),
            source,
        }
    })
}
