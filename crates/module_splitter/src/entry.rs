use std::path::Path;

use logger_srcfile::SrcFileLogger;
use swc_ecma_ast::{ImportSpecifier, Module, ModuleDecl, ModuleItem};

use crate::{
    classify::address_str, error::SplitError, export_name::RequestedExport,
    resolve::FileAddresser, walker::DynamicImportRewriter,
};

/// Rewrites an entry module so every import goes through the splitter.
///
/// Statements are kept as they are; only import sources change. Each import
/// must bind at most one name, since its source can only name one fragment.
pub(crate) fn rewrite_entry_module<TLogger: SrcFileLogger>(
    mut module: Module,
    path: &Path,
    logger: &TLogger,
    addresser: &FileAddresser<'_>,
) -> Result<Module, SplitError> {
    for item in module.body.iter_mut() {
        let import = match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => import,
            _ => continue,
        };
        let export = match import.specifiers.as_slice() {
            [] => continue,
            [ImportSpecifier::Named(spec)] => RequestedExport::named(match &spec.imported {
                Some(imported) => imported.atom().as_str(),
                None => spec.local.sym.as_str(),
            }),
            [ImportSpecifier::Default(_)] => RequestedExport::default_export(),
            [ImportSpecifier::Namespace(_)] => RequestedExport::Namespace,
            specifiers => {
                let location = logger.describe_span(&import.span);
                logger.src_error(
                    &import.span,
                    "only single-specifier imports can be rewritten in an entry module",
                );
                return Err(SplitError::MultiSpecifierImport {
                    path: path.to_path_buf(),
                    location,
                    source_specifier: import.src.value.to_string(),
                    count: specifiers.len(),
                });
            }
        };
        let address = addresser.address(&import.src.value, export, true)?;
        import.src = address_str(address);
    }

    DynamicImportRewriter::new(addresser).rewrite_items(&mut module.body)?;
    Ok(module)
}
