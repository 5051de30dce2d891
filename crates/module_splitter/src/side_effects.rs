use swc_common::DUMMY_SP;
use swc_ecma_ast::{
    ExportNamedSpecifier, ExportSpecifier, Ident, ImportDecl, ImportPhase, ModuleDecl,
    ModuleExportName, ModuleItem, NamedExport,
};

use crate::{classify::address_str, export_name::RequestedExport};

/// `export { a, b, … }` for the given local bindings.
pub(crate) fn export_locals<'a>(names: impl IntoIterator<Item = &'a Ident>) -> Option<ModuleItem> {
    let specifiers: Vec<ExportSpecifier> = names
        .into_iter()
        .map(|ident| {
            ExportSpecifier::Named(ExportNamedSpecifier {
                span: DUMMY_SP,
                orig: ModuleExportName::Ident(Ident::new_no_ctxt(ident.sym.clone(), DUMMY_SP)),
                exported: None,
                is_type_only: false,
            })
        })
        .collect();
    if specifiers.is_empty() {
        return None;
    }
    Some(ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(NamedExport {
        span: DUMMY_SP,
        specifiers,
        src: None,
        type_only: false,
        with: None,
    })))
}

/// The body of a file's side-effect fragment: every `let`/`var` declaration
/// and control-flow statement in source order, followed by an export of each
/// `let`/`var` binding.
pub(crate) fn side_effect_fragment(
    side_effects: Vec<ModuleItem>,
    side_effect_names: &[Ident],
) -> Vec<ModuleItem> {
    let mut body = side_effects;
    body.extend(export_locals(side_effect_names));
    body
}

/// `import "<address>";`
pub(crate) fn bare_import(address: String) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![],
        src: address_str(address),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

/// Whether a fragment has to pull in the side-effect fragment with a bare
/// import. Not needed when the fragment is the side-effect fragment itself,
/// or when one of its retained imports already loads it.
pub(crate) fn needs_side_effect_import<'a>(
    file_has_side_effects: bool,
    request: &RequestedExport,
    side_effect_address: &str,
    mut retained_sources: impl Iterator<Item = &'a str>,
) -> bool {
    file_has_side_effects
        && *request != RequestedExport::SideEffects
        && !retained_sources.any(|src| src == side_effect_address)
}
