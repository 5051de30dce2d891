use std::path::Path;

use ahashmap::AHashSet;
use swc_atoms::Atom;
use swc_common::DUMMY_SP;
use swc_ecma_ast::{
    ExportAll, ExportDecl, Ident, ImportDecl, ImportDefaultSpecifier, ImportNamedSpecifier,
    ImportPhase, ImportSpecifier, ModuleDecl, ModuleItem,
};

use crate::{
    classify::{address_str, Classified, ExportCandidate, ImportKind, ImportRecord},
    error::SplitError,
    export_name::{ExportRequest, RequestedExport},
    resolve::FileAddresser,
    side_effects::{export_locals, side_effect_fragment},
};

/// What the resolver decided for one request.
#[derive(Debug, Default)]
pub(crate) struct Resolved {
    /// Statements that make up the fragment, in source order.
    pub kept: Vec<ModuleItem>,
    /// Imports standing in for bindings that live in other fragments.
    pub synthesized_imports: Vec<ImportRecord>,
    /// `export * from` passthroughs, with narrowed sources.
    pub export_alls: Vec<ModuleItem>,
}

fn import_named(local: &Atom, src: String) -> ImportRecord {
    ImportRecord {
        kind: ImportKind::Named,
        local: local.clone(),
        decl: ImportDecl {
            span: DUMMY_SP,
            specifiers: vec![ImportSpecifier::Named(ImportNamedSpecifier {
                span: DUMMY_SP,
                local: Ident::new_no_ctxt(local.clone(), DUMMY_SP),
                imported: None,
                is_type_only: false,
            })],
            src: address_str(src),
            type_only: false,
            with: None,
            phase: ImportPhase::Evaluation,
        },
    }
}

fn import_default(local: &Ident, src: String) -> ImportRecord {
    ImportRecord {
        kind: ImportKind::Default,
        local: local.sym.clone(),
        decl: ImportDecl {
            span: DUMMY_SP,
            specifiers: vec![ImportSpecifier::Default(ImportDefaultSpecifier {
                span: DUMMY_SP,
                local: Ident::new_no_ctxt(local.sym.clone(), DUMMY_SP),
            })],
            src: address_str(src),
            type_only: false,
            with: None,
            phase: ImportPhase::Evaluation,
        },
    }
}

/// Picks the statements satisfying `request` and replaces every other
/// top-level binding with an import from its own fragment of this file.
pub(crate) fn resolve_exports(
    classified: &mut Classified,
    request: &ExportRequest,
    addresser: &FileAddresser<'_>,
) -> Result<Resolved, SplitError> {
    let requested = &request.export;
    let mut resolved = Resolved::default();
    let mut matched = false;

    // names the fragment exports through a declaration or `export_locals`;
    // a local `export { name }` must not export them a second time
    let mut exported_by_decl: AHashSet<Atom> = classified
        .candidates
        .iter()
        .filter_map(|candidate| match candidate {
            ExportCandidate::Declaration { name, .. } if requested.matches(name) => {
                Some(name.clone())
            }
            _ => None,
        })
        .collect();
    if *requested != RequestedExport::SideEffects {
        exported_by_decl.extend(
            classified
                .side_effect_names
                .iter()
                .filter(|ident| requested.matches(&ident.sym))
                .map(|ident| ident.sym.clone()),
        );
    }

    for candidate in classified.candidates.drain(..) {
        match candidate {
            ExportCandidate::Declaration { name, decl } => {
                if requested.matches(&name) {
                    matched = true;
                    resolved
                        .kept
                        .push(ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
                            span: DUMMY_SP,
                            decl,
                        })));
                } else {
                    let src = addresser.address_self(RequestedExport::named(name.as_str()))?;
                    resolved.synthesized_imports.push(import_named(&name, src));
                }
            }
            ExportCandidate::Specifier {
                exported,
                source_export,
                mut export,
            } => {
                // a specifier binds nothing locally, so a miss needs no stand-in
                if !requested.matches(&exported) {
                    continue;
                }
                matched = true;
                if export.src.is_none() && exported_by_decl.contains(&exported) {
                    continue;
                }
                if let Some(src) = export.src.take() {
                    let narrowed = addresser.address(&src.value, source_export, true)?;
                    export.src = Some(address_str(narrowed));
                }
                resolved
                    .kept
                    .push(ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)));
            }
            ExportCandidate::Default { local, item } => {
                if requested.is_default() || *requested == RequestedExport::Namespace {
                    matched = true;
                    resolved.kept.push(item);
                } else if let Some(local) = local {
                    let src = addresser.address_self(RequestedExport::default_export())?;
                    resolved.synthesized_imports.push(import_default(&local, src));
                }
            }
        }
    }

    let side_effect_names = std::mem::take(&mut classified.side_effect_names);
    if *requested == RequestedExport::SideEffects {
        let statements = std::mem::take(&mut classified.side_effects);
        resolved
            .kept
            .extend(side_effect_fragment(statements, &side_effect_names));
    } else if !side_effect_names.is_empty() {
        let side_effect_src = addresser.address_self(RequestedExport::SideEffects)?;
        for ident in &side_effect_names {
            resolved
                .synthesized_imports
                .push(import_named(&ident.sym, side_effect_src.clone()));
        }
        let exposed: Vec<&Ident> = side_effect_names
            .iter()
            .filter(|ident| requested.matches(&ident.sym))
            .collect();
        if !exposed.is_empty() {
            matched = true;
        }
        resolved.kept.extend(export_locals(exposed));
    }

    for export_all in classified.export_alls.drain(..) {
        let narrowed = addresser.address(&export_all.src.value, requested.clone(), false)?;
        resolved
            .export_alls
            .push(ModuleItem::ModuleDecl(ModuleDecl::ExportAll(ExportAll {
                src: address_str(narrowed),
                ..export_all
            })));
    }

    let is_named = matches!(requested, RequestedExport::Named(_));
    if is_named && request.require_match && !matched && resolved.export_alls.is_empty() {
        return Err(export_not_found(&request.target_file, requested));
    }

    Ok(resolved)
}

fn export_not_found(path: &Path, requested: &RequestedExport) -> SplitError {
    SplitError::ExportNotFound {
        export: requested.to_string(),
        path: path.to_path_buf(),
    }
}
