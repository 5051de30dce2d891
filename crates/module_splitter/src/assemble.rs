use swc_common::{BytePos, Spanned, DUMMY_SP};
use swc_ecma_ast::{Module, ModuleDecl, ModuleItem};

use crate::classify::ImportRecord;

/// The parts of a fragment, in the order they are emitted.
pub(crate) struct FragmentParts {
    pub directives: Vec<ModuleItem>,
    pub side_effect_import: Option<ModuleItem>,
    pub imports: Vec<ImportRecord>,
    pub kept: Vec<ModuleItem>,
    pub export_alls: Vec<ModuleItem>,
}

pub(crate) fn assemble_fragment(parts: FragmentParts) -> Module {
    let FragmentParts {
        directives,
        side_effect_import,
        imports,
        kept,
        export_alls,
    } = parts;

    // bare imports kept by the side-effect fragment join the import section
    let (bare_imports, kept): (Vec<_>, Vec<_>) = kept
        .into_iter()
        .partition(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))));
    let mut import_items: Vec<ModuleItem> = bare_imports
        .into_iter()
        .chain(imports.into_iter().map(ImportRecord::into_item))
        .collect();
    import_items.sort_by_key(evaluation_order);

    let mut body = Vec::with_capacity(
        directives.len() + 1 + import_items.len() + kept.len() + export_alls.len(),
    );
    body.extend(directives);
    body.extend(side_effect_import);
    body.extend(import_items);
    body.extend(kept);
    body.extend(export_alls);

    Module {
        span: DUMMY_SP,
        body,
        shebang: None,
    }
}

/// Imports from the source evaluate in their original order, ahead of the
/// synthesized ones, which stand in for the module body.
fn evaluation_order(item: &ModuleItem) -> (bool, BytePos) {
    let span = item.span();
    (span.is_dummy(), span.lo)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use swc_common::DUMMY_SP;
    use swc_ecma_ast::{ImportDecl, ModuleDecl, ModuleItem};

    use super::{assemble_fragment, FragmentParts};
    use crate::classify::{address_str, ImportKind, ImportRecord};

    fn import_sources(items: &[ModuleItem]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    Some(import.src.value.to_string())
                }
                _ => None,
            })
            .collect()
    }

    fn record(local: &str, decl: ImportDecl) -> ImportRecord {
        ImportRecord {
            kind: ImportKind::Named,
            local: local.into(),
            decl,
        }
    }

    #[test]
    fn test_source_imports_precede_synthesized_ones() {
        let (_, parsed) = swc_utils_parse::parse_ecma_src(
            "/src/a.js",
            r#"
            import { first } from './first.js';
            import './polyfill.js';
            register(first, Widget);
            "#,
        );
        let mut items = parsed.body.into_iter();
        let first = match items.next() {
            Some(ModuleItem::ModuleDecl(ModuleDecl::Import(decl))) => decl,
            other => panic!("expected an import, got {other:?}"),
        };
        let kept: Vec<ModuleItem> = items.collect();
        let synthesized = ImportDecl {
            span: DUMMY_SP,
            src: address_str("./widget.js".to_string()),
            ..first.clone()
        };

        let module = assemble_fragment(FragmentParts {
            directives: vec![],
            side_effect_import: None,
            imports: vec![record("Widget", synthesized), record("first", first)],
            kept,
            export_alls: vec![],
        });

        assert_eq!(
            import_sources(&module.body),
            vec!["./first.js", "./polyfill.js", "./widget.js"]
        );
        assert_eq!(module.body.len(), 4);
    }
}
