use swc_ecma_ast::{CallExpr, Callee, Expr, Lit, ModuleItem, Str};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::{error::SplitError, export_name::RequestedExport, resolve::FileAddresser};

/// Points string-literal `import()` targets at speculative namespace
/// fragments of the imported file.
///
/// Computed targets are left alone: they cannot be resolved statically.
pub(crate) struct DynamicImportRewriter<'a> {
    addresser: &'a FileAddresser<'a>,
    error: Option<SplitError>,
}

impl<'a> DynamicImportRewriter<'a> {
    pub fn new(addresser: &'a FileAddresser<'a>) -> Self {
        Self {
            addresser,
            error: None,
        }
    }

    /// Rewrites every dynamic import in `items`, stopping at the first failure.
    pub fn rewrite_items(mut self, items: &mut [ModuleItem]) -> Result<(), SplitError> {
        for item in items.iter_mut() {
            item.visit_mut_with(&mut self);
            if self.error.is_some() {
                break;
            }
        }
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn rewrite_target(&mut self, target: &mut Str) {
        match self
            .addresser
            .address(&target.value, RequestedExport::Namespace, false)
        {
            Ok(address) => {
                target.value = address.into();
                target.raw = None;
            }
            Err(err) => self.error = Some(err),
        }
    }
}

impl VisitMut for DynamicImportRewriter<'_> {
    fn visit_mut_call_expr(&mut self, node: &mut CallExpr) {
        if self.error.is_some() {
            return;
        }
        if let Callee::Import(_) = node.callee {
            if let Some(first_arg) = node.args.first_mut() {
                if let Expr::Lit(Lit::Str(target)) = &mut *first_arg.expr {
                    self.rewrite_target(target);
                }
            }
        }
        node.visit_mut_children_with(self);
    }
}

/// String-literal `import()` targets in `items`, in visiting order.
#[cfg(test)]
pub(crate) fn dynamic_import_targets(items: &[ModuleItem]) -> Vec<String> {
    use swc_ecma_visit::{Visit, VisitWith};

    struct Collector(Vec<String>);
    impl Visit for Collector {
        fn visit_call_expr(&mut self, node: &CallExpr) {
            if let Callee::Import(_) = node.callee {
                if let Some(first_arg) = node.args.first() {
                    if let Expr::Lit(Lit::Str(target)) = &*first_arg.expr {
                        self.0.push(target.value.to_string());
                    }
                }
            }
            node.visit_children_with(self);
        }
    }

    let mut collector = Collector(Vec::new());
    for item in items {
        item.visit_with(&mut collector);
    }
    collector.0
}

#[cfg(test)]
mod test {
    use std::{path::Path, sync::Arc};

    use super::*;
    use crate::{
        address::ImportAddress,
        registry::{test_readers::CountingReader, ContentRegistry},
        resolve::{ExtensionProbe, FullySpecifiedResolver},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn rewrites_nested_dynamic_imports() {
        let (_, mut module) = swc_utils_parse::parse_ecma_src(
            "/src/a.js",
            r#"
            export function load(which) {
                if (which) {
                    return import('./lazy.js').then(() => import(`./${which}.js`));
                }
                return Promise.all([import('./other.js')]);
            }
            "#,
        );

        let resolver = FullySpecifiedResolver::new();
        let probe = ExtensionProbe::new([".js"]);
        let registry = ContentRegistry::new(Arc::new(CountingReader::default()));
        let addresser = FileAddresser {
            resolver: &resolver,
            probe: &probe,
            registry: &registry,
            scheme: "s",
            file: Path::new("/src/a.js"),
            context: Path::new("/src"),
        };

        DynamicImportRewriter::new(&addresser)
            .rewrite_items(&mut module.body)
            .unwrap();

        let targets: Vec<ImportAddress> = dynamic_import_targets(&module.body)
            .iter()
            .map(|target| ImportAddress::decode("s", target).unwrap())
            .collect();
        assert_eq!(
            targets,
            vec![
                ImportAddress::new("/src/lazy.js", RequestedExport::Namespace, false),
                ImportAddress::new("/src/other.js", RequestedExport::Namespace, false),
            ]
        );
    }
}
