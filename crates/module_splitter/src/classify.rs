use std::path::Path;

use logger_srcfile::SrcFileLogger;
use swc_atoms::Atom;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    Decl, DefaultDecl, ExportAll, ExportSpecifier, Expr, Ident, ImportDecl, ImportSpecifier, Lit,
    ModuleDecl, ModuleItem, NamedExport, Pat, Stmt, Str, VarDecl, VarDeclKind,
};

use crate::{error::SplitError, export_name::RequestedExport, resolve::FileAddresser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ImportKind {
    Default,
    Named,
    Namespace,
}

/// An import of exactly one binding.
#[derive(Debug, Clone)]
pub(crate) struct ImportRecord {
    pub kind: ImportKind,
    pub local: Atom,
    pub decl: ImportDecl,
}

impl ImportRecord {
    pub fn into_item(self) -> ModuleItem {
        ModuleItem::ModuleDecl(ModuleDecl::Import(self.decl))
    }
}

/// A top-level binding that can be the subject of a request.
#[derive(Debug, Clone)]
pub(crate) enum ExportCandidate {
    /// A function, class, or single `const` declarator, exported or not.
    Declaration { name: Atom, decl: Decl },
    /// One specifier of `export { … }` or `export { … } from`.
    Specifier {
        exported: Atom,
        /// What a re-export asks of its source module.
        source_export: RequestedExport,
        export: NamedExport,
    },
    /// `export default …`, with the bound name if the declaration has one.
    Default { local: Option<Ident>, item: ModuleItem },
}

#[derive(Debug, Default)]
pub(crate) struct Classified {
    pub directives: Vec<ModuleItem>,
    pub side_effects: Vec<ModuleItem>,
    /// Names bound by top-level `let`/`var`, in declaration order.
    pub side_effect_names: Vec<Ident>,
    pub candidates: Vec<ExportCandidate>,
    pub imports: Vec<ImportRecord>,
    pub export_alls: Vec<ExportAll>,
}

impl Classified {
    pub fn has_side_effects(&self) -> bool {
        !self.side_effects.is_empty()
    }
}

struct Classifier<'a, TLogger: SrcFileLogger> {
    path: &'a Path,
    logger: &'a TLogger,
    addresser: &'a FileAddresser<'a>,
    in_prologue: bool,
    out: Classified,
}

/// Buckets the top-level items of a module.
///
/// Import sources are rewritten to addresses as they are expanded into
/// single-binding records.
pub(crate) fn classify_module<TLogger: SrcFileLogger>(
    body: Vec<ModuleItem>,
    path: &Path,
    logger: &TLogger,
    addresser: &FileAddresser<'_>,
) -> Result<Classified, SplitError> {
    let mut classifier = Classifier {
        path,
        logger,
        addresser,
        in_prologue: true,
        out: Classified::default(),
    };
    for item in body {
        classifier.classify_item(item)?;
    }
    Ok(classifier.out)
}

fn is_directive(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Expr(expr_stmt) => matches!(&*expr_stmt.expr, Expr::Lit(Lit::Str(_))),
        _ => false,
    }
}

pub(crate) fn address_str(value: String) -> Box<Str> {
    Box::new(Str {
        span: swc_common::DUMMY_SP,
        value: value.into(),
        raw: None,
    })
}

impl<TLogger: SrcFileLogger> Classifier<'_, TLogger> {
    fn classify_item(&mut self, item: ModuleItem) -> Result<(), SplitError> {
        if self.in_prologue {
            match &item {
                ModuleItem::Stmt(stmt) if is_directive(stmt) => {
                    self.out.directives.push(item);
                    return Ok(());
                }
                _ => self.in_prologue = false,
            }
        }

        match item {
            ModuleItem::ModuleDecl(module_decl) => self.classify_module_decl(module_decl),
            ModuleItem::Stmt(stmt) => self.classify_stmt(stmt),
        }
    }

    fn classify_module_decl(&mut self, module_decl: ModuleDecl) -> Result<(), SplitError> {
        match module_decl {
            ModuleDecl::Import(import) => self.expand_import(import),
            ModuleDecl::ExportDecl(export_decl) => self.classify_decl(export_decl.decl),
            ModuleDecl::ExportNamed(named) => self.classify_named_export(named),
            ModuleDecl::ExportDefaultDecl(default_decl) => {
                let local = match &default_decl.decl {
                    DefaultDecl::Fn(fn_expr) => fn_expr.ident.clone(),
                    DefaultDecl::Class(class_expr) => class_expr.ident.clone(),
                    DefaultDecl::TsInterfaceDecl(decl) => {
                        return Err(self.unsupported(decl.span, "interface export"))
                    }
                };
                self.out.candidates.push(ExportCandidate::Default {
                    local,
                    item: ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(default_decl)),
                });
                Ok(())
            }
            ModuleDecl::ExportDefaultExpr(default_expr) => {
                self.out.candidates.push(ExportCandidate::Default {
                    local: None,
                    item: ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(default_expr)),
                });
                Ok(())
            }
            ModuleDecl::ExportAll(export_all) => {
                self.out.export_alls.push(export_all);
                Ok(())
            }
            ModuleDecl::TsImportEquals(decl) => {
                Err(self.unsupported(decl.span, "import-equals declaration"))
            }
            ModuleDecl::TsExportAssignment(decl) => {
                Err(self.unsupported(decl.span, "export assignment"))
            }
            ModuleDecl::TsNamespaceExport(decl) => {
                Err(self.unsupported(decl.span, "namespace export"))
            }
        }
    }

    fn classify_stmt(&mut self, stmt: Stmt) -> Result<(), SplitError> {
        match stmt {
            Stmt::Empty(_) => Ok(()),
            Stmt::Decl(decl) => self.classify_decl(decl),
            Stmt::Expr(_)
            | Stmt::If(_)
            | Stmt::Try(_)
            | Stmt::For(_)
            | Stmt::ForIn(_)
            | Stmt::ForOf(_)
            | Stmt::While(_)
            | Stmt::DoWhile(_)
            | Stmt::Switch(_)
            | Stmt::Labeled(_)
            | Stmt::Block(_)
            | Stmt::Throw(_) => {
                self.out.side_effects.push(ModuleItem::Stmt(stmt));
                Ok(())
            }
            Stmt::Return(s) => Err(self.unsupported(s.span, "return statement")),
            Stmt::Break(s) => Err(self.unsupported(s.span, "break statement")),
            Stmt::Continue(s) => Err(self.unsupported(s.span, "continue statement")),
            Stmt::Debugger(s) => Err(self.unsupported(s.span, "debugger statement")),
            Stmt::With(s) => Err(self.unsupported(s.span, "with statement")),
        }
    }

    fn classify_decl(&mut self, decl: Decl) -> Result<(), SplitError> {
        match decl {
            Decl::Fn(ref fn_decl) => {
                let name = fn_decl.ident.sym.clone();
                self.out
                    .candidates
                    .push(ExportCandidate::Declaration { name, decl });
                Ok(())
            }
            Decl::Class(ref class_decl) => {
                let name = class_decl.ident.sym.clone();
                self.out
                    .candidates
                    .push(ExportCandidate::Declaration { name, decl });
                Ok(())
            }
            Decl::Var(var_decl) => self.classify_var_decl(*var_decl),
            Decl::Using(d) => Err(self.unsupported(d.span, "using declaration")),
            Decl::TsInterface(d) => Err(self.unsupported(d.span, "interface declaration")),
            Decl::TsTypeAlias(d) => Err(self.unsupported(d.span, "type alias declaration")),
            Decl::TsEnum(d) => Err(self.unsupported(d.span, "enum declaration")),
            Decl::TsModule(d) => Err(self.unsupported(d.span, "namespace declaration")),
        }
    }

    fn classify_var_decl(&mut self, var_decl: VarDecl) -> Result<(), SplitError> {
        let mut names = Vec::with_capacity(var_decl.decls.len());
        for declarator in &var_decl.decls {
            match &declarator.name {
                Pat::Ident(binding) => names.push(binding.id.clone()),
                other => {
                    return Err(self.malformed(
                        other.span(),
                        "destructuring patterns are not supported in top-level declarations",
                    ))
                }
            }
        }

        match var_decl.kind {
            VarDeclKind::Const => {
                // each declarator becomes its own candidate
                for (declarator, ident) in var_decl.decls.iter().zip(names) {
                    let single = VarDecl {
                        decls: vec![declarator.clone()],
                        ..var_decl.clone()
                    };
                    self.out.candidates.push(ExportCandidate::Declaration {
                        name: ident.sym,
                        decl: Decl::Var(Box::new(single)),
                    });
                }
            }
            VarDeclKind::Let | VarDeclKind::Var => {
                self.out.side_effect_names.extend(names);
                self.out
                    .side_effects
                    .push(ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(var_decl)))));
            }
        }
        Ok(())
    }

    fn classify_named_export(&mut self, named: NamedExport) -> Result<(), SplitError> {
        for specifier in &named.specifiers {
            let (exported, source_export) = match specifier {
                ExportSpecifier::Named(spec) => {
                    let exported = spec.exported.as_ref().unwrap_or(&spec.orig).atom().clone();
                    let source_export = RequestedExport::named(spec.orig.atom().as_str());
                    (exported, source_export)
                }
                ExportSpecifier::Namespace(spec) => {
                    (spec.name.atom().clone(), RequestedExport::Namespace)
                }
                ExportSpecifier::Default(spec) => {
                    return Err(self.unsupported(spec.exported.span, "default re-export"))
                }
            };
            self.out.candidates.push(ExportCandidate::Specifier {
                exported,
                source_export,
                export: NamedExport {
                    specifiers: vec![specifier.clone()],
                    ..named.clone()
                },
            });
        }
        Ok(())
    }

    /// Splits an import into one record per binding, each pointing at the
    /// fragment that provides just that binding.
    fn expand_import(&mut self, import: ImportDecl) -> Result<(), SplitError> {
        if import.specifiers.is_empty() {
            self.out
                .side_effects
                .push(ModuleItem::ModuleDecl(ModuleDecl::Import(import)));
            return Ok(());
        }

        for specifier in &import.specifiers {
            let (kind, local, export) = match specifier {
                ImportSpecifier::Named(spec) => {
                    let imported = match &spec.imported {
                        Some(imported) => imported.atom().as_str(),
                        None => spec.local.sym.as_str(),
                    };
                    (
                        ImportKind::Named,
                        spec.local.sym.clone(),
                        RequestedExport::named(imported),
                    )
                }
                ImportSpecifier::Default(spec) => (
                    ImportKind::Default,
                    spec.local.sym.clone(),
                    RequestedExport::default_export(),
                ),
                ImportSpecifier::Namespace(spec) => (
                    ImportKind::Namespace,
                    spec.local.sym.clone(),
                    RequestedExport::Namespace,
                ),
            };
            let src = self.addresser.address(&import.src.value, export, true)?;
            self.out.imports.push(ImportRecord {
                kind,
                local,
                decl: ImportDecl {
                    specifiers: vec![specifier.clone()],
                    src: address_str(src),
                    ..import.clone()
                },
            });
        }
        Ok(())
    }

    fn unsupported(&self, span: Span, kind: &'static str) -> SplitError {
        let location = self.logger.describe_span(&span);
        self.logger
            .src_error(&span, format!("unsupported top-level {}", kind));
        SplitError::UnsupportedStatement {
            path: self.path.to_path_buf(),
            location,
            kind,
        }
    }

    fn malformed(&self, span: Span, reason: &'static str) -> SplitError {
        let location = self.logger.describe_span(&span);
        self.logger.src_error(&span, reason);
        SplitError::MalformedDeclaration {
            path: self.path.to_path_buf(),
            location,
            reason,
        }
    }
}
