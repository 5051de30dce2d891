use ahashmap::{AHashMap, AHashSet};
use logger_srcfile::SrcFileLogger;
use swc_atoms::Atom;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{AssignPat, ModuleExportName, ModuleItem};
use swc_ecma_visit::{Visit, VisitWith};

// unique identifier of a variable declaration within a file
#[derive(Clone, Copy, Debug)]
pub struct VarID(pub Span);

#[derive(Debug)]
pub struct VariableScope {
    /// Variables declared within the current scope, keyed by name
    local_symbols: AHashMap<Atom, VarID>,

    /// Names used in this scope (or a child scope) that no enclosing part of
    /// the visited tree declares.
    ///
    /// Declarations are treated as hoisted to the top of their scope: a name
    /// that is used first and declared later in the same scope is not escaped.
    ///
    /// https://developer.mozilla.org/en-US/docs/Glossary/Hoisting
    escaped_symbols: AHashSet<Atom>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self {
            local_symbols: AHashMap::default(),
            escaped_symbols: AHashSet::default(),
        }
    }

    pub fn local_symbols(&self) -> &AHashMap<Atom, VarID> {
        &self.local_symbols
    }

    pub fn escaped_symbols(&self) -> &AHashSet<Atom> {
        &self.escaped_symbols
    }

    pub fn into_escaped_symbols(self) -> AHashSet<Atom> {
        self.escaped_symbols
    }

    // Redeclaration is legal for `var` and function declarations, so the
    // first declaration wins and later ones are ignored.
    fn declare_local(&mut self, ident: &swc_ecma_ast::Ident) {
        if self.local_symbols.contains_key(&ident.sym) {
            return;
        }
        self.local_symbols.insert(ident.sym.clone(), VarID(ident.span));
        self.escaped_symbols.remove(&ident.sym);
    }

    // "uses" a symbol within this scope.
    //
    // If the symbol is not declared in this scope, it is added to the list of escaped symbols.
    fn use_symbol(&mut self, sym: &Atom) {
        if !self.local_symbols.contains_key(sym) {
            self.escaped_symbols.insert(sym.clone());
        }
    }

    // owned version of use_symbol
    fn use_symbol_owned(&mut self, sym: Atom) {
        if !self.local_symbols.contains_key(&sym) {
            self.escaped_symbols.insert(sym);
        }
    }
}
impl Default for VariableScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Visitor that builds a VariableScope from a syntax tree.
struct VariableScopeVisitor<'a, TLogger: SrcFileLogger> {
    logger: &'a TLogger,
    node: &'a mut VariableScope,
}

impl<'a, TLogger> VariableScopeVisitor<'a, TLogger>
where
    TLogger: SrcFileLogger,
{
    fn new(
        logger: &'a TLogger,
        root_scope: &'a mut VariableScope,
    ) -> VariableScopeVisitor<'a, TLogger> {
        Self {
            logger,
            node: root_scope,
        }
    }

    /// Runs `f` against a fresh child scope, then re-exports every name that
    /// escaped the child into this scope.
    fn in_child_scope(&mut self, f: impl FnOnce(&mut VariableScopeVisitor<'_, TLogger>)) {
        let mut child_scope = VariableScope::new();
        {
            let mut child_visitor = VariableScopeVisitor::new(self.logger, &mut child_scope);
            f(&mut child_visitor);
        }
        self.mark_all_escaped(child_scope.escaped_symbols);
    }

    fn visit_binding_pattern(&mut self, pattern: &swc_ecma_ast::Pat) {
        match pattern {
            swc_ecma_ast::Pat::Ident(ident) => {
                self.declare_local(ident);
            }
            swc_ecma_ast::Pat::Array(array_pat) => {
                // only the Some() elements are bindings
                for subpattern in array_pat.elems.iter().flatten() {
                    self.visit_binding_pattern(subpattern);
                }
            }
            swc_ecma_ast::Pat::Object(object_pat) => {
                for prop in &object_pat.props {
                    match prop {
                        swc_ecma_ast::ObjectPatProp::KeyValue(kv) => {
                            if let swc_ecma_ast::PropName::Computed(computed) = &kv.key {
                                computed.expr.visit_with(self);
                            }
                            self.visit_binding_pattern(&kv.value);
                        }
                        swc_ecma_ast::ObjectPatProp::Assign(assign_prop) => {
                            // little used "destructure with default" syntax:
                            // let { a = defaultValue } = destructured_object;
                            self.declare_local(&assign_prop.key.id);
                            if let Some(default_value) = &assign_prop.value {
                                default_value.visit_with(self);
                            }
                        }
                        swc_ecma_ast::ObjectPatProp::Rest(rest) => {
                            self.visit_binding_pattern(&rest.arg);
                        }
                    }
                }
            }
            swc_ecma_ast::Pat::Rest(rest_pat) => {
                self.visit_binding_pattern(&rest_pat.arg);
            }
            swc_ecma_ast::Pat::Assign(assign_pat) => {
                self.visit_binding_pattern(&assign_pat.left);
                assign_pat.right.visit_with(self);
            }
            swc_ecma_ast::Pat::Invalid(invalid_pat) => {
                self.logger
                    .src_warn(&invalid_pat.span, "invalid pattern in variable declaration");
            }
            swc_ecma_ast::Pat::Expr(expr_pat) => {
                self.logger.src_warn(
                    &expr_pat.span(),
                    "expr pattern in variable declaration was ignored",
                );
            }
        }
    }

    fn declare_local(&mut self, ident: &swc_ecma_ast::Ident) {
        self.node.declare_local(ident);
    }

    fn mark_all_escaped(&mut self, mut child_scope_escaped_symbols: AHashSet<Atom>) {
        for sym in child_scope_escaped_symbols.drain() {
            self.node.use_symbol_owned(sym);
        }
    }
}

impl<TLogger> Visit for VariableScopeVisitor<'_, TLogger>
where
    TLogger: SrcFileLogger,
{
    fn visit_var_decl(&mut self, node: &swc_ecma_ast::VarDecl) {
        for decl in &node.decls {
            self.visit_binding_pattern(&decl.name);
        }
        for decl in &node.decls {
            if let Some(init) = &decl.init {
                init.visit_with(self);
            }
        }
    }

    fn visit_constructor(&mut self, node: &swc_ecma_ast::Constructor) {
        // Initializers of typescript parameter properties are evaluated in the enclosing scope.
        for param in &node.params {
            if let swc_ecma_ast::ParamOrTsParamProp::TsParamProp(swc_ecma_ast::TsParamProp {
                param: swc_ecma_ast::TsParamPropParam::Assign(AssignPat { right, .. }),
                ..
            }) = param
            {
                right.visit_with(self);
            }
        }

        self.in_child_scope(|child_visitor| {
            for param in &node.params {
                match param {
                    swc_ecma_ast::ParamOrTsParamProp::Param(param) => {
                        child_visitor.visit_binding_pattern(&param.pat);
                    }
                    swc_ecma_ast::ParamOrTsParamProp::TsParamProp(m) => match &m.param {
                        swc_ecma_ast::TsParamPropParam::Ident(ident) => {
                            child_visitor.declare_local(ident);
                        }
                        swc_ecma_ast::TsParamPropParam::Assign(assign) => {
                            // the right side of the pattern is already visited in the above loop
                            child_visitor.visit_binding_pattern(&assign.left);
                        }
                    },
                }
            }
            node.body.visit_with(child_visitor);
        });
    }

    fn visit_fn_decl(&mut self, node: &swc_ecma_ast::FnDecl) {
        self.declare_local(&node.ident);
        self.visit_function(&node.function);
    }

    fn visit_fn_expr(&mut self, node: &swc_ecma_ast::FnExpr) {
        // a named function expression can refer to itself, but the name does not
        // leak into the enclosing scope
        self.in_child_scope(|child_visitor| {
            if let Some(ident) = &node.ident {
                child_visitor.declare_local(ident);
            }
            child_visitor.visit_function(&node.function);
        });
    }

    fn visit_function(&mut self, node: &swc_ecma_ast::Function) {
        for decorator in &node.decorators {
            decorator.visit_with(self);
        }
        self.in_child_scope(|child_visitor| {
            for param in &node.params {
                for decorator in &param.decorators {
                    decorator.visit_with(child_visitor);
                }
                child_visitor.visit_binding_pattern(&param.pat);
            }
            node.body.visit_with(child_visitor);
        });
    }

    fn visit_arrow_expr(&mut self, node: &swc_ecma_ast::ArrowExpr) {
        self.in_child_scope(|child_visitor| {
            for param in &node.params {
                child_visitor.visit_binding_pattern(param);
            }
            node.body.visit_with(child_visitor);
        });
    }

    fn visit_setter_prop(&mut self, node: &swc_ecma_ast::SetterProp) {
        node.key.visit_with(self);
        self.in_child_scope(|child_visitor| {
            child_visitor.visit_binding_pattern(&node.param);
            node.body.visit_with(child_visitor);
        });
    }

    fn visit_class_decl(&mut self, node: &swc_ecma_ast::ClassDecl) {
        self.declare_local(&node.ident);
        node.class.visit_with(self);
    }

    fn visit_class_expr(&mut self, node: &swc_ecma_ast::ClassExpr) {
        self.in_child_scope(|child_visitor| {
            if let Some(ident) = &node.ident {
                child_visitor.declare_local(ident);
            }
            node.class.visit_with(child_visitor);
        });
    }

    fn visit_catch_clause(&mut self, node: &swc_ecma_ast::CatchClause) {
        self.in_child_scope(|child_visitor| {
            if let Some(param) = &node.param {
                child_visitor.visit_binding_pattern(param);
            }
            node.body.visit_with(child_visitor);
        });
    }

    fn visit_block_stmt(&mut self, node: &swc_ecma_ast::BlockStmt) {
        self.in_child_scope(|child_visitor| node.visit_children_with(child_visitor));
    }

    fn visit_for_stmt(&mut self, node: &swc_ecma_ast::ForStmt) {
        self.in_child_scope(|child_visitor| node.visit_children_with(child_visitor));
    }

    fn visit_for_in_stmt(&mut self, node: &swc_ecma_ast::ForInStmt) {
        self.in_child_scope(|child_visitor| node.visit_children_with(child_visitor));
    }

    fn visit_for_of_stmt(&mut self, node: &swc_ecma_ast::ForOfStmt) {
        self.in_child_scope(|child_visitor| node.visit_children_with(child_visitor));
    }

    fn visit_ident(&mut self, node: &swc_ecma_ast::Ident) {
        self.node.use_symbol(&node.sym);
    }

    // labels live in their own namespace
    fn visit_labeled_stmt(&mut self, node: &swc_ecma_ast::LabeledStmt) {
        node.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _node: &swc_ecma_ast::BreakStmt) {}

    fn visit_continue_stmt(&mut self, _node: &swc_ecma_ast::ContinueStmt) {}

    // `export { a as b }` uses `a`; `export { a } from './m'` uses nothing local
    fn visit_named_export(&mut self, node: &swc_ecma_ast::NamedExport) {
        if node.src.is_some() {
            return;
        }
        for spec in &node.specifiers {
            if let swc_ecma_ast::ExportSpecifier::Named(named) = spec {
                if let ModuleExportName::Ident(ident) = &named.orig {
                    self.node.use_symbol(&ident.sym);
                }
            }
        }
    }

    fn visit_import_decl(&mut self, node: &swc_ecma_ast::ImportDecl) {
        for spec in &node.specifiers {
            match spec {
                swc_ecma_ast::ImportSpecifier::Named(named_spec) => {
                    self.declare_local(&named_spec.local);
                }
                swc_ecma_ast::ImportSpecifier::Default(default_spec) => {
                    self.declare_local(&default_spec.local);
                }
                swc_ecma_ast::ImportSpecifier::Namespace(namespace_spec) => {
                    self.declare_local(&namespace_spec.local);
                }
            }
        }
    }

    // intrinsic elements (`<div>`) are not references
    fn visit_jsx_element_name(&mut self, node: &swc_ecma_ast::JSXElementName) {
        if let swc_ecma_ast::JSXElementName::Ident(ident) = node {
            if ident.sym.starts_with(|c: char| c.is_ascii_lowercase()) {
                return;
            }
        }
        node.visit_children_with(self);
    }

    // types are erased before evaluation, so they never keep a binding alive
    fn visit_ts_type(&mut self, _node: &swc_ecma_ast::TsType) {}

    fn visit_ts_type_param_decl(&mut self, _node: &swc_ecma_ast::TsTypeParamDecl) {}

    fn visit_ts_expr_with_type_args(&mut self, _node: &swc_ecma_ast::TsExprWithTypeArgs) {}
}

/// Scope analysis of `items`, treated as the body of a single module: a
/// declaration in one item satisfies a reference in another.
pub fn find_escaping_names<TLogger>(file_logger: TLogger, items: &[ModuleItem]) -> VariableScope
where
    TLogger: SrcFileLogger,
{
    let mut root_scope = VariableScope::new();
    let mut root_visitor = VariableScopeVisitor::new(&file_logger, &mut root_scope);
    for item in items {
        item.visit_with(&mut root_visitor);
    }
    root_scope
}

/// Names referenced by `items` that none of `items` declare.
pub fn find_free_names<TLogger>(file_logger: TLogger, items: &[ModuleItem]) -> AHashSet<Atom>
where
    TLogger: SrcFileLogger,
{
    find_escaping_names(file_logger, items).into_escaped_symbols()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn get_scope(src_str: &str) -> VariableScope {
        let (sourcemap, parsed_module) = swc_utils_parse::parse_ecma_src("test.js", src_str);

        let logger = logger::NullLogger;
        let file_logger = logger_srcfile::WrapFileLogger::new(&*sourcemap, &logger);

        find_escaping_names(file_logger, &parsed_module.body)
    }

    #[derive(Default)]
    struct ExpectedScope {
        local_symbols: Vec<&'static str>,
        escaped_symbols: Vec<&'static str>,
    }

    fn run_test(src_str: &str, mut expected: ExpectedScope) {
        let scope = get_scope(src_str);

        let mut locals = scope
            .local_symbols
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<_>>();
        locals.sort();
        expected.local_symbols.sort();
        assert_eq!(expected.local_symbols, locals);

        let mut escaped = scope
            .escaped_symbols
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>();
        escaped.sort();
        expected.escaped_symbols.sort();
        assert_eq!(expected.escaped_symbols, escaped);
    }

    #[test]
    fn simple_let_binding() {
        run_test(
            r#"
            let a = 1;
            "#,
            ExpectedScope {
                local_symbols: vec!["a"],
                ..Default::default()
            },
        );
    }

    #[test]
    fn export_binding() {
        run_test(
            r#"
            export let a = 1;
            export var b = 1;
            export const c = 1;
            "#,
            ExpectedScope {
                local_symbols: vec!["a", "b", "c"],
                ..Default::default()
            },
        );
    }

    #[test]
    fn escape_in_var_initializer() {
        run_test(
            r#"
            const c = forward_declared();
            "#,
            ExpectedScope {
                local_symbols: vec!["c"],
                escaped_symbols: vec!["forward_declared"],
            },
        );
    }

    #[test]
    fn forward_declared_function() {
        run_test(
            r#"
            const c = forward_declared();
            function forward_declared() {
                return 1;
            }
            "#,
            ExpectedScope {
                local_symbols: vec!["c", "forward_declared"],
                ..Default::default()
            },
        );
    }

    #[test]
    fn shadowed_fn_params() {
        run_test(
            r#"
            const c = 1;
            function helper_fn(c, d) {
                return c + d;
            }
            "#,
            ExpectedScope {
                local_symbols: vec!["c", "helper_fn"],
                ..Default::default()
            },
        );
    }

    #[test]
    fn escape_from_subfn() {
        run_test(
            r#"
            function helper_fn() {
                return c + d + e
            }
            "#,
            ExpectedScope {
                local_symbols: vec!["helper_fn"],
                escaped_symbols: vec!["c", "d", "e"],
            },
        );
    }

    #[test]
    fn arrow_params_and_catch_bindings_stay_local() {
        run_test(
            r#"
            const run = (x) => {
                try { return x(); } catch (err) { report(err); }
            };
            "#,
            ExpectedScope {
                local_symbols: vec!["run"],
                escaped_symbols: vec!["report"],
            },
        );
    }

    #[test]
    fn member_props_and_labels_are_not_references() {
        run_test(
            r#"
            outer: for (const item of items) {
                console.log(item.counter, { key: item });
                break outer;
            }
            "#,
            ExpectedScope {
                local_symbols: vec![],
                escaped_symbols: vec!["console", "items"],
            },
        );
    }

    #[test]
    fn export_specifiers_use_local_names() {
        run_test(
            r#"
            export { a as b };
            export { c } from './c.js';
            "#,
            ExpectedScope {
                local_symbols: vec![],
                escaped_symbols: vec!["a"],
            },
        );
    }

    #[test]
    fn class_and_shorthand_props() {
        run_test(
            r#"
            class Widget extends Base {
                render() { return { size, Widget }; }
            }
            "#,
            ExpectedScope {
                local_symbols: vec!["Widget"],
                escaped_symbols: vec!["Base", "size"],
            },
        );
    }

    #[test]
    fn import_statement_names() {
        run_test(
            r#"
            import name from 'module';
            import { other as rebound } from 'module';
            import * as ns from 'module';
            use(name, rebound, ns);
            "#,
            ExpectedScope {
                local_symbols: vec!["name", "ns", "rebound"],
                escaped_symbols: vec!["use"],
            },
        );
    }

    #[test]
    fn free_names_across_items() {
        let (sourcemap, parsed_module) = swc_utils_parse::parse_ecma_src(
            "test.js",
            "function a() { return b(); }\nfunction b() { return missing; }",
        );
        let logger = logger::NullLogger;
        let file_logger = logger_srcfile::WrapFileLogger::new(&*sourcemap, &logger);

        let free = find_free_names(file_logger, &parsed_module.body);
        assert_eq!(
            free.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            vec!["missing"]
        );
    }
}
