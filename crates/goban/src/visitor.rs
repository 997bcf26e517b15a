//! Syntax-tree walk that matches imports, calls, and types against the ban list.

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
    Arm, BinOp, Block, Expr, ExprCall, ExprClosure, ExprForLoop, ExprIf, ExprPath, ExprStruct,
    ExprWhile, File, FnArg, ImplItemFn, ItemExternCrate, ItemFn, ItemMod, ItemUse, Local, Macro,
    Pat, Signature, Stmt, Token, TraitItemFn, Type,
};

use crate::banlist::BannedPatterns;
use crate::report::{BannedUse, Reporter, SymbolKind};
use crate::resolve::{use_leaves, Resolver};

/// Walks one compilation unit in source order.
pub struct BannedSymbolVisitor<'a> {
    patterns: &'a BannedPatterns,
    resolver: Resolver,
    reporter: Reporter<'a>,
    module_path: Option<Vec<String>>,
}

impl<'a> BannedSymbolVisitor<'a> {
    /// Creates a visitor for a file whose crate position is `module_path`.
    #[must_use]
    pub fn new(
        patterns: &'a BannedPatterns,
        reporter: Reporter<'a>,
        module_path: Option<Vec<String>>,
    ) -> Self {
        Self {
            patterns,
            resolver: Resolver::new(),
            reporter,
            module_path,
        }
    }

    /// Consumes the visitor, returning its reporter.
    #[must_use]
    pub fn into_reporter(self) -> Reporter<'a> {
        self.reporter
    }

    fn check(&mut self, kind: SymbolKind, symbol: String, span: Span) {
        if let Some(comment) = self.patterns.get(&symbol) {
            let banned = BannedUse {
                kind,
                symbol,
                comment: comment.to_string(),
            };
            self.reporter.report(span, &banned);
        }
    }

    fn check_func(&mut self, expr: &ExprPath) {
        if let Some(symbol) = self.resolver.resolve_expr_path(expr) {
            self.check(SymbolKind::Func, symbol, expr.span());
        }
    }

    /// Runs `walk` in a scope where the variables bound by `pats` shadow
    /// outer names.
    fn with_bindings<'p>(
        &mut self,
        pats: impl IntoIterator<Item = &'p Pat>,
        walk: impl FnOnce(&mut Self),
    ) {
        self.resolver.enter_bindings();
        for pat in pats {
            self.resolver.bind_pattern(pat);
        }
        walk(self);
        self.resolver.exit();
    }
}

fn params(sig: &Signature) -> impl Iterator<Item = &Pat> {
    sig.inputs.iter().filter_map(|arg| match arg {
        FnArg::Typed(typed) => Some(&*typed.pat),
        FnArg::Receiver(_) => None,
    })
}

/// Patterns of the `let` expressions in an `if` or `while` condition,
/// including `&&` chains.
fn let_patterns(cond: &Expr) -> Vec<&Pat> {
    match cond {
        Expr::Let(expr) => vec![&*expr.pat],
        Expr::Binary(binary) if matches!(binary.op, BinOp::And(_)) => {
            let mut pats = let_patterns(&binary.left);
            pats.extend(let_patterns(&binary.right));
            pats
        }
        _ => Vec::new(),
    }
}

impl<'ast> Visit<'ast> for BannedSymbolVisitor<'_> {
    fn visit_file(&mut self, node: &'ast File) {
        self.resolver.enter_module(self.module_path.clone(), &node.items);
        visit::visit_file(self, node);
        self.resolver.exit();
    }

    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        // `mod foo;` is analyzed as its own file.
        let Some((_, items)) = &node.content else {
            visit::visit_item_mod(self, node);
            return;
        };

        let module = self.resolver.current_module().map(|parent| {
            let mut module = parent.to_vec();
            module.push(node.ident.to_string());
            module
        });
        self.resolver.enter_module(module, items);
        visit::visit_item_mod(self, node);
        self.resolver.exit();
    }

    fn visit_block(&mut self, node: &'ast Block) {
        let items = node.stmts.iter().filter_map(|stmt| match stmt {
            Stmt::Item(item) => Some(item),
            _ => None,
        });
        self.resolver.enter_block(items);
        visit::visit_block(self, node);
        self.resolver.exit();
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_visibility(&node.vis);
        self.visit_signature(&node.sig);
        self.with_bindings(params(&node.sig), |v| v.visit_block(&node.block));
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_visibility(&node.vis);
        self.visit_signature(&node.sig);
        self.with_bindings(params(&node.sig), |v| v.visit_block(&node.block));
    }

    fn visit_trait_item_fn(&mut self, node: &'ast TraitItemFn) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_signature(&node.sig);
        if let Some(block) = &node.default {
            self.with_bindings(params(&node.sig), |v| v.visit_block(block));
        }
    }

    fn visit_local(&mut self, node: &'ast Local) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_pat(&node.pat);
        if let Some(init) = &node.init {
            self.visit_expr(&init.expr);
            if let Some((_, diverge)) = &init.diverge {
                self.visit_expr(diverge);
            }
        }
        // Bound after the initializer: `let x = x;` still sees the outer `x`,
        // and only the statements that follow see the new one.
        self.resolver.bind_pattern(&node.pat);
    }

    fn visit_expr_closure(&mut self, node: &'ast ExprClosure) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        for input in &node.inputs {
            self.visit_pat(input);
        }
        self.visit_return_type(&node.output);
        self.with_bindings(&node.inputs, |v| v.visit_expr(&node.body));
    }

    fn visit_arm(&mut self, node: &'ast Arm) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_pat(&node.pat);
        self.with_bindings([&node.pat], |v| {
            if let Some((_, guard)) = &node.guard {
                v.visit_expr(guard);
            }
            v.visit_expr(&node.body);
        });
    }

    fn visit_expr_for_loop(&mut self, node: &'ast ExprForLoop) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_pat(&node.pat);
        self.visit_expr(&node.expr);
        self.with_bindings([&*node.pat], |v| v.visit_block(&node.body));
    }

    fn visit_expr_if(&mut self, node: &'ast ExprIf) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_expr(&node.cond);
        self.with_bindings(let_patterns(&node.cond), |v| v.visit_block(&node.then_branch));
        if let Some((_, else_branch)) = &node.else_branch {
            self.visit_expr(else_branch);
        }
    }

    fn visit_expr_while(&mut self, node: &'ast ExprWhile) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_expr(&node.cond);
        self.with_bindings(let_patterns(&node.cond), |v| v.visit_block(&node.body));
    }

    fn visit_pat(&mut self, node: &'ast Pat) {
        match node {
            // Unit variants and constants; only their qualified self and
            // generic arguments are walked.
            Pat::Path(path) => visit::visit_expr_path(self, path),
            _ => visit::visit_pat(self, node),
        }
    }

    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        for (path, span) in use_leaves(&node.tree) {
            self.check(SymbolKind::Package, path, span);
        }
    }

    fn visit_item_extern_crate(&mut self, node: &'ast ItemExternCrate) {
        self.check(SymbolKind::Package, node.ident.to_string(), node.ident.span());
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        match &*node.func {
            Expr::Path(callee) => {
                self.check_func(callee);
                // Generic arguments and qualified self types still get walked.
                visit::visit_expr_path(self, callee);
            }
            other => self.visit_expr(other),
        }
        for arg in &node.args {
            self.visit_expr(arg);
        }
    }

    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        self.check_func(node);
        visit::visit_expr_path(self, node);
    }

    fn visit_expr_struct(&mut self, node: &'ast ExprStruct) {
        if node.qself.is_none() {
            if let Some(symbol) = self.resolver.resolve_type_path(&node.path) {
                self.check(SymbolKind::Type, symbol, node.path.span());
            }
        }
        visit::visit_expr_struct(self, node);
    }

    fn visit_type(&mut self, node: &'ast Type) {
        if let Some(symbol) = self.resolver.resolve_type(node) {
            self.check(SymbolKind::Type, symbol, node.span());
        }
        visit::visit_type(self, node);
    }

    fn visit_macro(&mut self, node: &'ast Macro) {
        visit::visit_macro(self, node);
        // Expression-list bodies (`println!`, `vec!`, `assert_eq!`, ...) are
        // walked like ordinary code; anything else is opaque.
        if let Ok(args) = node.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                self.visit_expr(arg);
            }
        }
    }
}
