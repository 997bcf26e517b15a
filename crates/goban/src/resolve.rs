//! Canonical symbol identity for paths and types.
//!
//! Matching is exact string comparison, so every rendering here is a fixed
//! contract:
//!
//! - paths are `::`-joined idents with generic arguments dropped
//!   (`std::fs::File::open`);
//! - types keep generic arguments, separated by `", "`, and drop lifetimes
//!   (`std::collections::HashMap<std::string::String, u8>`, `&mut str`,
//!   `*const u8`, `[u8; 4]`, `(u8, bool)`, `dyn std::any::Any + Send`);
//! - qualified self paths render as `<Type as Trait>::item`.
//!
//! Names are resolved against a stack of scopes built from `use`
//! declarations, item definitions, and pattern bindings, then the std
//! prelude. A name that resolves to nothing addressable (locals, generic
//! parameters, `Self`, fn-local items, glob imports) yields `None`.

use std::collections::HashMap;
use std::fmt::Write as _;

use proc_macro2::Span;
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{
    GenericArgument, Item, Pat, PatIdent, PathArguments, QSelf, ReturnType, Type, TypeParamBound,
    UseTree,
};

/// Names available in every module through the 2021 std prelude.
const PRELUDE: &[(&str, &str)] = &[
    ("AsMut", "std::convert::AsMut"),
    ("AsRef", "std::convert::AsRef"),
    ("Box", "std::boxed::Box"),
    ("Clone", "std::clone::Clone"),
    ("Copy", "std::marker::Copy"),
    ("Default", "std::default::Default"),
    ("DoubleEndedIterator", "std::iter::DoubleEndedIterator"),
    ("Drop", "std::ops::Drop"),
    ("Eq", "std::cmp::Eq"),
    ("Err", "std::result::Result::Err"),
    ("ExactSizeIterator", "std::iter::ExactSizeIterator"),
    ("Extend", "std::iter::Extend"),
    ("Fn", "std::ops::Fn"),
    ("FnMut", "std::ops::FnMut"),
    ("FnOnce", "std::ops::FnOnce"),
    ("From", "std::convert::From"),
    ("FromIterator", "std::iter::FromIterator"),
    ("Into", "std::convert::Into"),
    ("IntoIterator", "std::iter::IntoIterator"),
    ("Iterator", "std::iter::Iterator"),
    ("None", "std::option::Option::None"),
    ("Ok", "std::result::Result::Ok"),
    ("Option", "std::option::Option"),
    ("Ord", "std::cmp::Ord"),
    ("PartialEq", "std::cmp::PartialEq"),
    ("PartialOrd", "std::cmp::PartialOrd"),
    ("Result", "std::result::Result"),
    ("Send", "std::marker::Send"),
    ("Sized", "std::marker::Sized"),
    ("Some", "std::option::Option::Some"),
    ("String", "std::string::String"),
    ("Sync", "std::marker::Sync"),
    ("ToOwned", "std::borrow::ToOwned"),
    ("ToString", "std::string::ToString"),
    ("TryFrom", "std::convert::TryFrom"),
    ("TryInto", "std::convert::TryInto"),
    ("Unpin", "std::marker::Unpin"),
    ("Vec", "std::vec::Vec"),
    ("drop", "std::mem::drop"),
];

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "f32", "f64", "i8", "i16", "i32", "i64", "i128", "isize", "u8",
    "u16", "u32", "u64", "u128", "usize",
];

/// One lexical scope.
#[derive(Debug, Default)]
struct Frame {
    /// Module that `self::` refers to inside this scope.
    module: Option<Vec<String>>,
    /// Module frames end name lookup; blocks see through to their module.
    opaque: bool,
    /// Name → canonical path; `None` shadows outer scopes with a name that
    /// has no addressable path.
    names: HashMap<String, Option<String>>,
}

/// Resolves names to canonical identities while a visitor walks a file.
///
/// Call [`Resolver::enter_module`] / [`Resolver::enter_block`] when the walk
/// enters a scope and [`Resolver::exit`] when it leaves.
#[derive(Debug, Default)]
pub struct Resolver {
    frames: Vec<Frame>,
}

impl Resolver {
    /// Creates a resolver with no scopes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a module whose items are addressable as `module::name`.
    ///
    /// `module` is `None` when the module's position in the crate is unknown.
    pub fn enter_module<'i>(
        &mut self,
        module: Option<Vec<String>>,
        items: impl IntoIterator<Item = &'i Item>,
    ) {
        let frame = self.build_frame(module, items, true);
        self.frames.push(frame);
    }

    /// Enters a block; items declared in it shadow outer names but have no
    /// path of their own.
    pub fn enter_block<'i>(&mut self, items: impl IntoIterator<Item = &'i Item>) {
        let module = self.current_module().map(<[String]>::to_vec);
        let frame = self.build_frame(module, items, false);
        self.frames.push(frame);
    }

    /// Enters a scope for pattern bindings: fn and closure parameters, a
    /// match arm, or the body of a `for`, `if let` or `while let`.
    pub fn enter_bindings(&mut self) {
        self.enter_block(std::iter::empty::<&Item>());
    }

    /// Binds every variable `pat` introduces in the innermost scope, where
    /// it shadows outer names until the scope is left.
    ///
    /// A bare capitalized ident that already resolves (`None`, `MAX`, a
    /// unit struct) is a path pattern and binds nothing.
    pub fn bind_pattern(&mut self, pat: &Pat) {
        let mut idents = Vec::new();
        pattern_idents(pat, &mut idents);
        for ident in idents {
            let name = ident.ident.to_string();
            let plain = ident.by_ref.is_none() && ident.mutability.is_none();
            if plain
                && ident.subpat.is_none()
                && name.starts_with(char::is_uppercase)
                && self.resolve_segments(None, std::slice::from_ref(&name)).is_some()
            {
                continue;
            }
            if let Some(frame) = self.frames.last_mut() {
                frame.names.insert(name, None);
            }
        }
    }

    /// Leaves the innermost scope.
    pub fn exit(&mut self) {
        self.frames.pop();
    }

    /// Module path of the innermost scope, if known.
    #[must_use]
    pub fn current_module(&self) -> Option<&[String]> {
        self.frames.last().and_then(|f| f.module.as_deref())
    }

    fn build_frame<'i>(
        &self,
        module: Option<Vec<String>>,
        items: impl IntoIterator<Item = &'i Item>,
        addressable: bool,
    ) -> Frame {
        let items: Vec<&Item> = items.into_iter().collect();
        let mut frame = Frame {
            module,
            opaque: addressable,
            names: HashMap::new(),
        };

        for item in &items {
            if let Some(name) = item_name(item) {
                let path = if addressable {
                    frame.module.as_ref().map(|m| join_path(m, &name))
                } else {
                    None
                };
                frame.names.insert(name, path);
            }
        }

        for item in &items {
            match item {
                Item::Use(item_use) => {
                    let mut bindings = Vec::new();
                    use_bindings(&item_use.tree, &mut Vec::new(), &mut bindings);
                    for (alias, segments) in bindings {
                        let resolved = if item_use.leading_colon.is_some() {
                            Some(segments.join("::"))
                        } else if segments.len() == 1
                            && self.lookup(Some(&frame), &segments[0]).is_none()
                        {
                            // `use some_crate;`
                            Some(segments[0].clone())
                        } else {
                            self.resolve_segments(Some(&frame), &segments)
                        };
                        frame.names.insert(alias, resolved);
                    }
                }
                Item::ExternCrate(krate) => {
                    let target = if krate.ident == "self" {
                        "crate".to_string()
                    } else {
                        krate.ident.to_string()
                    };
                    let alias = krate
                        .rename
                        .as_ref()
                        .map_or_else(|| krate.ident.to_string(), |(_, id)| id.to_string());
                    if alias != "_" {
                        frame.names.insert(alias, Some(target));
                    }
                }
                _ => {}
            }
        }

        frame
    }

    fn lookup(&self, pending: Option<&Frame>, name: &str) -> Option<Option<String>> {
        for frame in pending.into_iter().chain(self.frames.iter().rev()) {
            if let Some(found) = frame.names.get(name) {
                return Some(found.clone());
            }
            if frame.opaque {
                break;
            }
        }
        None
    }

    /// Resolves a `::`-separated path given as idents.
    fn resolve_segments(&self, pending: Option<&Frame>, segments: &[String]) -> Option<String> {
        let (first, rest) = segments.split_first()?;
        let module = pending
            .and_then(|f| f.module.as_deref())
            .or_else(|| self.current_module());

        match first.as_str() {
            "crate" => Some(segments.join("::")),
            // A lone `self` is a method receiver.
            "self" if rest.is_empty() => None,
            "self" => Some(join_all(module?, rest)),
            "super" => {
                let supers = segments.iter().take_while(|s| *s == "super").count();
                let module = module?;
                // `crate` itself has no parent.
                if supers >= module.len() {
                    return None;
                }
                Some(join_all(&module[..module.len() - supers], &segments[supers..]))
            }
            "Self" => None,
            _ => match self.lookup(pending, first) {
                Some(Some(base)) => Some(join_all(&[base], rest)),
                Some(None) => None,
                None => {
                    if let Some((_, prelude)) = PRELUDE.iter().find(|(name, _)| name == first) {
                        Some(join_all(&[(*prelude).to_string()], rest))
                    } else if rest.is_empty() {
                        PRIMITIVES
                            .contains(&first.as_str())
                            .then(|| first.clone())
                    } else {
                        // Anything else is taken to be an external crate.
                        Some(segments.join("::"))
                    }
                }
            },
        }
    }

    /// Resolves a path to its canonical `::` form, dropping generic arguments.
    #[must_use]
    pub fn resolve_path(&self, path: &syn::Path) -> Option<String> {
        let segments = path_idents(path);
        if path.leading_colon.is_some() {
            return Some(segments.join("::"));
        }
        self.resolve_segments(None, &segments)
    }

    /// Resolves the target of a path expression (a callee or a function
    /// referenced as a value).
    #[must_use]
    pub fn resolve_expr_path(&self, expr: &syn::ExprPath) -> Option<String> {
        match &expr.qself {
            Some(qself) => self.resolve_qualified(qself, &expr.path),
            None => self.resolve_path(&expr.path),
        }
    }

    /// Renders a path used as a type (e.g. a struct literal), keeping the
    /// generic arguments of its last segment.
    #[must_use]
    pub fn resolve_type_path(&self, path: &syn::Path) -> Option<String> {
        let base = self.resolve_path(path)?;
        let args = path
            .segments
            .last()
            .map(|seg| self.render_arguments(&seg.arguments))
            .unwrap_or_default();
        Some(format!("{base}{args}"))
    }

    /// Renders a type in canonical form.
    ///
    /// Returns `None` when the outermost named type cannot be resolved.
    #[must_use]
    pub fn resolve_type(&self, ty: &Type) -> Option<String> {
        self.render_type(ty, true)
    }

    fn resolve_qualified(&self, qself: &QSelf, path: &syn::Path) -> Option<String> {
        let self_ty = self.render_type(&qself.ty, true)?;
        let segments = path_idents(path);
        let position = qself.position.min(segments.len());
        let rest = segments[position..].join("::");

        if position == 0 {
            return Some(format!("<{self_ty}>::{rest}"));
        }

        let trait_path = if path.leading_colon.is_some() {
            segments[..position].join("::")
        } else {
            self.resolve_segments(None, &segments[..position])?
        };
        Some(format!("<{self_ty} as {trait_path}>::{rest}"))
    }

    /// `strict` requires the outermost named type to resolve; nested
    /// components fall back to their written form.
    fn render_type(&self, ty: &Type, strict: bool) -> Option<String> {
        match ty {
            Type::Path(type_path) => {
                let resolved = match &type_path.qself {
                    Some(qself) => self.resolve_qualified(qself, &type_path.path),
                    None => self.resolve_path(&type_path.path),
                };
                let base = match resolved {
                    Some(base) => base,
                    None if strict => return None,
                    None => path_idents(&type_path.path).join("::"),
                };
                let args = type_path
                    .path
                    .segments
                    .last()
                    .map(|seg| self.render_arguments(&seg.arguments))
                    .unwrap_or_default();
                Some(format!("{base}{args}"))
            }
            Type::Reference(reference) => {
                let inner = self.render_type(&reference.elem, strict)?;
                let mutability = if reference.mutability.is_some() {
                    "mut "
                } else {
                    ""
                };
                Some(format!("&{mutability}{inner}"))
            }
            Type::Ptr(ptr) => {
                let inner = self.render_type(&ptr.elem, strict)?;
                let kind = if ptr.mutability.is_some() {
                    "mut"
                } else {
                    "const"
                };
                Some(format!("*{kind} {inner}"))
            }
            Type::Slice(slice) => Some(format!("[{}]", self.render_type(&slice.elem, strict)?)),
            Type::Array(array) => Some(format!(
                "[{}; {}]",
                self.render_type(&array.elem, strict)?,
                tokens(&array.len)
            )),
            Type::Paren(paren) => self.render_type(&paren.elem, strict),
            Type::Group(group) => self.render_type(&group.elem, strict),
            Type::Tuple(tuple) => {
                let elems: Vec<String> = tuple.elems.iter().map(|t| self.lenient(t)).collect();
                if elems.len() == 1 {
                    Some(format!("({},)", elems[0]))
                } else {
                    Some(format!("({})", elems.join(", ")))
                }
            }
            Type::TraitObject(object) => {
                Some(format!("dyn {}", self.render_bounds(&object.bounds)))
            }
            Type::ImplTrait(imp) => Some(format!("impl {}", self.render_bounds(&imp.bounds))),
            Type::BareFn(bare) => {
                let mut out = String::new();
                if bare.unsafety.is_some() {
                    out.push_str("unsafe ");
                }
                if let Some(abi) = &bare.abi {
                    out.push_str("extern ");
                    if let Some(name) = &abi.name {
                        let _ = write!(out, "\"{}\" ", name.value());
                    }
                }
                let inputs: Vec<String> =
                    bare.inputs.iter().map(|arg| self.lenient(&arg.ty)).collect();
                let _ = write!(out, "fn({})", inputs.join(", "));
                out.push_str(&self.render_return(&bare.output));
                Some(out)
            }
            Type::Never(_) => Some("!".to_string()),
            Type::Infer(_) => Some("_".to_string()),
            _ => None,
        }
    }

    fn lenient(&self, ty: &Type) -> String {
        self.render_type(ty, false).unwrap_or_else(|| tokens(ty))
    }

    fn render_return(&self, output: &ReturnType) -> String {
        match output {
            ReturnType::Default => String::new(),
            ReturnType::Type(_, ty) => format!(" -> {}", self.lenient(ty)),
        }
    }

    fn render_bounds<'b>(&self, bounds: impl IntoIterator<Item = &'b TypeParamBound>) -> String {
        let rendered: Vec<String> = bounds
            .into_iter()
            .filter_map(|bound| match bound {
                TypeParamBound::Trait(trait_bound) => {
                    let maybe = match trait_bound.modifier {
                        syn::TraitBoundModifier::Maybe(_) => "?",
                        syn::TraitBoundModifier::None => "",
                    };
                    let path = &trait_bound.path;
                    let base = self
                        .resolve_path(path)
                        .unwrap_or_else(|| path_idents(path).join("::"));
                    let args = path
                        .segments
                        .last()
                        .map(|seg| self.render_arguments(&seg.arguments))
                        .unwrap_or_default();
                    Some(format!("{maybe}{base}{args}"))
                }
                _ => None,
            })
            .collect();
        rendered.join(" + ")
    }

    fn render_arguments(&self, arguments: &PathArguments) -> String {
        match arguments {
            PathArguments::None => String::new(),
            PathArguments::AngleBracketed(angle) => {
                let args: Vec<String> = angle
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        GenericArgument::Lifetime(_) => None,
                        GenericArgument::Type(ty) => Some(self.lenient(ty)),
                        GenericArgument::AssocType(assoc) => {
                            Some(format!("{} = {}", assoc.ident, self.lenient(&assoc.ty)))
                        }
                        other => Some(tokens(other)),
                    })
                    .collect();
                if args.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", args.join(", "))
                }
            }
            PathArguments::Parenthesized(paren) => {
                let inputs: Vec<String> = paren.inputs.iter().map(|t| self.lenient(t)).collect();
                format!("({}){}", inputs.join(", "), self.render_return(&paren.output))
            }
        }
    }
}

/// Import identities of a `use` tree, as written, one per leaf.
///
/// `use a::{b, c::self}` yields `a::b` and `a::c`; globs keep their `*`.
#[must_use]
pub fn use_leaves(tree: &UseTree) -> Vec<(String, Span)> {
    fn walk(tree: &UseTree, prefix: &mut Vec<String>, out: &mut Vec<(String, Span)>) {
        match tree {
            UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                walk(&p.tree, prefix, out);
                prefix.pop();
            }
            UseTree::Name(n) if n.ident == "self" => {
                out.push((prefix.join("::"), n.ident.span()));
            }
            UseTree::Name(n) => out.push((join_path(prefix, &n.ident.to_string()), n.ident.span())),
            UseTree::Rename(r) if r.ident == "self" => {
                out.push((prefix.join("::"), r.ident.span()));
            }
            UseTree::Rename(r) => {
                out.push((join_path(prefix, &r.ident.to_string()), r.ident.span()));
            }
            UseTree::Glob(g) => out.push((join_path(prefix, "*"), g.span())),
            UseTree::Group(g) => {
                for item in &g.items {
                    walk(item, prefix, out);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(tree, &mut Vec::new(), &mut out);
    out
}

/// Name bindings introduced by a `use` tree: `(alias, path segments)`.
fn use_bindings(tree: &UseTree, prefix: &mut Vec<String>, out: &mut Vec<(String, Vec<String>)>) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            use_bindings(&p.tree, prefix, out);
            prefix.pop();
        }
        UseTree::Name(n) => {
            if n.ident == "self" {
                if let Some(last) = prefix.last() {
                    out.push((last.clone(), prefix.clone()));
                }
            } else {
                let mut segments = prefix.clone();
                segments.push(n.ident.to_string());
                out.push((n.ident.to_string(), segments));
            }
        }
        UseTree::Rename(r) => {
            if r.rename == "_" {
                return;
            }
            let mut segments = prefix.clone();
            if r.ident != "self" {
                segments.push(r.ident.to_string());
            }
            out.push((r.rename.to_string(), segments));
        }
        UseTree::Glob(_) => {}
        UseTree::Group(g) => {
            for item in &g.items {
                use_bindings(item, prefix, out);
            }
        }
    }
}

/// Idents a pattern binds, including the unit-like ones `bind_pattern`
/// filters out.
fn pattern_idents<'p>(pat: &'p Pat, out: &mut Vec<&'p PatIdent>) {
    match pat {
        Pat::Ident(ident) => {
            out.push(ident);
            if let Some((_, sub)) = &ident.subpat {
                pattern_idents(sub, out);
            }
        }
        Pat::Or(or) => or.cases.iter().for_each(|case| pattern_idents(case, out)),
        Pat::Paren(paren) => pattern_idents(&paren.pat, out),
        Pat::Reference(reference) => pattern_idents(&reference.pat, out),
        Pat::Slice(slice) => slice.elems.iter().for_each(|elem| pattern_idents(elem, out)),
        Pat::Struct(strukt) => {
            for field in &strukt.fields {
                pattern_idents(&field.pat, out);
            }
        }
        Pat::Tuple(tuple) => tuple.elems.iter().for_each(|elem| pattern_idents(elem, out)),
        Pat::TupleStruct(tuple) => tuple.elems.iter().for_each(|elem| pattern_idents(elem, out)),
        Pat::Type(typed) => pattern_idents(&typed.pat, out),
        _ => {}
    }
}

fn item_name(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Const(i) => &i.ident,
        Item::Enum(i) => &i.ident,
        Item::Fn(i) => &i.sig.ident,
        Item::Mod(i) => &i.ident,
        Item::Static(i) => &i.ident,
        Item::Struct(i) => &i.ident,
        Item::Trait(i) => &i.ident,
        Item::TraitAlias(i) => &i.ident,
        Item::Type(i) => &i.ident,
        Item::Union(i) => &i.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

fn path_idents(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

fn join_path(prefix: &[String], last: &str) -> String {
    if prefix.is_empty() {
        last.to_string()
    } else {
        format!("{}::{last}", prefix.join("::"))
    }
}

fn join_all(prefix: &[String], rest: &[String]) -> String {
    prefix
        .iter()
        .chain(rest)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("::")
}

fn tokens(node: &impl ToTokens) -> String {
    node.to_token_stream().to_string()
}
