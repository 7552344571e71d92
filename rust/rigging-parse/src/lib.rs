//! Parser grammar for rigging interface files.
//!
//! # This Is Just a Grammar
//!
//! This crate contains **only** the [unsynn] grammar for reading a Rust source
//! file and locating the exported traits that rigging turns into bindings. It
//! does not:
//!
//! - Classify types
//! - Decide which methods can be bound
//! - Generate any code
//!
//! It simply parses files like:
//!
//! ```ignore
//! use rigging::Failure;
//!
//! /// User accounts.
//! pub trait Api {
//!     /// Stores a user and returns its id.
//!     /// @results id
//!     fn set(&self, ctx: rigging::Context, name: String) -> Result<i64, Failure>;
//! }
//! ```
//!
//! ...and produces an AST ([`InterfaceFile`]) that `rigging-codegen` inspects.
//!
//! # Two Stages
//!
//! Whole files contain items rigging does not care about (`use` lines, structs,
//! impls). The file grammar therefore only recognises `pub trait` items and
//! skips every other token tree. Inside a trait, parameter and return types are
//! captured verbatim; [`parse_type`] re-reads them with the [`Type`] grammar on
//! demand, so one exotic type only affects the method that uses it.
//!
//! ```text
//! source text ──► proc-macro2 tokens ──► InterfaceFile ──► InterfaceTrait
//!                                                           └─► InterfaceMethod
//!                                                                ├─► MethodParam ──► parse_type ──► Type
//!                                                                └─► ReturnType  ──► parse_type ──► Type
//! ```
//!
//! [unsynn]: https://docs.rs/unsynn

pub use unsynn::ToTokens;

use proc_macro2::TokenStream as TokenStream2;
use unsynn::operator::names::{
    And, Assign, Colon, Comma, Gt, Lt, PathSep, Pound, RArrow, Semicolon,
};
use unsynn::{
    Any, BraceGroup, BraceGroupContaining, BracketGroupContaining, CommaDelimitedVec, Cons,
    Either, EndOfStream, Except, Ident, LiteralString, Many, Optional,
    ParenthesisGroupContaining, Parse, ToTokenIter, TokenStream, keyword, operator, unsynn,
};

keyword! {
    pub KAsync = "async";
    pub KFn = "fn";
    pub KTrait = "trait";
    pub KSelfKw = "self";
    pub KMut = "mut";
    pub KDoc = "doc";
    pub KPub = "pub";
    pub KWhere = "where";
}

operator! {
    pub Apostrophe = "'";
}

/// Parses tokens and groups until `C` is found, handling `<...>` correctly.
type VerbatimUntil<C> = Many<Cons<Except<C>, AngleTokenTree>>;

unsynn! {
    /// Parses either a `TokenTree` or `<...>` grouping.
    #[derive(Clone)]
    pub struct AngleTokenTree(
        pub Either<Cons<Lt, Vec<Cons<Except<Gt>, AngleTokenTree>>, Gt>, unsynn::TokenTree>,
    );

    pub struct RawAttribute {
        pub _pound: Pound,
        pub body: BracketGroupContaining<TokenStream>,
    }

    pub struct DocAttribute {
        pub _doc: KDoc,
        pub _assign: Assign,
        pub value: LiteralString,
    }

    #[derive(Clone)]
    pub struct Lifetime {
        pub _apostrophe: Apostrophe,
        pub name: Ident,
    }

    pub struct GenericParams {
        pub _lt: Lt,
        pub params: VerbatimUntil<Gt>,
        pub _gt: Gt,
    }

    // ------------------------------------------------------------------
    // Types (second stage)
    // ------------------------------------------------------------------

    #[derive(Clone)]
    pub struct TypePath {
        pub leading: Option<PathSep>,
        pub first: Ident,
        pub rest: Any<Cons<PathSep, Ident>>,
    }

    #[derive(Clone)]
    pub enum Type {
        Reference(TypeRef),
        Tuple(TypeTuple),
        PathWithGenerics(PathWithGenerics),
        Path(TypePath),
    }

    #[derive(Clone)]
    pub struct TypeRef {
        pub _amp: And,
        pub lifetime: Option<Lifetime>,
        pub mutable: Option<KMut>,
        pub inner: Box<Type>,
    }

    #[derive(Clone)]
    pub struct TypeTuple(
        pub ParenthesisGroupContaining<CommaDelimitedVec<Type>>,
    );

    #[derive(Clone)]
    pub struct PathWithGenerics {
        pub path: TypePath,
        pub _lt: Lt,
        pub args: CommaDelimitedVec<Type>,
        pub _gt: Gt,
    }

    // ------------------------------------------------------------------
    // Methods
    // ------------------------------------------------------------------

    pub struct Receiver {
        pub reference: Option<Cons<And, Option<Lifetime>>>,
        pub mutability: Option<KMut>,
        pub _self: KSelfKw,
        pub typed: Option<Cons<Colon, VerbatimUntil<Comma>>>,
    }

    pub enum ParamPattern {
        Binding(Cons<Option<KMut>, Ident>),
        Destructured(VerbatimUntil<Colon>),
    }

    pub struct MethodParam {
        pub pattern: ParamPattern,
        pub _colon: Colon,
        pub ty: VerbatimUntil<Comma>,
    }

    pub struct MethodParams {
        pub receiver: Option<Receiver>,
        pub _comma: Option<Comma>,
        pub params: CommaDelimitedVec<MethodParam>,
    }

    pub struct ReturnType {
        pub _arrow: RArrow,
        pub ty: VerbatimUntil<Either<Semicolon, BraceGroup, KWhere>>,
    }

    pub struct MethodWhereClause {
        pub _where: KWhere,
        pub bounds: VerbatimUntil<Either<Semicolon, BraceGroup>>,
    }

    pub enum MethodBody {
        Declared(Semicolon),
        Provided(BraceGroup),
    }

    pub struct InterfaceMethod {
        pub attributes: Any<RawAttribute>,
        pub asyncness: Option<KAsync>,
        pub _fn: KFn,
        pub name: Ident,
        pub generics: Optional<GenericParams>,
        pub params: ParenthesisGroupContaining<MethodParams>,
        pub return_type: Optional<ReturnType>,
        pub where_clause: Optional<MethodWhereClause>,
        pub body: MethodBody,
    }

    /// Associated types, constants and macro invocations: skipped, never bound.
    pub struct OtherEntry {
        pub attributes: Any<RawAttribute>,
        pub tokens: VerbatimUntil<Either<Semicolon, BraceGroup>>,
        pub end: Either<Semicolon, BraceGroup>,
    }

    pub enum TraitEntry {
        Method(InterfaceMethod),
        Other(OtherEntry),
    }

    // ------------------------------------------------------------------
    // Traits and files
    // ------------------------------------------------------------------

    pub struct Supertraits {
        pub _colon: Colon,
        pub bounds: VerbatimUntil<Either<BraceGroup, KWhere>>,
    }

    pub struct TraitWhereClause {
        pub _where: KWhere,
        pub bounds: VerbatimUntil<BraceGroup>,
    }

    pub struct InterfaceTrait {
        pub attributes: Any<RawAttribute>,
        pub _vis: KPub,
        pub _trait: KTrait,
        pub name: Ident,
        pub generics: Optional<GenericParams>,
        pub supertraits: Optional<Supertraits>,
        pub where_clause: Optional<TraitWhereClause>,
        pub body: BraceGroupContaining<Any<TraitEntry>>,
    }

    /// A `pub trait Name` header whose body did not parse.
    pub struct TraitHeader {
        pub attributes: Any<RawAttribute>,
        pub _vis: KPub,
        pub _trait: KTrait,
        pub name: Ident,
    }

    pub enum FileItem {
        Interface(InterfaceTrait),
        Malformed(TraitHeader),
        Other(unsynn::TokenTree),
    }

    pub struct InterfaceFile {
        pub items: Any<FileItem>,
        pub _eos: EndOfStream,
    }
}

/// Errors produced while reading an interface file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The text is not a valid Rust token stream (unbalanced delimiters, stray characters).
    #[error("not valid Rust tokens: {0}")]
    Lex(String),
    /// The token stream did not match the file grammar.
    #[error("{0}")]
    Grammar(String),
}

/// How a method takes `self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    /// No receiver: an associated function.
    None,
    /// `&self`
    Ref,
    /// `&mut self`
    RefMut,
    /// `self` or `mut self`
    Value,
    /// `self: Type`
    Typed,
}

/// One top-level item of interest.
pub enum Item<'a> {
    Interface(&'a InterfaceTrait),
    /// The name of a `pub trait` whose body could not be parsed.
    Malformed(String),
}

// ============================================================================
// Helper methods for InterfaceFile
// ============================================================================

impl InterfaceFile {
    /// Exported traits and malformed `pub trait` headers, in source order.
    pub fn items(&self) -> impl Iterator<Item = Item<'_>> {
        self.items.iter().filter_map(|entry| match &entry.value {
            FileItem::Interface(t) => Some(Item::Interface(t)),
            FileItem::Malformed(header) => Some(Item::Malformed(header.name.to_string())),
            FileItem::Other(_) => None,
        })
    }
}

// ============================================================================
// Helper methods for InterfaceTrait
// ============================================================================

impl InterfaceTrait {
    /// Get the trait name as a string.
    pub fn name(&self) -> String {
        self.name.to_string()
    }

    /// Doc lines collected from `#[doc = "..."]` attributes.
    pub fn doc_lines(&self) -> Vec<String> {
        collect_doc_lines(&self.attributes)
    }

    pub fn has_generics(&self) -> bool {
        !self.generics.is_empty()
    }

    pub fn has_where_clause(&self) -> bool {
        !self.where_clause.is_empty()
    }

    /// Supertrait bounds split on `+`, whitespace removed (`Send`, `'static`, `std::fmt::Debug`).
    pub fn supertraits(&self) -> Vec<String> {
        let Some(entry) = self.supertraits.iter().next() else {
            return Vec::new();
        };
        compact(&entry.value.bounds.to_token_stream())
            .split('+')
            .filter(|bound| !bound.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Methods in declaration order. Associated items are skipped.
    pub fn methods(&self) -> impl Iterator<Item = &InterfaceMethod> {
        self.body.content.iter().filter_map(|entry| match &entry.value {
            TraitEntry::Method(method) => Some(method),
            TraitEntry::Other(_) => None,
        })
    }

    /// Number of trait body entries that are not methods.
    pub fn skipped_entries(&self) -> usize {
        self.body
            .content
            .iter()
            .filter(|entry| matches!(entry.value, TraitEntry::Other(_)))
            .count()
    }
}

// ============================================================================
// Helper methods for InterfaceMethod
// ============================================================================

impl InterfaceMethod {
    /// Get the method name as a string.
    pub fn name(&self) -> String {
        self.name.to_string()
    }

    /// Doc lines collected from `#[doc = "..."]` attributes.
    pub fn doc_lines(&self) -> Vec<String> {
        collect_doc_lines(&self.attributes)
    }

    pub fn is_async(&self) -> bool {
        self.asyncness.is_some()
    }

    pub fn has_generics(&self) -> bool {
        !self.generics.is_empty()
    }

    pub fn has_where_clause(&self) -> bool {
        !self.where_clause.is_empty()
    }

    pub fn has_default_body(&self) -> bool {
        matches!(self.body, MethodBody::Provided(_))
    }

    /// `<T: Bound>` as written; empty without generics.
    pub fn generics_spelling(&self) -> String {
        compact(&self.generics.to_token_stream())
    }

    /// `where T: Bound` as written; empty without a `where` clause.
    pub fn where_spelling(&self) -> String {
        compact(&self.where_clause.to_token_stream())
    }

    /// The receiver as written: `&self`, `&'a self`, `self: Box<Self>`.
    pub fn receiver_spelling(&self) -> Option<String> {
        self.params
            .content
            .receiver
            .as_ref()
            .map(|receiver| compact(&receiver.to_token_stream()))
    }

    pub fn receiver(&self) -> ReceiverKind {
        let Some(receiver) = &self.params.content.receiver else {
            return ReceiverKind::None;
        };
        if receiver.typed.is_some() {
            return ReceiverKind::Typed;
        }
        match (&receiver.reference, &receiver.mutability) {
            (Some(_), None) => ReceiverKind::Ref,
            (Some(_), Some(_)) => ReceiverKind::RefMut,
            (None, _) => ReceiverKind::Value,
        }
    }

    /// Get an iterator over the method's parameters (excluding the receiver).
    pub fn args(&self) -> impl Iterator<Item = &MethodParam> {
        self.params.content.params.iter().map(|entry| &entry.value)
    }

    /// The declared return type tokens, `None` when the method has no `->`.
    pub fn return_tokens(&self) -> Option<TokenStream2> {
        self.return_type
            .iter()
            .next()
            .map(|r| r.value.ty.to_token_stream())
    }
}

// ============================================================================
// Helper methods for MethodParam
// ============================================================================

impl MethodParam {
    /// The bound identifier, or `None` for `_` and destructuring patterns.
    pub fn binding(&self) -> Option<String> {
        match &self.pattern {
            ParamPattern::Binding(binding) => {
                let name = binding.second.to_string();
                (name != "_").then_some(name)
            }
            ParamPattern::Destructured(_) => None,
        }
    }

    /// The pattern as written, for diagnostics.
    pub fn pattern_spelling(&self) -> String {
        match &self.pattern {
            ParamPattern::Binding(binding) => binding.second.to_string(),
            ParamPattern::Destructured(tokens) => compact(&tokens.to_token_stream()),
        }
    }

    pub fn ty_tokens(&self) -> TokenStream2 {
        self.ty.to_token_stream()
    }
}

// ============================================================================
// Helper methods for Type
// ============================================================================

impl Type {
    /// Extract Ok and Err types if this is Result<T, E>
    pub fn as_result(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::PathWithGenerics(PathWithGenerics { path, args, .. })
                if path.last_segment() == "Result" && args.len() == 2 =>
            {
                let types = args.as_slice();
                Some((&types[0].value, &types[1].value))
            }
            _ => None,
        }
    }

    /// Elements of a tuple type; `()` yields an empty list.
    pub fn tuple_elements(&self) -> Option<Vec<&Type>> {
        match self {
            Type::Tuple(TypeTuple(group)) => {
                Some(group.content.iter().map(|entry| &entry.value).collect())
            }
            _ => None,
        }
    }

    /// `true` for `(T,)`: a one-element tuple, which needs its trailing comma back.
    pub fn is_single_tuple(&self) -> bool {
        match self {
            Type::Tuple(TypeTuple(group)) => {
                group.content.len() == 1 && self.spelling().ends_with(",)")
            }
            _ => false,
        }
    }

    pub fn as_path(&self) -> Option<&TypePath> {
        match self {
            Type::Path(path) => Some(path),
            _ => None,
        }
    }

    /// The type as written, whitespace removed.
    pub fn spelling(&self) -> String {
        compact(&self.to_token_stream())
    }
}

// ============================================================================
// Helper methods for TypePath
// ============================================================================

impl TypePath {
    /// Get the last segment (e.g., "Result" from "std::result::Result")
    pub fn last_segment(&self) -> String {
        self.rest
            .iter()
            .last()
            .map(|seg| seg.value.second.to_string())
            .unwrap_or_else(|| self.first.to_string())
    }

    /// All segments in order, without separators.
    pub fn segments(&self) -> Vec<String> {
        std::iter::once(self.first.to_string())
            .chain(self.rest.iter().map(|seg| seg.value.second.to_string()))
            .collect()
    }

    /// `true` for `::std::...` style absolute paths.
    pub fn is_absolute(&self) -> bool {
        self.leading.is_some()
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Collect doc strings from attributes, one entry per line.
fn collect_doc_lines(attrs: &Any<RawAttribute>) -> Vec<String> {
    let mut docs = Vec::new();

    for attr in attrs.iter() {
        let mut body_iter = attr.value.body.content.clone().to_token_iter();
        if let Ok(doc_attr) = DocAttribute::parse(&mut body_iter) {
            let text = doc_attr.value.as_str().replace("\\\"", "\"");
            docs.extend(text.lines().map(str::to_string));
        }
    }

    docs
}

/// Render tokens without the spacing proc-macro2 inserts, keeping a space
/// between adjacent words (`dyn Trait`, `impl Fn`).
fn compact(tokens: &TokenStream2) -> String {
    let spaced = tokens.to_string();
    let mut out = String::with_capacity(spaced.len());
    let mut pending_space = false;
    for ch in spaced.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev_word = out.chars().last().is_some_and(is_word_char);
            if prev_word && is_word_char(ch) {
                out.push(' ');
            } else if out.ends_with(',') {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Parse an interface file.
pub fn parse_file(source: &str) -> Result<InterfaceFile, ParseError> {
    let tokens: TokenStream2 = source
        .parse()
        .map_err(|e: proc_macro2::LexError| ParseError::Lex(e.to_string()))?;
    let mut iter = tokens.to_token_iter();
    InterfaceFile::parse(&mut iter).map_err(|e| ParseError::Grammar(e.to_string()))
}

/// Re-read captured type tokens with the [`Type`] grammar.
///
/// Returns `None` when the tokens are not exactly one type this grammar knows
/// (slices, pointers, `impl`/`dyn`, function pointers, lifetimes in generic
/// arguments). Callers treat that as an unsupported type.
pub fn parse_type(tokens: &TokenStream2) -> Option<Type> {
    let mut iter = tokens.clone().to_token_iter();
    Cons::<Type, EndOfStream>::parse(&mut iter)
        .ok()
        .map(|parsed| parsed.first)
}

/// Spelling of arbitrary captured tokens, whitespace removed.
pub fn spelling(tokens: &TokenStream2) -> String {
    compact(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_interface(source: &str, check: impl FnOnce(&InterfaceTrait)) {
        let file = parse_file(source).unwrap();
        let api = file
            .items()
            .find_map(|item| match item {
                Item::Interface(t) => Some(t),
                Item::Malformed(_) => None,
            })
            .expect("no interface");
        check(api);
    }

    fn ty(source: &str) -> Option<Type> {
        let tokens: TokenStream2 = source.parse().unwrap();
        parse_type(&tokens)
    }

    #[test]
    fn skips_items_around_the_trait() {
        let file = parse_file(
            r#"
            use rigging::Failure;

            #[derive(Debug)]
            pub struct User { pub name: String }

            trait Private { fn hidden(&self); }

            /// The api.
            pub trait Api {
                fn ping(&self, ctx: rigging::Context) -> Result<(), Failure>;
            }

            impl User { fn new() -> Self { todo!() } }
            "#,
        )
        .unwrap();

        let names: Vec<String> = file
            .items()
            .map(|item| match item {
                Item::Interface(t) => t.name(),
                Item::Malformed(name) => format!("malformed {name}"),
            })
            .collect();
        assert_eq!(names, vec!["Api".to_string()]);
    }

    #[test]
    fn pub_crate_trait_is_not_exported() {
        let file = parse_file("pub(crate) trait Api { fn a(&self); }").unwrap();
        assert_eq!(file.items().count(), 0);
    }

    #[test]
    fn method_parts() {
        with_interface(
            r#"
            pub trait Api: Send + Sync {
                /// Stores a user.
                /// @results id
                fn set(&self, ctx: rigging::Context, mut name: String, _: u8) -> Result<i64, Failure>;
                fn count(&self) -> u64 { 0 }
                async fn later(self);
                type Item;
            }
            "#,
            check_method_parts,
        );
    }

    fn check_method_parts(api: &InterfaceTrait) {
        assert_eq!(api.supertraits(), vec!["Send".to_string(), "Sync".to_string()]);
        assert_eq!(api.skipped_entries(), 1);

        let methods: Vec<&InterfaceMethod> = api.methods().collect();
        assert_eq!(methods.len(), 3);

        let set = methods[0];
        assert_eq!(set.name(), "set");
        assert_eq!(set.receiver(), ReceiverKind::Ref);
        assert_eq!(
            set.doc_lines().iter().map(|l| l.trim()).collect::<Vec<_>>(),
            vec!["Stores a user.", "@results id"]
        );
        let bindings: Vec<Option<String>> = set.args().map(MethodParam::binding).collect();
        assert_eq!(
            bindings,
            vec![Some("ctx".to_string()), Some("name".to_string()), None]
        );
        let ret = ty(&set.return_tokens().unwrap().to_string()).unwrap();
        let (ok, err) = ret.as_result().unwrap();
        assert_eq!(ok.spelling(), "i64");
        assert_eq!(err.spelling(), "Failure");

        assert!(methods[1].has_default_body());
        assert!(methods[1].return_tokens().is_some());

        assert!(methods[2].is_async());
        assert_eq!(methods[2].receiver(), ReceiverKind::Value);
        assert!(methods[2].return_tokens().is_none());
    }

    #[test]
    fn declared_spellings() {
        with_interface(
            r#"
            pub trait Api {
                fn take<'a, T: Into<String>>(&'a self, value: T) -> &'a str where T: Clone;
                fn boxed(self: Box<Self>);
                fn plain(&mut self);
                fn free();
            }
            "#,
            |api| {
                let methods: Vec<&InterfaceMethod> = api.methods().collect();
                assert_eq!(methods[0].generics_spelling(), "<'a, T:Into<String>>");
                assert_eq!(methods[0].receiver_spelling().as_deref(), Some("&'a self"));
                assert_eq!(methods[0].where_spelling(), "where T:Clone");
                assert!(!methods[0].has_default_body());

                assert_eq!(methods[1].receiver_spelling().as_deref(), Some("self:Box<Self>"));
                assert_eq!(methods[1].receiver(), ReceiverKind::Typed);
                assert_eq!(methods[2].receiver_spelling().as_deref(), Some("&mut self"));
                assert_eq!(methods[2].generics_spelling(), "");
                assert_eq!(methods[2].where_spelling(), "");
                assert_eq!(methods[3].receiver_spelling(), None);
            },
        );
    }

    #[test]
    fn malformed_trait_is_reported() {
        let file = parse_file("pub trait Broken<T { fn a(&self); }").unwrap();
        let names: Vec<String> = file
            .items()
            .filter_map(|item| match item {
                Item::Malformed(name) => Some(name),
                Item::Interface(_) => None,
            })
            .collect();
        assert_eq!(names, vec!["Broken".to_string()]);
    }

    #[test]
    fn lex_errors_surface() {
        assert!(matches!(
            parse_file("pub trait Api { fn a(&self);"),
            Err(ParseError::Lex(_))
        ));
    }

    #[test]
    fn type_grammar() {
        assert!(ty("String").unwrap().as_path().is_some());
        assert_eq!(
            ty("::std::time::Duration").unwrap().as_path().unwrap().segments(),
            vec!["std", "time", "Duration"]
        );
        assert!(ty("Vec<String>").unwrap().as_path().is_none());
        assert_eq!(ty("(u8, bool)").unwrap().tuple_elements().unwrap().len(), 2);
        assert_eq!(ty("()").unwrap().tuple_elements().unwrap().len(), 0);
        assert!(ty("(u8,)").unwrap().is_single_tuple());
        assert!(!ty("(u8, u16)").unwrap().is_single_tuple());
        assert!(ty("[u8; 4]").is_none());
        assert!(ty("impl Into<String>").is_none());
        assert!(ty("dyn Fn()").is_none());
    }

    #[test]
    fn compact_spelling() {
        let tokens: TokenStream2 = "HashMap < String , Vec < u8 > >".parse().unwrap();
        assert_eq!(spelling(&tokens), "HashMap<String, Vec<u8>>");
        let tokens: TokenStream2 = "impl Into < String >".parse().unwrap();
        assert_eq!(spelling(&tokens), "impl Into<String>");
    }
}
