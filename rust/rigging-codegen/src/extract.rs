//! Signature extraction: interface file text → ordered method signatures.

use proc_macro2::TokenStream;
use rigging_parse::{
    InterfaceMethod, InterfaceTrait, Item, ReceiverKind, parse_file, parse_type, spelling,
};

use crate::classify::{Classified, classify, classify_tokens};
use crate::error::UnitError;

/// Doc line that names a method's results: `/// @results id, created`.
const RESULTS_TAG: &str = "@results";

/// Supertraits a bound interface may carry; the generated clients satisfy all three.
const ALLOWED_SUPERTRAITS: &[&str] = &["Send", "Sync", "'static"];

/// A named, classified parameter or result. An empty name means anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: Classified,
}

impl Variable {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// One trait method, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    /// Doc lines without the `@results` line.
    pub doc: Vec<String>,
    pub params: Vec<Variable>,
    /// `Result<T, E>` contributes the elements of `T` followed by `E`.
    pub results: Vec<Variable>,
    /// Names given by `@results`, in order, before any validation.
    pub result_names: Vec<String>,
    pub receiver: ReceiverKind,
    pub is_async: bool,
    pub has_generics: bool,
    pub has_where_clause: bool,
    /// The return type is a `Result`; its `Err` type is the last result.
    pub returns_result: bool,
    /// The (`Ok`) value is a tuple, so callers expect `(a, b)` back.
    pub returns_tuple: bool,
    pub declaration: Declaration,
}

/// A method header exactly as the trait spells it.
///
/// Clients implement methods that have no contract from this, since every
/// trait method needs an implementation whether or not it can cross the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// `<T: Bound>`, or empty.
    pub generics: String,
    /// `&self`, `&'a self`, `self: Box<Self>`; `None` for associated functions.
    pub receiver: Option<String>,
    pub params: Vec<DeclaredParam>,
    /// Return type, `None` without `->`.
    pub output: Option<String>,
    /// `where T: Bound`, or empty.
    pub where_clause: String,
    pub has_default_body: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParam {
    /// The bound identifier; `None` for `_` and destructuring patterns.
    pub binding: Option<String>,
    pub ty: String,
}

impl MethodSignature {
    /// The `Err` type is the failure channel, so a fallible answer can be given
    /// without calling anything.
    pub fn reports_failures(&self) -> bool {
        self.returns_result && self.results.last().is_some_and(|last| last.ty.is_failure())
    }

    /// Forwarding through a shared reference is possible: `&self` or `&'a self`.
    pub fn borrows_self(&self) -> bool {
        self.receiver == ReceiverKind::Ref
    }
}

/// The exported trait chosen from an interface file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub unit: String,
    pub doc: Vec<String>,
    /// The trait has a `'static` supertrait.
    pub requires_static: bool,
    pub methods: Vec<MethodSignature>,
}

/// Parse `source` and extract the interface of `unit`.
///
/// `wanted` selects a trait by name; `None` takes the first `pub trait`.
pub fn extract(source: &str, unit: &str, wanted: Option<&str>) -> Result<Interface, UnitError> {
    let file = parse_file(source)?;

    let mut chosen = None;
    for item in file.items() {
        match item {
            Item::Interface(t) if wanted.is_none_or(|name| t.name() == name) => {
                chosen = Some(t);
                break;
            }
            Item::Malformed(name) if wanted.is_none_or(|wanted| name == wanted) => {
                return Err(UnitError::ParseFailure(format!(
                    "the body of trait `{name}` does not parse"
                )));
            }
            _ => {}
        }
    }
    let Some(interface) = chosen else {
        return Err(UnitError::NoInterfaceFound {
            wanted: wanted.map(str::to_string),
        });
    };

    check_interface(interface)?;

    let methods = interface
        .methods()
        .map(|method| extract_method(method, unit))
        .collect::<Vec<_>>();

    tracing::debug!(
        interface = %interface.name(),
        unit,
        methods = methods.len(),
        skipped = interface.skipped_entries(),
        "extracted interface"
    );

    Ok(Interface {
        name: interface.name(),
        unit: unit.to_string(),
        doc: interface.doc_lines(),
        requires_static: interface.supertraits().iter().any(|s| s == "'static"),
        methods,
    })
}

fn check_interface(interface: &InterfaceTrait) -> Result<(), UnitError> {
    let unsupported = |reason: String| UnitError::UnsupportedInterface {
        interface: interface.name(),
        reason,
    };
    if interface.has_generics() {
        return Err(unsupported("generic traits are not supported".into()));
    }
    if interface.has_where_clause() {
        return Err(unsupported("`where` clauses are not supported".into()));
    }
    if let Some(bound) = interface
        .supertraits()
        .into_iter()
        .find(|bound| !ALLOWED_SUPERTRAITS.contains(&bound.as_str()))
    {
        return Err(unsupported(format!(
            "supertrait `{bound}` cannot be satisfied by generated clients"
        )));
    }
    Ok(())
}

fn extract_method(method: &InterfaceMethod, unit: &str) -> MethodSignature {
    let (doc, result_names) = split_doc(method.doc_lines());

    let params = method
        .args()
        .map(|arg| Variable {
            name: arg.binding().unwrap_or_default(),
            ty: classify_tokens(&arg.ty_tokens(), unit),
        })
        .collect();

    let declaration = Declaration {
        generics: method.generics_spelling(),
        receiver: method.receiver_spelling(),
        params: method
            .args()
            .map(|arg| DeclaredParam {
                binding: arg.binding(),
                ty: spelling(&arg.ty_tokens()),
            })
            .collect(),
        output: method.return_tokens().map(|tokens| spelling(&tokens)),
        where_clause: method.where_spelling(),
        has_default_body: method.has_default_body(),
    };

    let unpacked = unpack_return(method.return_tokens(), unit);
    let mut results = unpacked.results;

    // `@results` names the values, never the failure.
    let value_count = results.len() - usize::from(unpacked.returns_result);
    for (result, name) in results[..value_count].iter_mut().zip(&result_names) {
        result.name = name.clone();
    }

    MethodSignature {
        name: method.name(),
        doc,
        params,
        results,
        result_names,
        receiver: method.receiver(),
        is_async: method.is_async(),
        has_generics: method.has_generics(),
        has_where_clause: method.has_where_clause(),
        returns_result: unpacked.returns_result,
        returns_tuple: unpacked.returns_tuple,
        declaration,
    }
}

/// Separate the `@results` line from the rest of the docs.
fn split_doc(lines: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut doc = Vec::with_capacity(lines.len());
    let mut names = Vec::new();
    for line in lines {
        match line.trim().strip_prefix(RESULTS_TAG) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                names.extend(
                    rest.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
            }
            _ => doc.push(line),
        }
    }
    // A trailing empty doc line is left over when `@results` closes the docs.
    while doc.last().is_some_and(|line| line.trim().is_empty()) {
        doc.pop();
    }
    (doc, names)
}

struct Unpacked {
    results: Vec<Variable>,
    returns_result: bool,
    returns_tuple: bool,
}

fn anonymous(ty: Classified) -> Variable {
    Variable {
        name: String::new(),
        ty,
    }
}

fn unpack_return(tokens: Option<TokenStream>, unit: &str) -> Unpacked {
    let Some(tokens) = tokens else {
        return Unpacked {
            results: Vec::new(),
            returns_result: false,
            returns_tuple: false,
        };
    };
    let Some(ty) = parse_type(&tokens) else {
        return Unpacked {
            results: vec![anonymous(classify_tokens(&tokens, unit))],
            returns_result: false,
            returns_tuple: false,
        };
    };

    let (value, err) = match ty.as_result() {
        Some((ok, err)) => (ok, Some(err)),
        None => (&ty, None),
    };

    let (mut results, returns_tuple) = match value.tuple_elements() {
        // `(T)` is `T` in parentheses, not a tuple.
        Some(elements) if elements.len() == 1 && !value.is_single_tuple() => {
            (vec![anonymous(classify(elements[0], unit))], false)
        }
        Some(elements) => (
            elements
                .into_iter()
                .map(|element| anonymous(classify(element, unit)))
                .collect::<Vec<_>>(),
            true,
        ),
        None => (vec![anonymous(classify(value, unit))], false),
    };
    if let Some(err) = err {
        results.push(anonymous(classify(err, unit)));
    }

    Unpacked {
        results,
        returns_result: err.is_some(),
        returns_tuple,
    }
}
