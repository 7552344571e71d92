//! Contract synthesis: one method signature → the request and response
//! shapes every binding agrees on.
//!
//! Synthesis is a pure function. It drops the context parameters from the
//! request and the failure from the response, names anonymous results, and
//! records the exact argument and result order the renderers use to rebuild
//! calls.

use std::collections::HashSet;

use rigging_parse::ReceiverKind;

use crate::classify::{Classified, TypeReference};
use crate::error::MethodError;
use crate::extract::{MethodSignature, Variable};
use crate::naming::{export_name, is_ident, is_keyword, path_const, result_name_for_type, upper_camel};

/// A serialized field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Rust field name.
    pub ident: String,
    /// JSON key.
    pub wire_name: String,
    pub ty: TypeReference,
}

/// A generated request or response struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub type_name: String,
    pub fields: Vec<Field>,
}

/// A parameter as it appears in generated method signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ident: String,
    pub ty: TypeReference,
}

/// One argument of the call into the implementation, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// Supplied by the transport, never serialized.
    Context,
    /// A request field, by ident.
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub method: String,
    pub doc: Vec<String>,
    /// `/{unit}/{Method}`
    pub path: String,
    /// Name of the generated constant holding `path`.
    pub path_const: String,
    pub request: Shape,
    pub response: Shape,
    /// Every declared parameter, context included.
    pub params: Vec<Param>,
    pub call_params: Vec<CallArg>,
    /// Response field idents in result order.
    pub call_results: Vec<String>,
    pub failure: Option<TypeReference>,
    pub returns_tuple: bool,
}

impl Contract {
    /// Ident of the first context parameter; remote clients send its deadline.
    pub fn context_param(&self) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.ty.is_context())
            .map(|param| param.ident.as_str())
    }

    /// The declared return type, `None` when the method returns nothing.
    pub fn return_type(&self) -> Option<String> {
        let values: Vec<String> = self.response.fields.iter().map(|f| f.ty.render()).collect();
        let value = if self.returns_tuple {
            Some(tuple(&values))
        } else {
            values.into_iter().next()
        };
        match (&self.failure, value) {
            (Some(failure), value) => Some(format!(
                "::std::result::Result<{}, {}>",
                value.unwrap_or_else(|| "()".to_string()),
                failure.render()
            )),
            (None, value) => value,
        }
    }

    /// A pattern or expression over `names` shaped like the declared value.
    pub fn value_shape<S: AsRef<str>>(&self, names: &[S]) -> String {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        if self.returns_tuple {
            tuple(&names)
        } else {
            names.into_iter().next().unwrap_or_else(|| "()".to_string())
        }
    }
}

/// `(a, b)`, `(a,)` or `()`.
fn tuple(items: &[String]) -> String {
    match items {
        [] => "()".to_string(),
        [single] => format!("({single},)"),
        many => format!("({})", many.join(", ")),
    }
}

/// Derive the contract of `sig` in `unit`.
pub fn synthesize(sig: &MethodSignature, unit: &str) -> Result<Contract, MethodError> {
    let method = sig.name.as_str();
    check_shape(sig)?;

    let mut params = Vec::with_capacity(sig.params.len());
    let mut call_params = Vec::with_capacity(sig.params.len());
    let mut request_fields: Vec<Field> = Vec::new();
    let declared: HashSet<&str> = sig.params.iter().map(|p| p.name.as_str()).collect();

    for (position, param) in sig.params.iter().enumerate() {
        let ty = supported(method, param, || format!("parameter {position}"))?;
        if ty.is_failure() {
            return Err(MethodError::signature(
                method,
                "`Failure` is only allowed as the error type of a `Result`",
            ));
        }
        if ty.is_context() {
            let ident = if param.is_anonymous() {
                fresh_context_ident(&declared, &params)
            } else {
                param.name.clone()
            };
            params.push(Param { ident, ty: ty.clone() });
            call_params.push(CallArg::Context);
            continue;
        }
        if param.is_anonymous() {
            return Err(MethodError::MissingParameterName {
                method: method.to_string(),
                position,
            });
        }
        let field = Field {
            ident: param.name.clone(),
            wire_name: export_name(&param.name),
            ty: ty.clone(),
        };
        if let Some(clash) = request_fields.iter().find(|f| f.wire_name == field.wire_name) {
            return Err(MethodError::signature(
                method,
                format!(
                    "parameters `{}` and `{}` share the wire name `{}`",
                    clash.ident, field.ident, field.wire_name
                ),
            ));
        }
        params.push(Param {
            ident: param.name.clone(),
            ty: ty.clone(),
        });
        call_params.push(CallArg::Field(param.name.clone()));
        request_fields.push(field);
    }

    let (values, failure) = split_failure(sig)?;
    let response_fields = name_results(sig, &values)?;

    let type_name = upper_camel(method);
    Ok(Contract {
        method: method.to_string(),
        doc: sig.doc.clone(),
        path: format!("/{unit}/{type_name}"),
        path_const: path_const(method),
        request: Shape {
            type_name: format!("{type_name}Request"),
            fields: request_fields,
        },
        call_results: response_fields.iter().map(|f| f.ident.clone()).collect(),
        response: Shape {
            type_name: format!("{type_name}Response"),
            fields: response_fields,
        },
        params,
        call_params,
        failure,
        returns_tuple: sig.returns_tuple,
    })
}

/// `ctx`, `ctx1`, ... whichever is not already a parameter name.
fn fresh_context_ident(declared: &HashSet<&str>, params: &[Param]) -> String {
    let free = |name: &str| !declared.contains(name) && params.iter().all(|p| p.ident != name);
    if free("ctx") {
        return "ctx".to_string();
    }
    (1..)
        .map(|n| format!("ctx{n}"))
        .find(|name| free(name.as_str()))
        .unwrap_or_default()
}

fn check_shape(sig: &MethodSignature) -> Result<(), MethodError> {
    let method = sig.name.as_str();
    if sig.is_async {
        return Err(MethodError::signature(method, "async methods are not supported"));
    }
    if sig.has_generics {
        return Err(MethodError::signature(method, "generic methods are not supported"));
    }
    if sig.has_where_clause {
        return Err(MethodError::signature(method, "`where` clauses are not supported"));
    }
    if sig.receiver != ReceiverKind::Ref {
        return Err(MethodError::signature(method, "methods must take `&self`"));
    }
    Ok(())
}

fn supported<'a>(
    method: &str,
    var: &'a Variable,
    unnamed: impl FnOnce() -> String,
) -> Result<&'a TypeReference, MethodError> {
    match &var.ty {
        Classified::Type(ty) => Ok(ty),
        Classified::Unsupported(spelling) => Err(MethodError::UnsupportedType {
            method: method.to_string(),
            field: if var.is_anonymous() { unnamed() } else { var.name.clone() },
            spelling: spelling.clone(),
        }),
    }
}

/// Separate the value results from the `Err` type of a `Result` return.
fn split_failure(
    sig: &MethodSignature,
) -> Result<(Vec<(Variable, TypeReference)>, Option<TypeReference>), MethodError> {
    let method = sig.name.as_str();
    let (values, err) = match (sig.returns_result, sig.results.split_last()) {
        (true, Some((err, values))) => (values, Some(err)),
        _ => (sig.results.as_slice(), None),
    };

    let mut typed = Vec::with_capacity(values.len());
    for (position, value) in values.iter().enumerate() {
        let ty = supported(method, value, || format!("result {position}"))?;
        if ty.is_failure() {
            return Err(MethodError::signature(
                method,
                "`Failure` is only allowed as the error type of a `Result`",
            ));
        }
        typed.push((value.clone(), ty.clone()));
    }

    let failure = match err {
        Some(err) => match err.ty.as_type() {
            Some(ty) if ty.is_failure() => Some(ty.clone()),
            _ => {
                return Err(MethodError::signature(
                    method,
                    format!(
                        "error type `{}` is not `rigging::Failure`",
                        err.ty.spelling()
                    ),
                ));
            }
        },
        None => None,
    };
    Ok((typed, failure))
}

/// Response fields: `@results` names first, then synthesized names for the rest.
fn name_results(
    sig: &MethodSignature,
    values: &[(Variable, TypeReference)],
) -> Result<Vec<Field>, MethodError> {
    let method = sig.name.as_str();
    if sig.result_names.len() > values.len() {
        return Err(MethodError::signature(
            method,
            format!(
                "`@results` names {} values but the method returns {}",
                sig.result_names.len(),
                values.len()
            ),
        ));
    }

    let mut taken: HashSet<String> = HashSet::new();
    for name in &sig.result_names {
        if !is_ident(name) || is_keyword(name) || name.starts_with("r#") {
            return Err(MethodError::signature(
                method,
                format!("`@results` name `{name}` is not a plain identifier"),
            ));
        }
        let wire = export_name(name);
        if !taken.insert(wire) {
            return Err(MethodError::DuplicateResultName {
                method: method.to_string(),
                name: name.clone(),
            });
        }
    }

    let mut fields = Vec::with_capacity(values.len());
    for (var, ty) in values {
        let ident = if var.is_anonymous() {
            let base = result_name_for_type(&ty.name);
            let mut candidate = base.clone();
            let mut suffix = 0;
            while taken.contains(&export_name(&candidate)) {
                suffix += 1;
                candidate = format!("{base}_{suffix}");
            }
            taken.insert(export_name(&candidate));
            candidate
        } else {
            var.name.clone()
        };
        fields.push(Field {
            wire_name: export_name(&ident),
            ident,
            ty: ty.clone(),
        });
    }
    Ok(fields)
}
