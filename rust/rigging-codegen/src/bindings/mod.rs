//! Renderers for the per-unit bindings.
//!
//! Each renderer is a pure function from the extracted interface and its
//! contracts to the text of one `include!`-able Rust file. All three agree on
//! the contracts, so a remote client talking to the handlers behaves like the
//! local client calling the implementation directly.
//!
//! | file                  | contents                                            |
//! |-----------------------|-----------------------------------------------------|
//! | `server/http_gen.rs`  | request/response structs, paths, handlers, router    |
//! | `client/http_gen.rs`  | `Client<T: Transport>` implementing the trait        |
//! | `client/local_gen.rs` | `Client<A>` forwarding to an `Arc<A>`                |
//!
//! A method without a contract has no handler, but the clients still have to
//! implement it. They copy its header from the [`Declaration`] and bring the
//! interface file's names into scope so the copied types resolve.
//!
//! [`Declaration`]: crate::extract::Declaration

mod http_client;
mod local_client;
mod server;

pub use http_client::render_http_client;
pub use local_client::render_local_client;
pub use server::render_server;

use crate::code_writer::CodeWriter;
use crate::contract::Contract;
use crate::cw_writeln;
use crate::extract::{Interface, MethodSignature};

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// @generated by rigging-codegen";

/// Everything a renderer needs about one unit.
#[derive(Debug, Clone, Copy)]
pub struct BindingTarget<'a> {
    pub interface: &'a Interface,
    /// Rust path of the unit module, e.g. `crate::apollo::users`.
    pub module_path: &'a str,
    /// Contracts of the methods that synthesized, in declaration order.
    pub contracts: &'a [Contract],
}

/// One trait method as a client sees it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ClientMethod<'a> {
    Bound(&'a Contract),
    /// No contract: implemented from the declared header.
    Declared(&'a MethodSignature),
}

impl ClientMethod<'_> {
    pub(crate) fn is_declared(&self) -> bool {
        matches!(self, ClientMethod::Declared(_))
    }
}

impl<'a> BindingTarget<'a> {
    /// Every trait method in declaration order, with its contract when it has one.
    pub(crate) fn methods(self) -> impl Iterator<Item = ClientMethod<'a>> {
        self.interface.methods.iter().map(move |sig| {
            match self.contracts.iter().find(|contract| contract.method == sig.name) {
                Some(contract) => ClientMethod::Bound(contract),
                None => ClientMethod::Declared(sig),
            }
        })
    }

    /// `users::Api`
    pub fn trait_path(&self) -> String {
        format!("{}::{}", self.interface.unit, self.interface.name)
    }

    /// Bound that generic clients need so they satisfy the trait's supertraits.
    fn static_bound(&self) -> &'static str {
        if self.interface.requires_static {
            " + 'static"
        } else {
            ""
        }
    }
}

/// Header comment and the import of the unit module.
pub(crate) fn write_preamble(w: &mut CodeWriter, summary: &str, unit: &str, module_path: &str) {
    w.writeln(GENERATED_HEADER);
    w.writeln("//");
    cw_writeln!(w, "// {summary}");
    w.blank_line();
    write_unit_import(w, unit, module_path);
}

pub(crate) fn write_unit_import(w: &mut CodeWriter, unit: &str, module_path: &str) {
    let last = module_path.rsplit("::").next().unwrap_or(module_path);
    if last == unit {
        cw_writeln!(w, "use {module_path};");
    } else {
        cw_writeln!(w, "use {module_path} as {unit};");
    }
}

/// Makes every name visible in the unit module visible here, for headers
/// copied from the interface file.
pub(crate) fn write_declared_scope(w: &mut CodeWriter, module_path: &str) {
    w.writeln("#[allow(unused_imports)]");
    cw_writeln!(w, "use {module_path}::*;");
}

/// A compile-time proof that `concrete` implements `bound`, for every choice
/// of the generics in `generics`.
pub(crate) fn write_assertion(w: &mut CodeWriter, bound: &str, generics: &str, concrete: &str) {
    w.blank_line();
    w.block_closed_by("const _: () =", "};", |w| {
        w.writeln("#[allow(dead_code)]");
        cw_writeln!(w, "fn assert_implements<T: {bound} + ?Sized>() {{}}");
        w.blank_line();
        w.writeln("#[allow(dead_code)]");
        w.block(&format!("fn assert_all{generics}()"), |w| {
            cw_writeln!(w, "assert_implements::<{concrete}>();");
        });
    });
}

/// `name: Type` pairs for a generated trait method signature.
pub(crate) fn write_method_signature(w: &mut CodeWriter, contract: &Contract, params: &[String]) {
    let method = &contract.method;
    let mut header = format!("fn {method}(&self");
    for param in params {
        header.push_str(", ");
        header.push_str(param);
    }
    header.push(')');
    if let Some(ret) = contract.return_type() {
        header.push_str(" -> ");
        header.push_str(&ret);
    }
    w.write(&header);
}

/// The method header as the trait declares it, with `params` after the receiver.
pub(crate) fn declared_header(sig: &MethodSignature, params: &[String]) -> String {
    let declaration = &sig.declaration;
    let mut header = String::new();
    if sig.is_async {
        header.push_str("async ");
    }
    header.push_str("fn ");
    header.push_str(&sig.name);
    header.push_str(&declaration.generics);
    let inputs: Vec<&str> = declaration
        .receiver
        .iter()
        .chain(params)
        .map(String::as_str)
        .collect();
    header.push('(');
    header.push_str(&inputs.join(", "));
    header.push(')');
    if let Some(output) = &declaration.output {
        header.push_str(" -> ");
        header.push_str(output);
    }
    if !declaration.where_clause.is_empty() {
        header.push(' ');
        header.push_str(&declaration.where_clause);
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_import_aliases_when_needed() {
        let mut w = CodeWriter::new();
        write_unit_import(&mut w, "users", "crate::apollo::users");
        write_unit_import(&mut w, "users", "crate::apollo::accounts");
        assert_eq!(
            w.finish(),
            "use crate::apollo::users;\nuse crate::apollo::accounts as users;\n"
        );
    }

    #[test]
    fn assertion_block() {
        let mut w = CodeWriter::new();
        w.writeln("pub struct Client;");
        write_assertion(&mut w, "users::Api", "", "Client");
        assert_eq!(
            w.finish(),
            "pub struct Client;\n\
             \n\
             const _: () = {\n    \
                 #[allow(dead_code)]\n    \
                 fn assert_implements<T: users::Api + ?Sized>() {}\n\
             \n    \
                 #[allow(dead_code)]\n    \
                 fn assert_all() {\n        \
                     assert_implements::<Client>();\n    \
                 }\n\
             };\n"
        );
    }
}
