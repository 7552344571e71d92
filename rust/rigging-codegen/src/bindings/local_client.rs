//! Local delegating client bindings: same trait, no serialization.

use super::{
    BindingTarget, ClientMethod, declared_header, write_assertion, write_declared_scope,
    write_method_signature, write_preamble,
};
use crate::code_writer::CodeWriter;
use crate::contract::Contract;
use crate::cw_writeln;
use crate::extract::MethodSignature;

pub fn render_local_client(target: &BindingTarget<'_>) -> String {
    let trait_path = target.trait_path();
    // A default body is only kept when the call cannot be forwarded.
    let methods: Vec<ClientMethod<'_>> = target
        .methods()
        .filter(|method| match method {
            ClientMethod::Bound(_) => true,
            ClientMethod::Declared(sig) => forwardable(sig) || !sig.declaration.has_default_body,
        })
        .collect();

    let mut w = CodeWriter::new();
    write_preamble(
        &mut w,
        &format!("In-process client for `{trait_path}`."),
        &target.interface.unit,
        target.module_path,
    );
    if methods.iter().any(ClientMethod::is_declared) {
        write_declared_scope(&mut w, target.module_path);
    }

    w.blank_line();
    cw_writeln!(w, "/// Forwards every call of `{trait_path}` to an implementation in this process.");
    w.block("pub struct Client<A: ?Sized>", |w| {
        w.writeln("api: ::std::sync::Arc<A>,");
    });

    w.blank_line();
    w.block("impl<A: ?Sized> Client<A>", |w| {
        w.block("pub fn new(api: ::std::sync::Arc<A>) -> Self", |w| {
            w.writeln("Self { api }");
        });
        w.blank_line();
        w.block("pub fn inner(&self) -> &::std::sync::Arc<A>", |w| {
            w.writeln("&self.api");
        });
    });

    w.blank_line();
    w.block("impl<A: ?Sized> Clone for Client<A>", |w| {
        w.block("fn clone(&self) -> Self", |w| {
            w.writeln("Self { api: ::std::sync::Arc::clone(&self.api) }");
        });
    });

    w.blank_line();
    w.block(
        &format!("impl<A: {trait_path} + ?Sized> {trait_path} for Client<A>"),
        |w| {
            for (i, method) in methods.iter().enumerate() {
                if i > 0 {
                    w.blank_line();
                }
                match method {
                    ClientMethod::Bound(contract) => write_bound(w, &trait_path, contract),
                    ClientMethod::Declared(sig) if forwardable(sig) => write_forward(w, &trait_path, sig),
                    ClientMethod::Declared(sig) => write_unforwardable(w, &trait_path, sig),
                }
            }
        },
    );

    write_assertion(
        &mut w,
        &trait_path,
        &format!("<A: {trait_path} + ?Sized>"),
        "Client<A>",
    );
    w.finish()
}

/// Calls go through the trait path so methods of `Arc` itself never win.
fn forward_call(trait_path: &str, method: &str, args: &[&str]) -> String {
    let mut inputs = vec!["&*self.api"];
    inputs.extend_from_slice(args);
    format!("{trait_path}::{method}({})", inputs.join(", "))
}

fn write_bound(w: &mut CodeWriter, trait_path: &str, contract: &Contract) {
    let params: Vec<String> = contract
        .params
        .iter()
        .map(|param| format!("{}: {}", param.ident, param.ty.render()))
        .collect();
    let args: Vec<&str> = contract
        .params
        .iter()
        .map(|param| param.ident.as_str())
        .collect();
    write_method_signature(w, contract, &params);
    w.writeln(" {");
    {
        let _indent = w.indent();
        w.writeln(&forward_call(trait_path, &contract.method, &args));
    }
    w.writeln("}");
}

/// Only `&self` methods can reach the implementation behind an `Arc`, and
/// `where Self: Sized` methods cannot be called on an unsized `A`.
fn forwardable(sig: &MethodSignature) -> bool {
    sig.borrows_self() && !sig.declaration.where_clause.contains("Self:Sized")
}

fn write_forward(w: &mut CodeWriter, trait_path: &str, sig: &MethodSignature) {
    let declared = &sig.declaration.params;
    let taken: Vec<&str> = declared
        .iter()
        .filter_map(|param| param.binding.as_deref())
        .collect();
    let names: Vec<String> = declared
        .iter()
        .enumerate()
        .map(|(i, param)| match &param.binding {
            Some(binding) => binding.clone(),
            None => {
                let mut name = format!("arg{i}");
                while taken.contains(&name.as_str()) {
                    name.insert(0, '_');
                }
                name
            }
        })
        .collect();
    let params: Vec<String> = names
        .iter()
        .zip(declared)
        .map(|(name, param)| format!("{name}: {}", param.ty))
        .collect();

    let args: Vec<&str> = names.iter().map(String::as_str).collect();
    let call = forward_call(trait_path, &sig.name, &args);
    w.block(&declared_header(sig, &params), |w| {
        if sig.is_async {
            cw_writeln!(w, "{call}.await");
        } else {
            w.writeln(&call);
        }
    });
}

fn write_unforwardable(w: &mut CodeWriter, trait_path: &str, sig: &MethodSignature) {
    let params: Vec<String> = sig
        .declaration
        .params
        .iter()
        .map(|param| format!("_: {}", param.ty))
        .collect();
    let message = format!(
        "`{trait_path}::{}` cannot be forwarded to a shared implementation",
        sig.name
    );
    w.block(&declared_header(sig, &params), |w| {
        cw_writeln!(w, "panic!({message:?})");
    });
}
