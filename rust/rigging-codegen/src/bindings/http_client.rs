//! Remote client bindings.

use super::{
    BindingTarget, ClientMethod, declared_header, write_assertion, write_declared_scope,
    write_method_signature, write_preamble,
};
use crate::code_writer::CodeWriter;
use crate::contract::Contract;
use crate::cw_writeln;
use crate::extract::MethodSignature;

pub fn render_http_client(target: &BindingTarget<'_>) -> String {
    let trait_path = target.trait_path();
    let unit = &target.interface.unit;
    let bound = format!("::rigging::Transport{}", target.static_bound());

    // A declared method with a default body keeps it: there is nothing to send.
    let methods: Vec<ClientMethod<'_>> = target
        .methods()
        .filter(|method| match method {
            ClientMethod::Bound(_) => true,
            ClientMethod::Declared(sig) => !sig.declaration.has_default_body,
        })
        .collect();

    let mut w = CodeWriter::new();
    write_preamble(
        &mut w,
        &format!("Remote client for `{trait_path}`."),
        unit,
        target.module_path,
    );
    if !target.contracts.is_empty() {
        cw_writeln!(w, "use {}::server::http_gen as wire;", target.module_path);
    }
    if methods.iter().any(ClientMethod::is_declared) {
        write_declared_scope(&mut w, target.module_path);
    }

    w.blank_line();
    cw_writeln!(w, "/// Calls `{trait_path}` through a [`::rigging::Transport`].");
    w.writeln("///");
    w.writeln("/// Failures of the exchange itself and failures reported by the remote");
    w.writeln("/// implementation both land in the `Err` position; use");
    w.writeln("/// [`::rigging::Failure::is_remote`] to tell them apart.");
    w.writeln("#[derive(Clone)]");
    w.block("pub struct Client<T>", |w| {
        w.writeln("transport: T,");
    });

    w.blank_line();
    w.block(&format!("impl<T: {bound}> Client<T>"), |w| {
        w.block("pub fn new(transport: T) -> Self", |w| {
            w.writeln("Self { transport }");
        });
        w.blank_line();
        w.block("pub fn transport(&self) -> &T", |w| {
            w.writeln("&self.transport");
        });
    });

    w.blank_line();
    w.block(&format!("impl<T: {bound}> {trait_path} for Client<T>"), |w| {
        for (i, method) in methods.iter().enumerate() {
            if i > 0 {
                w.blank_line();
            }
            match method {
                ClientMethod::Bound(contract) => write_method(w, &trait_path, contract),
                ClientMethod::Declared(sig) => write_unbound(w, &trait_path, sig),
            }
        }
    });

    write_assertion(
        &mut w,
        &trait_path,
        &format!("<T: {bound}>"),
        "Client<T>",
    );
    w.finish()
}

fn write_method(w: &mut CodeWriter, trait_path: &str, contract: &Contract) {
    let ctx = contract.context_param();
    // Only the first context travels; the others are accepted and ignored.
    let mut seen_context = false;
    let params: Vec<String> = contract
        .params
        .iter()
        .map(|param| {
            if param.ty.is_context() {
                let used = !seen_context;
                seen_context = true;
                if !used {
                    return format!("_: {}", param.ty.render());
                }
            }
            format!("{}: {}", param.ident, param.ty.render())
        })
        .collect();

    write_method_signature(w, contract, &params);
    w.writeln(" {");
    let indent = w.indent();

    // Built inline: a parameter may be named like any local this body declares.
    let fields: Vec<&str> = contract
        .request
        .fields
        .iter()
        .map(|field| field.ident.as_str())
        .collect();
    let request = if fields.is_empty() {
        format!("wire::{} {{}}", contract.request.type_name)
    } else {
        format!(
            "wire::{} {{ {} }}",
            contract.request.type_name,
            fields.join(", ")
        )
    };

    let ctx_expr = match ctx {
        Some(ctx) => format!("&{ctx}"),
        None => "&::rigging::Context::background()".to_string(),
    };
    let exchange = format!(
        "::rigging::call(&self.transport, {ctx_expr}, wire::{}, &{request})",
        contract.path_const
    );
    let binding = if contract.call_results.is_empty() {
        "_"
    } else {
        "response"
    };
    let values: Vec<String> = contract
        .call_results
        .iter()
        .map(|ident| format!("response.{ident}"))
        .collect();
    let value = contract.value_shape(&values);

    match &contract.failure {
        Some(_) => {
            cw_writeln!(
                w,
                "let {binding}: wire::{} = {exchange}?;",
                contract.response.type_name
            );
            cw_writeln!(w, "Ok({value})");
        }
        None => {
            cw_writeln!(
                w,
                "let {binding}: wire::{} = match {exchange} {{",
                contract.response.type_name
            );
            {
                let _indent = w.indent();
                w.writeln("Ok(response) => response,");
                cw_writeln!(
                    w,
                    "Err(failure) => panic!(\"`{trait_path}::{}` cannot report a failure, but its call failed: {{failure}}\"),",
                    contract.method
                );
            }
            w.writeln("};");
            if !values.is_empty() {
                cw_writeln!(w, "{value}");
            }
        }
    }

    drop(indent);
    w.writeln("}");
}

/// Answers without an exchange: the failure channel carries the refusal when
/// there is one, otherwise the call panics.
fn write_unbound(w: &mut CodeWriter, trait_path: &str, sig: &MethodSignature) {
    let params: Vec<String> = sig
        .declaration
        .params
        .iter()
        .map(|param| format!("_: {}", param.ty))
        .collect();
    let message = format!("`{trait_path}::{}` has no remote binding", sig.name);
    w.block(&declared_header(sig, &params), |w| {
        if sig.reports_failures() {
            cw_writeln!(w, "Err(::rigging::Failure::msg({message:?}))");
        } else {
            cw_writeln!(w, "panic!({message:?})");
        }
    });
}
