//! Remote handler bindings: wire structs, request paths, one handler per
//! method and a function registering them all on a [`rigging::Router`].
//!
//! A request body that does not decode is answered with `400`; a failure
//! returned by the implementation with `500`. The context handed to the
//! implementation always comes from the transport.

use super::{BindingTarget, write_preamble};
use crate::code_writer::CodeWriter;
use crate::contract::{CallArg, Contract, Shape};
use crate::{cw_write, cw_writeln};

pub fn render_server(target: &BindingTarget<'_>) -> String {
    let trait_path = target.trait_path();
    let mut w = CodeWriter::new();
    write_preamble(
        &mut w,
        &format!("Remote handler bindings for `{trait_path}`."),
        &target.interface.unit,
        target.module_path,
    );
    if !target.contracts.is_empty() {
        w.writeln("use ::rigging::__private::serde::{Deserialize, Serialize};");
    }

    for contract in target.contracts {
        w.blank_line();
        cw_writeln!(w, "/// Path of `{trait_path}::{}`.", contract.method);
        cw_writeln!(
            w,
            "pub const {}: &str = {:?};",
            contract.path_const,
            contract.path
        );
        w.blank_line();
        cw_writeln!(w, "/// Request payload of `{trait_path}::{}`.", contract.method);
        write_shape(&mut w, &contract.request);
        w.blank_line();
        cw_writeln!(w, "/// Response payload of `{trait_path}::{}`.", contract.method);
        write_shape(&mut w, &contract.response);
    }

    for contract in target.contracts {
        w.blank_line();
        write_handler(&mut w, &trait_path, contract);
    }

    w.blank_line();
    write_register(&mut w, target, &trait_path);
    w.finish()
}

fn write_shape(w: &mut CodeWriter, shape: &Shape) {
    w.writeln("#[derive(Serialize, Deserialize)]");
    w.writeln("#[serde(crate = \"::rigging::__private::serde\")]");
    if shape.fields.is_empty() {
        cw_writeln!(w, "pub struct {} {{}}", shape.type_name);
        return;
    }
    w.block(&format!("pub struct {}", shape.type_name), |w| {
        for field in &shape.fields {
            cw_writeln!(w, "#[serde(rename = {:?})]", field.wire_name);
            cw_writeln!(w, "pub {}: {},", field.ident, field.ty.render());
        }
    });
}

fn write_handler(w: &mut CodeWriter, trait_path: &str, contract: &Contract) {
    let method = &contract.method;
    let handler = format!("handle_{}", method.trim_start_matches("r#"));
    let contexts = contract
        .call_params
        .iter()
        .filter(|arg| matches!(arg, CallArg::Context))
        .count();
    let ctx = if contexts == 0 { "_ctx" } else { "ctx" };

    w.doc(&contract.doc);
    if !contract.doc.is_empty() {
        w.writeln("///");
    }
    cw_writeln!(
        w,
        "/// Decodes a [`{}`], calls `{trait_path}::{method}` and encodes the outcome.",
        contract.request.type_name
    );
    cw_writeln!(
        w,
        "pub fn {handler}<A: {trait_path} + ?Sized>(api: &A, {ctx}: ::rigging::Context, body: &[u8]) -> ::rigging::Reply {{"
    );
    let indent = w.indent();

    if contract.request.fields.is_empty() {
        cw_writeln!(
            w,
            "if let Err(failure) = ::rigging::decode::<{}>(body) {{",
            contract.request.type_name
        );
        {
            let _indent = w.indent();
            w.writeln("return ::rigging::Reply::failure(::rigging::Status::BAD_REQUEST, &failure);");
        }
        w.writeln("}");
    } else {
        cw_writeln!(
            w,
            "let request: {} = match ::rigging::decode(body) {{",
            contract.request.type_name
        );
        {
            let _indent = w.indent();
            w.writeln("Ok(request) => request,");
            w.writeln(
                "Err(failure) => return ::rigging::Reply::failure(::rigging::Status::BAD_REQUEST, &failure),",
            );
        }
        w.writeln("};");
    }

    let args: Vec<String> = contract
        .call_params
        .iter()
        .map(|arg| match arg {
            CallArg::Context if contexts == 1 => "ctx".to_string(),
            CallArg::Context => "ctx.clone()".to_string(),
            CallArg::Field(ident) => format!("request.{ident}"),
        })
        .collect();
    let call = format!("api.{method}({})", args.join(", "));

    let temps: Vec<String> = (0..contract.call_results.len())
        .map(|i| format!("v{i}"))
        .collect();
    let response = response_literal(contract, &temps);

    match &contract.failure {
        Some(_) => {
            cw_writeln!(w, "match {call} {{");
            {
                let _indent = w.indent();
                cw_writeln!(
                    w,
                    "Ok({}) => ::rigging::Reply::encode(&{response}),",
                    contract.value_shape(&temps)
                );
                w.writeln(
                    "Err(failure) => ::rigging::Reply::failure(::rigging::Status::INTERNAL_SERVER_ERROR, &failure),",
                );
            }
            w.writeln("}");
        }
        None if temps.is_empty() => {
            cw_writeln!(w, "{call};");
            cw_writeln!(w, "::rigging::Reply::encode(&{response})");
        }
        None => {
            cw_writeln!(w, "let {} = {call};", contract.value_shape(&temps));
            cw_writeln!(w, "::rigging::Reply::encode(&{response})");
        }
    }

    drop(indent);
    w.writeln("}");
}

/// `SetResponse { id: v0 }`
fn response_literal(contract: &Contract, temps: &[String]) -> String {
    if temps.is_empty() {
        return format!("{} {{}}", contract.response.type_name);
    }
    let fields: Vec<String> = contract
        .call_results
        .iter()
        .zip(temps)
        .map(|(ident, temp)| format!("{ident}: {temp}"))
        .collect();
    format!("{} {{ {} }}", contract.response.type_name, fields.join(", "))
}

fn write_register(w: &mut CodeWriter, target: &BindingTarget<'_>, trait_path: &str) {
    cw_writeln!(w, "/// Registers a handler for every method of `{trait_path}` on `router`.");
    w.writeln("pub fn register_handlers<A>(router: &mut ::rigging::Router, api: ::std::sync::Arc<A>)");
    w.writeln("where");
    {
        let _indent = w.indent();
        cw_writeln!(w, "A: {trait_path} + Send + Sync + ?Sized + 'static,");
    }
    w.block("", |w| {
        if target.contracts.is_empty() {
            w.writeln("let _ = (router, api);");
        }
        for contract in target.contracts {
            let handler = format!("handle_{}", contract.method.trim_start_matches("r#"));
            w.block("", |w| {
                w.writeln("let api = ::std::sync::Arc::clone(&api);");
                cw_write!(w, "router.route({}, ", contract.path_const);
                cw_writeln!(w, "move |ctx, body| {handler}(&*api, ctx, body));");
            });
        }
    });

    w.blank_line();
    cw_writeln!(w, "/// A router serving `api` at every path of `{trait_path}`.");
    w.writeln("pub fn router<A>(api: ::std::sync::Arc<A>) -> ::rigging::Router");
    w.writeln("where");
    {
        let _indent = w.indent();
        cw_writeln!(w, "A: {trait_path} + Send + Sync + ?Sized + 'static,");
    }
    w.block("", |w| {
        w.writeln("let mut router = ::rigging::Router::new();");
        w.writeln("register_handlers(&mut router, api);");
        w.writeln("router");
    });
}
