//! Create-if-absent scaffolding for a service and its units.
//!
//! Scaffolded files belong to the developer once they exist: they are never
//! rewritten, only created when missing.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rigging_codegen::code_writer::CodeWriter;
use rigging_codegen::cw_writeln;
use rigging_codegen::unit::{HTTP_CLIENT_ARTIFACT, LOCAL_CLIENT_ARTIFACT, SERVER_ARTIFACT};

use crate::config::{Config, Logical};
use crate::error::Error;

/// Create every missing scaffold file under `output`; returns the ones created.
pub fn scaffold(config: &Config, output: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut created = Vec::new();
    let service_dir = config.service_dir(output);

    let units: Vec<&str> = config
        .service
        .logicals
        .iter()
        .map(|logical| logical.name.as_str())
        .collect();
    create_if_absent(
        &service_dir.join("mod.rs"),
        &service_mod(&config.service.name, &units),
        &mut created,
    )?;

    for logical in &config.service.logicals {
        scaffold_unit(config, logical, output, &mut created)?;
    }

    tracing::info!(
        service = %config.service.name,
        created = created.len(),
        "scaffolded service"
    );
    Ok(created)
}

fn scaffold_unit(
    config: &Config,
    logical: &Logical,
    output: &Path,
    created: &mut Vec<PathBuf>,
) -> Result<(), Error> {
    let dir = logical.unit_dir(config, output);
    let http = logical.api.implementations.http;
    let local = logical.api.implementations.local;

    create_if_absent(&dir.join("mod.rs"), &unit_mod(logical), created)?;
    let fresh_api = create_if_absent(&dir.join(&logical.api.file), &api(logical), created)?;
    create_if_absent(
        &dir.join("server").join("mod.rs"),
        &server_mod(logical, fresh_api),
        created,
    )?;
    create_if_absent(
        &dir.join("client").join("mod.rs"),
        &client_mod(&logical.name, http, local),
        created,
    )?;
    create_if_absent(
        &dir.join("dependencies").join("mod.rs"),
        &dependencies_mod(&logical.name),
        created,
    )?;
    Ok(())
}

/// Write `contents` to `path` unless it exists. Returns whether it was created.
fn create_if_absent(path: &Path, contents: &str, created: &mut Vec<PathBuf>) -> Result<bool, Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "keeping existing file");
            return Ok(false);
        }
        Err(err) => return Err(Error::io(path, err)),
    };
    file.write_all(contents.as_bytes())
        .map_err(|err| Error::io(path, err))?;
    tracing::debug!(path = %path.display(), "created");
    created.push(path.to_path_buf());
    Ok(true)
}

fn service_mod(service: &str, units: &[&str]) -> String {
    let mut w = CodeWriter::new();
    cw_writeln!(w, "//! The `{service}` service.");
    if !units.is_empty() {
        w.blank_line();
    }
    for unit in units {
        cw_writeln!(w, "pub mod {unit};");
    }
    w.finish()
}

fn unit_mod(logical: &Logical) -> String {
    let mut w = CodeWriter::new();
    cw_writeln!(w, "//! The `{}` unit.", logical.name);
    w.blank_line();
    if logical.api.file != "api.rs" {
        cw_writeln!(w, "#[path = {:?}]", logical.api.file);
    }
    w.writeln("pub mod api;");
    w.writeln("pub mod client;");
    w.writeln("pub mod dependencies;");
    w.writeln("pub mod server;");
    w.blank_line();
    w.writeln("pub use self::api::*;");
    w.finish()
}

fn api(logical: &Logical) -> String {
    let mut w = CodeWriter::new();
    cw_writeln!(w, "//! Interface of the `{}` unit.", logical.name);
    w.blank_line();
    w.writeln("use rigging::Failure;");
    w.blank_line();
    cw_writeln!(w, "/// Everything the `{}` unit offers.", logical.name);
    w.block(&format!("pub trait {}: Send + Sync", logical.interface_name()), |w| {
        w.writeln("/// Answers as long as the unit is reachable.");
        w.writeln("fn ping(&self, ctx: rigging::Context) -> Result<(), Failure>;");
    });
    w.finish()
}

/// The `Server` skeleton. The trait impl and `run`, which needs it, are only
/// written next to a freshly scaffolded interface, whose methods are known.
fn server_mod(logical: &Logical, fresh_api: bool) -> String {
    let mut w = CodeWriter::new();
    cw_writeln!(w, "//! Implementation of the `{}` unit.", logical.name);
    w.blank_line();
    if logical.api.implementations.http {
        cw_writeln!(w, "pub mod {};", artifact_module(SERVER_ARTIFACT));
        w.blank_line();
    }
    w.writeln("use super::dependencies::Dependencies;");
    w.blank_line();
    w.block("pub struct Server", |w| {
        w.writeln("deps: Dependencies,");
    });
    w.blank_line();
    w.block("impl Server", |w| {
        w.block("pub fn new(deps: Dependencies) -> Self", |w| {
            w.writeln("Self { deps }");
        });
        w.blank_line();
        w.block("pub fn dependencies(&self) -> &Dependencies", |w| {
            w.writeln("&self.deps");
        });
    });
    if fresh_api {
        w.blank_line();
        w.block(
            &format!("impl super::{} for Server", logical.interface_name()),
            |w| {
                w.block(
                    "fn ping(&self, ctx: rigging::Context) -> Result<(), rigging::Failure>",
                    |w| {
                        w.writeln("ctx.check()");
                    },
                );
            },
        );
    }
    if fresh_api && logical.api.implementations.http {
        w.blank_line();
        w.writeln("/// Builds the server from its dependencies and serves it on `router`.");
        w.block(
            "pub fn run(deps: Dependencies, router: &mut rigging::Router)",
            |w| {
                cw_writeln!(
                    w,
                    "{}::register_handlers(router, std::sync::Arc::new(Server::new(deps)));",
                    artifact_module(SERVER_ARTIFACT)
                );
            },
        );
    }
    w.finish()
}

fn client_mod(unit: &str, http: bool, local: bool) -> String {
    let mut w = CodeWriter::new();
    cw_writeln!(w, "//! Clients of the `{unit}` unit.");
    if http || local {
        w.blank_line();
    }
    if http {
        cw_writeln!(w, "pub mod {};", artifact_module(HTTP_CLIENT_ARTIFACT));
    }
    if local {
        cw_writeln!(w, "pub mod {};", artifact_module(LOCAL_CLIENT_ARTIFACT));
    }
    w.finish()
}

fn dependencies_mod(unit: &str) -> String {
    let mut w = CodeWriter::new();
    cw_writeln!(w, "//! What the `{unit}` unit depends on.");
    w.blank_line();
    w.writeln("mod dependencies_gen;");
    w.blank_line();
    w.writeln("pub use self::dependencies_gen::{Dependencies, Injector};");
    w.finish()
}

/// `server/http_gen.rs` → `http_gen`
fn artifact_module(artifact: &str) -> &str {
    let file = artifact.rsplit('/').next().unwrap_or(artifact);
    file.strip_suffix(".rs").unwrap_or(file)
}
