//! Dependency container synthesis.
//!
//! A unit's declared dependencies become an `Injector` trait with one
//! accessor per dependency and a `Dependencies` struct that implements it.
//! Nothing here is derived from the interface.

use crate::bindings::GENERATED_HEADER;
use crate::classify::TypeReference;
use crate::code_writer::CodeWriter;
use crate::cw_writeln;
use crate::naming::snake;

/// One dependency of a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    pub accessor_name: String,
    pub storage_name: String,
    pub ty: TypeReference,
    /// Module to import so `ty` resolves, e.g. `crate::apollo::bookings`. May be empty.
    pub import_origin: String,
}

impl DependencyDeclaration {
    /// `name` is snake-cased for both the accessor and the field.
    pub fn new(name: &str, ty: &str, origin: &str) -> Self {
        let name = snake(name);
        Self {
            accessor_name: name.clone(),
            storage_name: name,
            ty: TypeReference::from_path(ty.trim()),
            import_origin: origin.trim().to_string(),
        }
    }
}

/// Render `dependencies/dependencies_gen.rs` for `unit`.
pub fn render_dependencies(unit: &str, deps: &[DependencyDeclaration]) -> String {
    let mut w = CodeWriter::new();
    w.writeln(GENERATED_HEADER);
    w.writeln("//");
    cw_writeln!(w, "// Dependency container for `{unit}`.");

    let mut origins: Vec<&str> = Vec::new();
    for dep in deps {
        let origin = dep.import_origin.as_str();
        if !origin.is_empty() && !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    if !origins.is_empty() {
        w.blank_line();
        for origin in &origins {
            cw_writeln!(w, "use {origin};");
        }
    }

    w.blank_line();
    cw_writeln!(w, "/// Accessors for everything `{unit}` depends on.");
    if deps.is_empty() {
        w.writeln("pub trait Injector {}");
    } else {
        w.block("pub trait Injector", |w| {
            for dep in deps {
                cw_writeln!(w, "fn {}(&self) -> &{};", dep.accessor_name, dep.ty);
            }
        });
    }

    w.blank_line();
    cw_writeln!(w, "/// Holds the dependencies of `{unit}`.");
    if deps.is_empty() {
        w.writeln("#[derive(Debug, Default, Clone, Copy)]");
        w.writeln("pub struct Dependencies {}");
    } else {
        w.block("pub struct Dependencies", |w| {
            for dep in deps {
                cw_writeln!(w, "{}: {},", dep.storage_name, dep.ty);
            }
        });
    }

    w.blank_line();
    w.block("impl Dependencies", |w| {
        if deps.len() > 7 {
            w.writeln("#[allow(clippy::too_many_arguments)]");
        }
        let params: Vec<String> = deps
            .iter()
            .map(|dep| format!("{}: {}", dep.storage_name, dep.ty))
            .collect();
        let fields: Vec<&str> = deps.iter().map(|dep| dep.storage_name.as_str()).collect();
        w.block(&format!("pub fn new({}) -> Self", params.join(", ")), |w| {
            if fields.is_empty() {
                w.writeln("Self {}");
            } else {
                cw_writeln!(w, "Self {{ {} }}", fields.join(", "));
            }
        });
    });

    w.blank_line();
    if deps.is_empty() {
        w.writeln("impl Injector for Dependencies {}");
    } else {
        w.block("impl Injector for Dependencies", |w| {
            for (i, dep) in deps.iter().enumerate() {
                if i > 0 {
                    w.blank_line();
                }
                w.block(
                    &format!("fn {}(&self) -> &{}", dep.accessor_name, dep.ty),
                    |w| cw_writeln!(w, "&self.{}", dep.storage_name),
                );
            }
        });
    }

    crate::bindings::write_assertion(&mut w, "Injector", "", "Dependencies");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn renders_container() {
        let deps = vec![
            DependencyDeclaration::new(
                "Bookings",
                "bookings::client::http_gen::Client<rigging::HttpTransport>",
                "crate::apollo::bookings",
            ),
            DependencyDeclaration::new("clock", "u64", ""),
            DependencyDeclaration::new(
                "bookingsLocal",
                "bookings::client::local_gen::Client<dyn bookings::Api>",
                "crate::apollo::bookings",
            ),
        ];
        assert_snapshot!(render_dependencies("users", &deps));
    }

    #[test]
    fn empty_container_still_renders() {
        let out = render_dependencies("users", &[]);
        assert!(out.contains("pub trait Injector {}"));
        assert!(out.contains("pub struct Dependencies {}"));
        assert!(out.contains("pub fn new() -> Self {\n        Self {}\n    }"));
        assert!(out.contains("impl Injector for Dependencies {}"));
        assert!(!out.contains("\nuse "));
    }
}
