//! Build script that runs rigging-codegen over `interfaces/users.rs`.

use std::env;
use std::fs;
use std::path::Path;

use rigging_codegen::{DependencyDeclaration, Implementations, UnitSpec};

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=interfaces/users.rs");

    let spec = UnitSpec {
        name: "users".into(),
        module_path: "crate::users".into(),
        interface: None,
        source: fs::read_to_string("interfaces/users.rs").unwrap(),
        implementations: Implementations::default(),
        dependencies: vec![DependencyDeclaration::new(
            "Audit",
            "audit::Log",
            "crate::audit",
        )],
    };
    let output = rigging_codegen::generate_unit(&spec).unwrap();
    for failure in &output.failures {
        println!("cargo::warning={failure}");
    }

    let out_dir = env::var("OUT_DIR").unwrap();
    let unit_dir = Path::new(&out_dir).join("users");
    for artifact in &output.artifacts {
        let dest = unit_dir.join(artifact.path);
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, &artifact.contents).unwrap();
    }
}
