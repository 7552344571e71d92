//! Parser snapshot tests using datatest-stable and insta.
//!
//! Each `.rs` file in `tests/fixtures/` is parsed and an outline of what the
//! grammar found is snapshot-tested.

use rigging_parse::{InterfaceFile, InterfaceMethod, InterfaceTrait, Item, parse_file, spelling};
use std::fmt::Write;
use std::path::Path;

/// One line per exported trait and method, spelled the way codegen sees them.
fn outline(file: &InterfaceFile) -> String {
    let mut out = String::new();
    for item in file.items() {
        match item {
            Item::Interface(t) => outline_trait(&mut out, t),
            Item::Malformed(name) => writeln!(out, "malformed trait {name}").unwrap(),
        }
    }
    if out.is_empty() {
        out.push_str("no exported traits\n");
    }
    out
}

fn outline_trait(out: &mut String, t: &InterfaceTrait) {
    for line in t.doc_lines() {
        writeln!(out, "///{line}").unwrap();
    }
    let supertraits = t.supertraits();
    if supertraits.is_empty() {
        writeln!(out, "trait {}", t.name()).unwrap();
    } else {
        writeln!(out, "trait {}: {}", t.name(), supertraits.join(" + ")).unwrap();
    }
    for method in t.methods() {
        outline_method(out, method);
    }
    if t.skipped_entries() > 0 {
        writeln!(out, "    skipped entries: {}", t.skipped_entries()).unwrap();
    }
}

fn outline_method(out: &mut String, method: &InterfaceMethod) {
    for line in method.doc_lines() {
        writeln!(out, "    ///{line}").unwrap();
    }
    let mut inputs: Vec<String> = method.receiver_spelling().into_iter().collect();
    inputs.extend(
        method
            .args()
            .map(|arg| format!("{}: {}", arg.pattern_spelling(), spelling(&arg.ty_tokens()))),
    );
    let mut line = format!(
        "    {}fn {}{}({})",
        if method.is_async() { "async " } else { "" },
        method.name(),
        method.generics_spelling(),
        inputs.join(", ")
    );
    if let Some(output) = method.return_tokens() {
        write!(line, " -> {}", spelling(&output)).unwrap();
    }
    if method.has_where_clause() {
        write!(line, " {}", method.where_spelling()).unwrap();
    }
    line.push_str(if method.has_default_body() { " { .. }" } else { ";" });
    writeln!(out, "{line}").unwrap();
}

fn test_parse_fixture(path: &Path) -> datatest_stable::Result<()> {
    let content = std::fs::read_to_string(path)?;
    // Normalize CRLF to LF for consistent byte spans across platforms
    let content = content.replace("\r\n", "\n");

    let file = parse_file(&content)
        .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;

    // Use the file stem as the snapshot name
    let name = path.file_stem().unwrap().to_str().unwrap();

    insta::with_settings!({
        description => &content,
        omit_expression => true,
    }, {
        insta::assert_snapshot!(name, outline(&file));
    });

    Ok(())
}

datatest_stable::harness! {
    { test = test_parse_fixture, root = "tests/fixtures", pattern = r"\.rs$" },
}
