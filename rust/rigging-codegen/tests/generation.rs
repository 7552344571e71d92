//! End-to-end generation over whole interface files.

use insta::assert_snapshot;
use rigging_codegen::unit::{
    DEPENDENCIES_ARTIFACT, HTTP_CLIENT_ARTIFACT, LOCAL_CLIENT_ARTIFACT, SERVER_ARTIFACT,
};
use rigging_codegen::{
    DependencyDeclaration, GENERATED_HEADER, Implementations, MethodError, UnitError, UnitOutput,
    UnitSpec, generate_unit,
};

const SET_ONLY: &str = r#"
use rigging::Failure;

pub trait Api {
    /// @results id
    fn set(&self, ctx: rigging::Context, name: String) -> Result<i64, Failure>;
}
"#;

fn spec(source: &str) -> UnitSpec {
    UnitSpec {
        name: "users".into(),
        module_path: "crate::users".into(),
        interface: None,
        source: source.into(),
        implementations: Implementations::default(),
        dependencies: Vec::new(),
    }
}

fn generate(source: &str) -> UnitOutput {
    generate_unit(&spec(source)).expect("unit generates")
}

fn contents<'a>(output: &'a UnitOutput, path: &str) -> &'a str {
    &output
        .artifact(path)
        .unwrap_or_else(|| panic!("missing {path}"))
        .contents
}

#[test]
fn server_for_set() {
    let output = generate(SET_ONLY);
    assert_snapshot!(contents(&output, SERVER_ARTIFACT));
}

#[test]
fn remote_client_for_set() {
    let output = generate(SET_ONLY);
    assert_snapshot!(contents(&output, HTTP_CLIENT_ARTIFACT));
}

#[test]
fn local_client_for_set() {
    let output = generate(SET_ONLY);
    assert_snapshot!(contents(&output, LOCAL_CLIENT_ARTIFACT));
}

/// One bound method and every reason a method can have no contract.
const UNBOUND: &str = r#"
use rigging::Failure;

pub struct User {
    pub name: String,
}

pub trait Api {
    fn count(&self) -> u64;

    fn find(&self, prefix: &str) -> Option<User> {
        None
    }

    async fn search<'a>(&'a self, filter: Vec<String>, _: &'a str) -> u8;

    fn export(&self, ctx: rigging::Context, ids: &[i64]) -> Result<Vec<User>, Failure>;

    fn reset(&mut self);
}
"#;

#[test]
fn remote_client_without_handlers() {
    let output = generate(UNBOUND);
    assert_eq!(output.generated, vec!["count"]);
    let failed: Vec<&str> = output.failures.iter().map(MethodError::method).collect();
    assert_eq!(failed, vec!["find", "search", "export", "reset"]);
    assert_snapshot!(contents(&output, HTTP_CLIENT_ARTIFACT));
}

#[test]
fn local_client_without_handlers() {
    let output = generate(UNBOUND);
    assert_snapshot!(contents(&output, LOCAL_CLIENT_ARTIFACT));
}

#[test]
fn bound_methods_never_pull_in_the_unit_scope() {
    let output = generate(SET_ONLY);
    for path in [HTTP_CLIENT_ARTIFACT, LOCAL_CLIENT_ARTIFACT] {
        assert!(!contents(&output, path).contains("::*;"), "{path}");
    }
}

#[test]
fn parameters_never_collide_with_generated_locals() {
    let output = generate(
        r#"
        pub trait Api {
            fn send(&self, request: rigging::Context, response: String) -> Result<u8, Failure>;
        }
        "#,
    );
    let client = contents(&output, HTTP_CLIENT_ARTIFACT);
    assert!(client.contains(
        "let response: wire::SendResponse = ::rigging::call(&self.transport, &request, wire::SEND_PATH, &wire::SendRequest { response })?;"
    ));
    assert!(client.contains("        Ok(response.u8)\n"));
}

#[test]
fn bad_methods_are_skipped_not_fatal() {
    let output = generate(
        r#"
        pub trait Api {
            fn get(&self, id: u64) -> Result<User, Failure>;
            fn search(&self, terms: Vec<String>) -> Result<u32, Failure>;
            fn put(&self, user: User) -> Result<(), Failure>;
            fn borrow(&self, name: &str) -> bool;
            fn count(&self) -> usize;
        }
        "#,
    );

    assert_eq!(output.generated, vec!["get", "put", "count"]);
    let failed: Vec<&str> = output.failures.iter().map(MethodError::method).collect();
    assert_eq!(failed, vec!["search", "borrow"]);
    assert!(output
        .failures
        .iter()
        .all(|err| matches!(err, MethodError::UnsupportedType { .. })));

    let server = contents(&output, SERVER_ARTIFACT);
    assert!(server.contains("pub fn handle_get<"));
    assert!(server.contains("pub fn handle_put<"));
    assert!(server.contains("pub fn handle_count<"));
    assert!(!server.contains("handle_search"));
    assert!(!server.contains("handle_borrow"));

    // The clients still implement them, so the trait stays satisfied.
    let client = contents(&output, HTTP_CLIENT_ARTIFACT);
    assert!(client.contains("    fn search(&self, _: Vec<String>) -> Result<u32, Failure> {\n"));
    assert!(client.contains("    fn borrow(&self, _: &str) -> bool {\n"));
    let local = contents(&output, LOCAL_CLIENT_ARTIFACT);
    assert!(local.contains("        users::Api::search(&*self.api, terms)\n"));
    assert!(local.contains("        users::Api::borrow(&*self.api, name)\n"));
}

#[test]
fn infallible_methods_panic_in_the_remote_client() {
    let output = generate(
        r#"
        pub trait Api {
            fn count(&self) -> usize;
            fn ping(&self);
        }
        "#,
    );
    let client = contents(&output, HTTP_CLIENT_ARTIFACT);
    assert!(client.contains(
        "let response: wire::CountResponse = match ::rigging::call(&self.transport, &::rigging::Context::background(), wire::COUNT_PATH, &wire::CountRequest {}) {"
    ));
    assert!(client.contains(
        "Err(failure) => panic!(\"`users::Api::count` cannot report a failure, but its call failed: {failure}\"),"
    ));
    assert!(client.contains("        response.usi\n"));
    assert!(client.contains("let _: wire::PingResponse = match"));

    let server = contents(&output, SERVER_ARTIFACT);
    assert!(server.contains("    let v0 = api.count();\n    ::rigging::Reply::encode(&CountResponse { usi: v0 })\n"));
    assert!(server.contains("    api.ping();\n    ::rigging::Reply::encode(&PingResponse {})\n"));
    assert!(server.contains(
        "    if let Err(failure) = ::rigging::decode::<PingRequest>(body) {\n"
    ));
    assert!(server.contains("pub fn handle_ping<A: users::Api + ?Sized>(api: &A, _ctx: ::rigging::Context"));
}

#[test]
fn tuples_are_rebuilt_in_order() {
    let output = generate(
        r#"
        pub trait Api {
            /// Page through users.
            /// @results users, next
            fn page(&self, ctx: rigging::Context, cursor: String) -> Result<(Users, String, bool), Failure>;
            fn single(&self) -> (u8,);
        }
        "#,
    );
    let server = contents(&output, SERVER_ARTIFACT);
    assert!(server.contains(
        "Ok((v0, v1, v2)) => ::rigging::Reply::encode(&PageResponse { users: v0, next: v1, boo: v2 }),"
    ));
    assert!(server.contains("/// Page through users.\n///\n/// Decodes a [`PageRequest`]"));
    assert!(server.contains("let (v0,) = api.single();"));

    let client = contents(&output, HTTP_CLIENT_ARTIFACT);
    assert!(client.contains("Ok((response.users, response.next, response.boo))"));
    assert!(client.contains("(response.u8,)"));
    assert!(client.contains(
        "fn page(&self, ctx: ::rigging::Context, cursor: String) -> ::std::result::Result<(users::Users, String, bool), ::rigging::Failure> {"
    ));
}

#[test]
fn zero_methods_generate_empty_bindings() {
    let output = generate("pub trait Api {}");
    assert!(output.generated.is_empty());
    assert!(output.failures.is_empty());
    assert_eq!(output.artifacts.len(), 4);

    let server = contents(&output, SERVER_ARTIFACT);
    assert!(!server.contains("serde"));
    assert!(server.contains("    let _ = (router, api);\n"));
    let client = contents(&output, HTTP_CLIENT_ARTIFACT);
    assert!(client.contains("impl<T: ::rigging::Transport> users::Api for Client<T> {\n}\n"));
    assert!(!client.contains("as wire"));
}

#[test]
fn every_artifact_is_includable() {
    let mut spec = spec(SET_ONLY);
    spec.dependencies = vec![DependencyDeclaration::new(
        "bookings",
        "bookings::client::http_gen::Client<rigging::HttpTransport>",
        "crate::bookings",
    )];
    let output = generate_unit(&spec).unwrap();
    let paths: Vec<&str> = output.artifacts.iter().map(|a| a.path).collect();
    assert_eq!(
        paths,
        vec![
            DEPENDENCIES_ARTIFACT,
            SERVER_ARTIFACT,
            HTTP_CLIENT_ARTIFACT,
            LOCAL_CLIENT_ARTIFACT
        ]
    );
    for artifact in &output.artifacts {
        assert!(
            artifact.contents.starts_with(GENERATED_HEADER),
            "{}",
            artifact.path
        );
        assert!(!artifact.contents.contains("#!["), "{}", artifact.path);
        assert!(artifact.contents.ends_with('\n'), "{}", artifact.path);
    }
}

#[test]
fn implementations_gate_artifacts() {
    let mut spec = spec(SET_ONLY);
    spec.implementations = Implementations {
        local: true,
        http: false,
    };
    let output = generate_unit(&spec).unwrap();
    let paths: Vec<&str> = output.artifacts.iter().map(|a| a.path).collect();
    assert_eq!(paths, vec![DEPENDENCIES_ARTIFACT, LOCAL_CLIENT_ARTIFACT]);
}

#[test]
fn generation_is_deterministic() {
    let source = r#"
        pub trait Api: Send + Sync + 'static {
            fn a(&self, x: u8) -> Result<(u8, u8), Failure>;
            fn b(&self, ctx: rigging::Context) -> String;
            fn c(&self, bad: Option<u8>);
        }
    "#;
    let first = generate(source);
    let second = generate(source);
    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first.failures, second.failures);

    let client = contents(&first, HTTP_CLIENT_ARTIFACT);
    assert!(client.contains("impl<T: ::rigging::Transport + 'static> users::Api for Client<T>"));
}

#[test]
fn colliding_method_names_are_rejected() {
    let output = generate(
        r#"
        pub trait Api {
            fn get_user(&self) -> u8;
            fn getUser(&self) -> u8;
        }
        "#,
    );
    assert_eq!(output.generated, vec!["get_user"]);
    assert!(matches!(
        &output.failures[..],
        [MethodError::UnsupportedSignature { method, .. }] if method == "getUser"
    ));
}

#[test]
fn unit_errors_abort_the_unit() {
    assert!(matches!(
        generate_unit(&spec("pub struct Nothing;")),
        Err(UnitError::NoInterfaceFound { wanted: None })
    ));
    assert!(matches!(
        generate_unit(&spec("pub trait Api {")),
        Err(UnitError::ParseFailure(_))
    ));

    let mut named = spec(SET_ONLY);
    named.interface = Some("Missing".into());
    assert!(matches!(
        generate_unit(&named),
        Err(UnitError::NoInterfaceFound { wanted: Some(_) })
    ));
}
