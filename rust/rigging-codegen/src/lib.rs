#![deny(unsafe_code)]

//! Turns a Rust trait declaration into service bindings.
//!
//! # The Pipeline
//!
//! ```text
//! api.rs ──► extract ──► MethodSignature ──► synthesize ──► Contract ──► render ──► *_gen.rs
//!            (classify every type)            (one per method)           (server, clients)
//! ```
//!
//! - [`extract`](extract::extract) finds the interface trait with the
//!   `rigging-parse` grammar and classifies every parameter and result type
//!   ([`classify`]).
//! - [`synthesize`](contract::synthesize) derives a request and a response
//!   shape per method, leaving out the `rigging::Context` parameters and the
//!   `Failure` error type.
//! - The [`bindings`] renderers turn the contracts into a remote handler, a
//!   remote client and a local delegating client, each with a compile-time
//!   check that it still implements the trait.
//! - [`dependencies`] renders a unit's dependency container.
//!
//! [`generate_unit`] runs the whole pipeline for one unit. A method that
//! cannot be bound is reported in [`UnitOutput::failures`] and gets no
//! handler; the rest of the unit still generates. Both clients still
//! implement it from its [`Declaration`]: the local client forwards it, the
//! remote client answers with a failure or a panic.
//!
//! # Usage: In Your build.rs
//!
//! ```ignore
//! let spec = rigging_codegen::UnitSpec {
//!     name: "users".into(),
//!     module_path: "crate::users".into(),
//!     interface: None,
//!     source: std::fs::read_to_string("interfaces/users.rs")?,
//!     implementations: Default::default(),
//!     dependencies: Vec::new(),
//! };
//! let output = rigging_codegen::generate_unit(&spec)?;
//! for artifact in &output.artifacts {
//!     // write artifact.contents to OUT_DIR/users/{artifact.path}
//! }
//! ```

pub mod bindings;
pub mod classify;
pub mod code_writer;
pub mod contract;
pub mod dependencies;
pub mod error;
pub mod extract;
pub mod naming;
pub mod unit;

pub use bindings::GENERATED_HEADER;
pub use classify::{Classified, TypeReference};
pub use contract::Contract;
pub use dependencies::DependencyDeclaration;
pub use error::{MethodError, UnitError};
pub use extract::{Declaration, DeclaredParam, Interface, MethodSignature, Variable};
pub use naming::export_name;
pub use unit::{Artifact, Implementations, UnitOutput, UnitSpec, generate_unit};
