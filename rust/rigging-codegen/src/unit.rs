//! Per-unit orchestration: interface text in, rendered artifacts out.

use crate::bindings::{BindingTarget, render_http_client, render_local_client, render_server};
use crate::contract::{Contract, synthesize};
use crate::dependencies::{DependencyDeclaration, render_dependencies};
use crate::error::{MethodError, UnitError};
use crate::extract::{Interface, extract};

pub const SERVER_ARTIFACT: &str = "server/http_gen.rs";
pub const HTTP_CLIENT_ARTIFACT: &str = "client/http_gen.rs";
pub const LOCAL_CLIENT_ARTIFACT: &str = "client/local_gen.rs";
pub const DEPENDENCIES_ARTIFACT: &str = "dependencies/dependencies_gen.rs";

/// Which bindings a unit wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Implementations {
    /// `client/local_gen.rs`
    pub local: bool,
    /// `server/http_gen.rs` and `client/http_gen.rs`
    pub http: bool,
}

impl Default for Implementations {
    fn default() -> Self {
        Self {
            local: true,
            http: true,
        }
    }
}

/// Everything needed to generate one logical unit.
#[derive(Debug, Clone)]
pub struct UnitSpec {
    /// Unit name; also the module name the generated code imports.
    pub name: String,
    /// Rust path of the unit module, e.g. `crate::apollo::users`.
    pub module_path: String,
    /// Trait to bind; `None` picks the first `pub trait`.
    pub interface: Option<String>,
    /// Text of the interface file.
    pub source: String,
    pub implementations: Implementations,
    pub dependencies: Vec<DependencyDeclaration>,
}

/// One generated file, relative to the unit directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: &'static str,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct UnitOutput {
    pub unit: String,
    pub interface: String,
    pub artifacts: Vec<Artifact>,
    /// Methods that received bindings, in declaration order.
    pub generated: Vec<String>,
    /// Methods that did not, with the reason. The clients still implement
    /// them from their declared headers.
    pub failures: Vec<MethodError>,
}

impl UnitOutput {
    pub fn artifact(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.path == path)
    }
}

/// Synthesize every method of `interface`. A method that fails is reported
/// and gets no contract; the others are unaffected.
pub fn synthesize_all(interface: &Interface) -> (Vec<Contract>, Vec<MethodError>) {
    let mut contracts: Vec<Contract> = Vec::with_capacity(interface.methods.len());
    let mut failures = Vec::new();

    for sig in &interface.methods {
        let outcome = synthesize(sig, &interface.unit).and_then(|contract| {
            match contracts
                .iter()
                .find(|other| other.request.type_name == contract.request.type_name)
            {
                Some(other) => Err(MethodError::UnsupportedSignature {
                    method: contract.method.clone(),
                    reason: format!(
                        "generated names collide with those of method `{}`",
                        other.method
                    ),
                }),
                None => Ok(contract),
            }
        });
        match outcome {
            Ok(contract) => {
                tracing::debug!(
                    unit = %interface.unit,
                    method = %contract.method,
                    path = %contract.path,
                    "synthesized contract"
                );
                contracts.push(contract);
            }
            Err(err) => {
                tracing::warn!(unit = %interface.unit, "no binding for method: {err}");
                failures.push(err);
            }
        }
    }

    (contracts, failures)
}

/// Generate every artifact of one unit.
///
/// The dependency container is rendered first and does not depend on the
/// interface. Unit-level errors abort the unit; method-level errors are
/// collected in [`UnitOutput::failures`].
pub fn generate_unit(spec: &UnitSpec) -> Result<UnitOutput, UnitError> {
    let dependencies = Artifact {
        path: DEPENDENCIES_ARTIFACT,
        contents: render_dependencies(&spec.name, &spec.dependencies),
    };

    let interface = extract(&spec.source, &spec.name, spec.interface.as_deref())?;
    let (contracts, failures) = synthesize_all(&interface);
    let target = BindingTarget {
        interface: &interface,
        module_path: &spec.module_path,
        contracts: &contracts,
    };

    let mut artifacts = vec![dependencies];
    if spec.implementations.http {
        artifacts.push(Artifact {
            path: SERVER_ARTIFACT,
            contents: render_server(&target),
        });
        artifacts.push(Artifact {
            path: HTTP_CLIENT_ARTIFACT,
            contents: render_http_client(&target),
        });
    }
    if spec.implementations.local {
        artifacts.push(Artifact {
            path: LOCAL_CLIENT_ARTIFACT,
            contents: render_local_client(&target),
        });
    }

    tracing::info!(
        unit = %spec.name,
        interface = %interface.name,
        generated = contracts.len(),
        failed = failures.len(),
        "generated unit"
    );

    Ok(UnitOutput {
        unit: spec.name.clone(),
        interface: interface.name,
        artifacts,
        generated: contracts.into_iter().map(|c| c.method).collect(),
        failures,
    })
}
