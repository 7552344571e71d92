//! `rigging.yaml`: which units a service has and what each one needs.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use rigging_codegen::naming::{is_ident, is_keyword, snake};
use rigging_codegen::{DependencyDeclaration, Implementations};
use serde::Deserialize;

use crate::error::{ConfigSource, Error};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rust path of the module that contains the service module.
    #[serde(default = "default_module")]
    pub module: String,
    pub service: Service,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub logicals: Vec<Logical>,
}

/// One logical unit: an interface plus the bindings generated for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Logical {
    pub name: String,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Api {
    /// Interface file, relative to the unit directory.
    #[serde(default = "default_api_file")]
    pub file: String,
    /// Trait to bind; the first `pub trait` when absent.
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub implementations: ImplementationsConfig,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            file: default_api_file(),
            interface: None,
            implementations: ImplementationsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImplementationsConfig {
    #[serde(default = "yes")]
    pub local: bool,
    #[serde(default = "yes")]
    pub http: bool,
}

impl Default for ImplementationsConfig {
    fn default() -> Self {
        Self {
            local: true,
            http: true,
        }
    }
}

impl From<ImplementationsConfig> for Implementations {
    fn from(config: ImplementationsConfig) -> Self {
        Implementations {
            local: config.local,
            http: config.http,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Module imported so `type` resolves.
    #[serde(default)]
    pub origin: String,
}

fn default_module() -> String {
    "crate".to_string()
}

fn default_api_file() -> String {
    "api.rs".to_string()
}

fn yes() -> bool {
    true
}

impl Config {
    /// Read, parse and validate `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            source: ConfigSource::Io(err),
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            source: ConfigSource::Yaml(err),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: String| Err(Error::InvalidConfig(reason));

        if self.module.is_empty() || !self.module.split("::").all(is_module_segment) {
            return invalid(format!("`module` is not a Rust path: `{}`", self.module));
        }
        if !is_plain_ident(&self.service.name) {
            return invalid(format!(
                "service name `{}` is not a Rust identifier",
                self.service.name
            ));
        }

        let mut units = HashSet::new();
        for logical in &self.service.logicals {
            let unit = logical.name.as_str();
            if !is_plain_ident(unit) {
                return invalid(format!("unit name `{unit}` is not a Rust identifier"));
            }
            if !units.insert(unit) {
                return invalid(format!("unit `{unit}` is declared twice"));
            }
            if !is_relative_rust_file(&logical.api.file) {
                return invalid(format!(
                    "unit `{unit}`: api file `{}` must be a relative `.rs` path inside the unit",
                    logical.api.file
                ));
            }
            if let Some(interface) = &logical.api.interface {
                if !is_plain_ident(interface) {
                    return invalid(format!(
                        "unit `{unit}`: interface `{interface}` is not a Rust identifier"
                    ));
                }
            }

            let mut accessors = HashSet::new();
            for dep in &logical.dependencies {
                let accessor = snake(&dep.name);
                if !is_plain_ident(&accessor) {
                    return invalid(format!(
                        "unit `{unit}`: dependency name `{}` is not a Rust identifier",
                        dep.name
                    ));
                }
                if dep.ty.trim().is_empty() {
                    return invalid(format!(
                        "unit `{unit}`: dependency `{}` has no type",
                        dep.name
                    ));
                }
                if !accessors.insert(accessor) {
                    return invalid(format!(
                        "unit `{unit}`: dependency `{}` is declared twice",
                        dep.name
                    ));
                }
            }
        }
        Ok(())
    }

    /// `crate::apollo`
    pub fn service_module(&self) -> String {
        format!("{}::{}", self.module, self.service.name)
    }

    /// `<output>/apollo`
    pub fn service_dir(&self, output: &Path) -> PathBuf {
        output.join(&self.service.name)
    }
}

impl Logical {
    pub fn unit_dir(&self, config: &Config, output: &Path) -> PathBuf {
        config.service_dir(output).join(&self.name)
    }

    pub fn module_path(&self, config: &Config) -> String {
        format!("{}::{}", config.service_module(), self.name)
    }

    pub fn interface_name(&self) -> &str {
        self.api.interface.as_deref().unwrap_or("Api")
    }

    pub fn dependency_declarations(&self) -> Vec<DependencyDeclaration> {
        self.dependencies
            .iter()
            .map(|dep| DependencyDeclaration::new(&dep.name, &dep.ty, &dep.origin))
            .collect()
    }
}

fn is_plain_ident(name: &str) -> bool {
    is_ident(name) && !is_keyword(name) && !name.starts_with("r#")
}

fn is_module_segment(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super") || is_plain_ident(segment)
}

fn is_relative_rust_file(file: &str) -> bool {
    let path = Path::new(file);
    file.ends_with(".rs")
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
