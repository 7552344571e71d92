//! The generation pass: every unit in parallel, then every write in order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rigging_codegen::unit::{HTTP_CLIENT_ARTIFACT, LOCAL_CLIENT_ARTIFACT, SERVER_ARTIFACT};
use rigging_codegen::{GENERATED_HEADER, MethodError, UnitOutput, UnitSpec, generate_unit};

use crate::config::{Config, Logical};
use crate::error::Error;

/// Artifacts a unit stops producing when one of its implementations is off.
const OPTIONAL_ARTIFACTS: [&str; 3] = [SERVER_ARTIFACT, HTTP_CLIENT_ARTIFACT, LOCAL_CLIENT_ARTIFACT];

/// What happened to one unit.
#[derive(Debug)]
pub struct UnitReport {
    pub unit: String,
    pub outcome: Result<UnitOutput, Error>,
    /// Files whose contents changed.
    pub written: Vec<PathBuf>,
    /// Files already up to date.
    pub unchanged: Vec<PathBuf>,
    /// Generated files the unit no longer produces.
    pub removed: Vec<PathBuf>,
}

impl UnitReport {
    pub fn method_failures(&self) -> &[MethodError] {
        match &self.outcome {
            Ok(output) => &output.failures,
            Err(_) => &[],
        }
    }
}

#[derive(Debug, Default)]
pub struct Report {
    /// In configuration order.
    pub units: Vec<UnitReport>,
}

impl Report {
    /// Nothing was skipped: every unit generated and every method bound.
    pub fn is_clean(&self) -> bool {
        self.units
            .iter()
            .all(|unit| unit.outcome.is_ok() && unit.method_failures().is_empty())
    }

    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.units
            .iter()
            .flat_map(|unit| unit.written.iter().map(PathBuf::as_path))
    }
}

/// Generate every unit of `config` under `output`.
///
/// Unit and method failures land in the report; only a failed write aborts.
pub fn generate(config: &Config, output: &Path) -> Result<Report, Error> {
    let outcomes: Vec<Result<UnitOutput, Error>> = config
        .service
        .logicals
        .par_iter()
        .map(|logical| generate_logical(config, logical, output))
        .collect();

    let mut report = Report::default();
    for (logical, outcome) in config.service.logicals.iter().zip(outcomes) {
        let mut unit = UnitReport {
            unit: logical.name.clone(),
            outcome,
            written: Vec::new(),
            unchanged: Vec::new(),
            removed: Vec::new(),
        };
        match &unit.outcome {
            Ok(output_files) => {
                let dir = logical.unit_dir(config, output);
                for artifact in &output_files.artifacts {
                    let path = dir.join(artifact.path);
                    if write_if_changed(&path, &artifact.contents)? {
                        unit.written.push(path);
                    } else {
                        unit.unchanged.push(path);
                    }
                }
                remove_stale(&dir, output_files, &mut unit.removed)?;
                for failure in &output_files.failures {
                    tracing::warn!(unit = %logical.name, "{failure}");
                }
                tracing::info!(
                    unit = %logical.name,
                    written = unit.written.len(),
                    unchanged = unit.unchanged.len(),
                    removed = unit.removed.len(),
                    "wrote unit"
                );
            }
            Err(err) => tracing::error!(unit = %logical.name, "{err}"),
        }
        report.units.push(unit);
    }
    Ok(report)
}

fn generate_logical(config: &Config, logical: &Logical, output: &Path) -> Result<UnitOutput, Error> {
    let path = logical.unit_dir(config, output).join(&logical.api.file);
    let source = std::fs::read_to_string(&path).map_err(|source| Error::ReadInterface {
        unit: logical.name.clone(),
        path: path.clone(),
        source,
    })?;

    let spec = UnitSpec {
        name: logical.name.clone(),
        module_path: logical.module_path(config),
        interface: logical.api.interface.clone(),
        source,
        implementations: logical.api.implementations.into(),
        dependencies: logical.dependency_declarations(),
    };
    generate_unit(&spec).map_err(|source| Error::Unit {
        unit: logical.name.clone(),
        source,
    })
}

/// Delete the optional artifacts `output` did not produce. Only files that
/// carry the generated header are touched.
fn remove_stale(dir: &Path, output: &UnitOutput, removed: &mut Vec<PathBuf>) -> Result<(), Error> {
    for artifact in OPTIONAL_ARTIFACTS {
        if output.artifact(artifact).is_some() {
            continue;
        }
        let path = dir.join(artifact);
        let existing = match std::fs::read(&path) {
            Ok(existing) => existing,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => return Err(Error::io(&path, err)),
        };
        if !existing.starts_with(GENERATED_HEADER.as_bytes()) {
            tracing::warn!(path = %path.display(), "unit no longer produces this file, but it was not generated; keeping it");
            continue;
        }
        std::fs::remove_file(&path).map_err(|err| Error::io(&path, err))?;
        tracing::warn!(
            path = %path.display(),
            "removed a file the unit no longer produces; drop its `mod` declaration"
        );
        removed.push(path);
    }
    Ok(())
}

/// Write `contents` unless `path` already holds exactly that. Returns whether
/// it wrote.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool, Error> {
    match std::fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => return Ok(false),
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(Error::io(path, err)),
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
    }
    std::fs::write(path, contents).map_err(|err| Error::io(path, err))?;
    tracing::debug!(path = %path.display(), "wrote");
    Ok(true)
}
