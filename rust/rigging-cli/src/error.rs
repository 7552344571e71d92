use std::io;
use std::path::PathBuf;

use rigging_codegen::UnitError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot load config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigSource,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The unit is skipped; the others still generate.
    #[error("unit `{unit}`: cannot read interface {}: {source}", path.display())]
    ReadInterface {
        unit: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The unit is skipped; the others still generate.
    #[error("unit `{unit}`: {source}")]
    Unit {
        unit: String,
        #[source]
        source: UnitError,
    },

    #[error("cannot write {}: {source}", path.display())]
    GenerationIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigSource {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::GenerationIo {
            path: path.into(),
            source,
        }
    }
}
