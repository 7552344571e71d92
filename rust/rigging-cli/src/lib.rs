//! The `rigging` command: scaffolds a service described by `rigging.yaml` and
//! generates the bindings of each of its units.
//!
//! ```text
//! rigging.yaml ──► Config ──► scaffold (create-if-absent)
//!                         └─► generate (units in parallel) ──► <output>/<service>/<unit>/*_gen.rs
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod scaffold;

pub use config::Config;
pub use error::Error;
pub use generate::{Report, UnitReport, generate};
pub use scaffold::scaffold;
