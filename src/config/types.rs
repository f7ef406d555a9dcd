// src/config/types.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration: worker-pool size, analysis roots, optional module
/// list. No auto-detection — `jobs` is exactly the pool size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Root paths scoped for analysis; subjects outside them are ignored.
    #[serde(default)]
    pub input: Vec<String>,

    /// Optional module-list file (one path prefix per line). When absent,
    /// modules are inferred from directories directly under the input roots.
    #[serde(default)]
    pub modules: Option<PathBuf>,

    #[serde(skip)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            input: Vec::new(),
            modules: None,
            verbose: false,
        }
    }
}

fn default_jobs() -> usize {
    1
}

/// Layout of `caliper.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct CaliperToml {
    #[serde(default)]
    pub engine: Option<EngineSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngineSection {
    pub jobs: Option<usize>,
    pub input: Option<Vec<String>>,
    pub modules: Option<PathBuf>,
}
