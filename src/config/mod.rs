// src/config/mod.rs
pub mod io;
pub mod types;

pub use self::types::{CaliperToml, Config, EngineSection};

use crate::error::{CaliperError, Result};

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with local settings (`caliper.toml`) applied.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::new();
        io::load_toml_config(&mut config);
        config
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the worker pool would be empty or no input root
    /// is configured.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(CaliperError::Config("jobs must be at least 1".into()));
        }
        if self.input.is_empty() {
            return Err(CaliperError::Config(
                "at least one input root is required".into(),
            ));
        }
        Ok(())
    }
}
