// src/config/io.rs
//! `caliper.toml` loading.

use super::types::{CaliperToml, Config};

pub const CONFIG_FILE: &str = "caliper.toml";

/// Loads `caliper.toml` from the current directory, if present.
pub fn load_toml_config(config: &mut Config) {
    let Ok(content) = std::fs::read_to_string(CONFIG_FILE) else {
        return;
    };
    parse_toml(config, &content);
}

/// Applies a TOML document on top of `config`. Unknown or malformed content
/// is ignored rather than fatal; validation happens later.
pub fn parse_toml(config: &mut Config, content: &str) {
    let Ok(parsed) = toml::from_str::<CaliperToml>(content) else {
        log::warn!("ignoring malformed {CONFIG_FILE}");
        return;
    };
    let Some(engine) = parsed.engine else {
        return;
    };

    if let Some(jobs) = engine.jobs {
        config.jobs = jobs;
    }
    if let Some(input) = engine.input {
        config.input = input;
    }
    if let Some(modules) = engine.modules {
        config.modules = Some(modules);
    }
}
