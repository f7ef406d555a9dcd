pub mod config;
pub mod engine;
pub mod error;
pub mod facts;
pub mod store;

pub use crate::engine::{Engine, RunReport};
pub use crate::error::{CaliperError, Result};
