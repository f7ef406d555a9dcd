// src/engine/mod.rs
//! The metric pipeline orchestrator.
//!
//! Passes run in a fixed dependency order: invalidation first, then the
//! partitioned function passes, then the aggregates that read their
//! committed results. Passes never interleave.

pub mod cache;
pub mod partition;
pub mod pool;

mod cohesion;
mod functions;
mod relational;
mod type_mccabe;

use serde::Serialize;
use std::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::facts::{ChangeSet, FactStore};
use crate::store::MetricStore;

use self::cache::ResultCache;

/// Shared read-only state handed to every pass.
pub(crate) struct PassContext<'a> {
    pub facts: &'a FactStore,
    pub store: &'a MetricStore,
    pub pool: &'a rayon::ThreadPool,
    pub config: &'a Config,
}

/// Outcome of one metric pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub name: &'static str,
    /// Subjects computed this run. Function-level passes skip survivors;
    /// the aggregate passes recompute every subject.
    pub subjects: usize,
    pub duration_ms: u128,
}

/// Outcome of one engine run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub invalidated_files: usize,
    /// Records deleted because their file or entity vanished from the fact
    /// base. Counted apart from files: an orphan is a single subject.
    pub invalidated_orphans: usize,
    pub passes: Vec<PassReport>,
    pub duration_ms: u128,
}

impl RunReport {
    /// Total subjects computed across all passes.
    #[must_use]
    pub fn total_subjects(&self) -> usize {
        self.passes.iter().map(|p| p.subjects).sum()
    }
}

/// One engine instance per pipeline run. Owns the result cache and the
/// worker pool; reads facts and change statuses, writes only metric records.
pub struct Engine<'a> {
    config: &'a Config,
    facts: &'a FactStore,
    changes: &'a ChangeSet,
    store: &'a MetricStore,
    cache: ResultCache,
    pool: rayon::ThreadPool,
}

impl<'a> Engine<'a> {
    /// Validates the configuration, builds the worker pool and scans the
    /// persisted store into the result cache.
    ///
    /// # Errors
    /// Returns an error for an invalid configuration or an unbuildable pool.
    pub fn new(
        config: &'a Config,
        facts: &'a FactStore,
        changes: &'a ChangeSet,
        store: &'a MetricStore,
    ) -> Result<Self> {
        config.validate()?;
        let pool = pool::build_pool(config.jobs)?;
        let cache = ResultCache::build(store, facts);
        Ok(Self {
            config,
            facts,
            changes,
            store,
            cache,
            pool,
        })
    }

    /// Runs the full pipeline. The first unrecoverable persistence failure
    /// aborts the run; partitions committed before it stay durable.
    ///
    /// # Errors
    /// Propagates the aborting failure, tagged with its pass name.
    pub fn run(&mut self) -> Result<RunReport> {
        let start = Instant::now();

        log::info!("[caliper] invalidating stale metric records");
        let invalidated = self
            .cache
            .invalidate(self.facts, self.changes, self.store)?;

        let ctx = PassContext {
            facts: self.facts,
            store: self.store,
            pool: &self.pool,
            config: self.config,
        };

        let passes = vec![
            timed(functions::PARAMETERS_PASS, || functions::parameter_count(&ctx))?,
            timed(functions::MCCABE_PASS, || functions::function_mccabe(&ctx))?,
            timed(functions::BUMPY_ROAD_PASS, || functions::bumpy_road(&ctx))?,
            timed(type_mccabe::PASS_NAME, || type_mccabe::type_mccabe(&ctx))?,
            timed(cohesion::PASS_NAME, || cohesion::lack_of_cohesion(&ctx))?,
            timed(relational::PASS_NAME, || {
                relational::relational_cohesion(&ctx)
            })?,
        ];

        Ok(RunReport {
            invalidated_files: invalidated.files,
            invalidated_orphans: invalidated.orphans,
            passes,
            duration_ms: start.elapsed().as_millis(),
        })
    }
}

fn timed<F>(name: &'static str, f: F) -> Result<PassReport>
where
    F: FnOnce() -> Result<usize>,
{
    log::info!("[caliper] computing {name}");
    let start = Instant::now();
    let subjects = f()?;
    Ok(PassReport {
        name,
        subjects,
        duration_ms: start.elapsed().as_millis(),
    })
}
