// src/engine/pool.rs
//! Fixed-size worker pool shared by the partitioned metric passes.

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::error::{CaliperError, Result};

use super::partition::partition;

/// Builds the bounded pool. Exactly `jobs` workers; no auto-detection.
pub fn build_pool(jobs: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| CaliperError::Config(format!("cannot build worker pool: {e}")))
}

/// Splits `subjects` into `partitions` chunks and runs `task` once per chunk
/// on the pool, blocking until every task finished. Each task is expected to
/// commit its own store transaction; the first failing task aborts the pass
/// (already-committed partitions are not rolled back) and its error is
/// tagged with the pass name.
///
/// # Errors
/// Propagates the first task failure.
pub fn run_partitioned<T, F>(
    pool: &rayon::ThreadPool,
    pass: &'static str,
    partitions: usize,
    subjects: Vec<T>,
    task: F,
) -> Result<()>
where
    T: Send + Sync,
    F: Fn(&[T]) -> Result<()> + Sync,
{
    let chunks = partition(subjects, partitions);
    log::debug!("{pass}: dispatching {} partition(s)", chunks.len());

    pool.install(|| {
        chunks
            .par_iter()
            .try_for_each(|chunk| task(chunk).map_err(|e| e.in_pass(pass)))
    })
}
