// src/engine/functions.rs
//! Partitioned per-function metric passes: parameter count, cyclomatic
//! complexity, bumpy road.

use crate::error::Result;
use crate::facts::{FunctionFacts, Tag};
use crate::store::{MetricKind, MetricRecord, Subject};

use super::pool::run_partitioned;
use super::PassContext;

pub const PARAMETERS_PASS: &str = "function parameters";
pub const MCCABE_PASS: &str = "function McCabe";
pub const BUMPY_ROAD_PASS: &str = "bumpy road";

// Partition-count multipliers (P = jobs * multiplier). Load balancing only;
// finer partitioning smooths tail latency when subject costs are uneven.
const PARAMETERS_PARTITION_MULTIPLIER: usize = 5;
const MCCABE_PARTITION_MULTIPLIER: usize = 5;
const BUMPY_ROAD_PARTITION_MULTIPLIER: usize = 5;

/// Functions rooted under the input paths, excluding template instantiations
/// and implicit definitions, and excluding subjects that kept a persisted
/// `kind` record across invalidation.
fn candidates(ctx: &PassContext, kind: MetricKind) -> Vec<FunctionFacts> {
    ctx.facts
        .function_facts()
        .filter(|f| {
            let Some(entity) = ctx.facts.entity(f.entity) else {
                return false;
            };
            if entity.has_tag(Tag::TemplateInstantiation) || entity.has_tag(Tag::Implicit) {
                return false;
            }
            let Some(path) = ctx.facts.file_path(entity.file) else {
                return false;
            };
            crate::facts::is_rooted_under_any(&ctx.config.input, path)
                && !ctx.store.contains(Subject::Entity(f.entity), kind)
        })
        .copied()
        .collect()
}

/// Persists the declared parameter count of every candidate function.
pub fn parameter_count(ctx: &PassContext) -> Result<usize> {
    let subjects = candidates(ctx, MetricKind::ParameterCount);
    let computed = subjects.len();

    run_partitioned(
        ctx.pool,
        PARAMETERS_PASS,
        ctx.config.jobs * PARAMETERS_PARTITION_MULTIPLIER,
        subjects,
        |chunk| {
            ctx.store.transaction(|tx| {
                for f in chunk {
                    tx.insert(MetricRecord::new(
                        Subject::Entity(f.entity),
                        MetricKind::ParameterCount,
                        f64::from(f.parameter_count),
                    ));
                }
                Ok(())
            })
        },
    )?;
    Ok(computed)
}

/// Persists the front end's precomputed decision-point count per function.
pub fn function_mccabe(ctx: &PassContext) -> Result<usize> {
    let subjects = candidates(ctx, MetricKind::McCabeFunction);
    let computed = subjects.len();

    run_partitioned(
        ctx.pool,
        MCCABE_PASS,
        ctx.config.jobs * MCCABE_PARTITION_MULTIPLIER,
        subjects,
        |chunk| {
            ctx.store.transaction(|tx| {
                for f in chunk {
                    tx.insert(MetricRecord::new(
                        Subject::Entity(f.entity),
                        MetricKind::McCabeFunction,
                        f64::from(f.mccabe),
                    ));
                }
                Ok(())
            })
        },
    )?;
    Ok(computed)
}

/// Bumpy road: nesting-weighted branch cost per statement. A body with no
/// statements is scored 1.0 — the null-cost convention, which also avoids
/// the zero denominator.
pub fn bumpy_road(ctx: &PassContext) -> Result<usize> {
    let subjects = candidates(ctx, MetricKind::BumpyRoad);
    let computed = subjects.len();

    run_partitioned(
        ctx.pool,
        BUMPY_ROAD_PASS,
        ctx.config.jobs * BUMPY_ROAD_PARTITION_MULTIPLIER,
        subjects,
        |chunk| {
            ctx.store.transaction(|tx| {
                for f in chunk {
                    let bumpiness = f64::from(f.bumpiness);
                    let statements = f64::from(f.statement_count);
                    let value = if f.statement_count == 0 {
                        1.0
                    } else {
                        bumpiness / statements
                    };
                    tx.insert(MetricRecord::new(
                        Subject::Entity(f.entity),
                        MetricKind::BumpyRoad,
                        value,
                    ));
                }
                Ok(())
            })
        },
    )?;
    Ok(computed)
}
