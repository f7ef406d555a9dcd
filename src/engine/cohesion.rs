// src/engine/cohesion.rs
//! Lack of cohesion of methods, standard and Henderson-Sellers variants,
//! partitioned by type.

use std::collections::HashSet;

use crate::error::Result;
use crate::facts::{Entity, EntityHash, MemberKind, Tag};
use crate::store::{MetricKind, MetricRecord, Subject};

use super::pool::run_partitioned;
use super::PassContext;

pub const PASS_NAME: &str = "lack of cohesion";

const LCOM_PARTITION_MULTIPLIER: usize = 10;

/// Type definitions rooted under the input paths, excluding template
/// instantiations and types whose cohesion records survived invalidation.
fn candidates(ctx: &PassContext) -> Vec<Entity> {
    ctx.facts
        .type_definitions()
        .filter(|ty| {
            if ty.has_tag(Tag::TemplateInstantiation) {
                return false;
            }
            let Some(path) = ctx.facts.file_path(ty.file) else {
                return false;
            };
            crate::facts::is_rooted_under_any(&ctx.config.input, path)
                && !ctx
                    .store
                    .contains(Subject::Entity(ty.id), MetricKind::LackOfCohesion)
        })
        .cloned()
        .collect()
}

/// Computes and persists both LCOM variants for every candidate type.
/// Trivial types (no fields or no methods) get an explicit 0.0; a
/// single-method type's HS value is the NaN sentinel, preserved verbatim.
pub fn lack_of_cohesion(ctx: &PassContext) -> Result<usize> {
    let subjects = candidates(ctx);
    let computed = subjects.len();

    run_partitioned(
        ctx.pool,
        PASS_NAME,
        ctx.config.jobs * LCOM_PARTITION_MULTIPLIER,
        subjects,
        |chunk| {
            ctx.store.transaction(|tx| {
                for ty in chunk {
                    let (fields, methods, cohesion) = measure_type(ctx, ty);

                    let f = fields as f64;
                    let m = methods as f64;
                    let c = cohesion as f64;
                    let trivial = fields == 0 || methods == 0;
                    let singular = methods == 1;

                    // Standard variant, range [0,1].
                    let lcom = if trivial { 0.0 } else { 1.0 - c / (m * f) };
                    tx.insert(MetricRecord::new(
                        Subject::Entity(ty.id),
                        MetricKind::LackOfCohesion,
                        lcom,
                    ));

                    // Henderson-Sellers variant, range [0,2]; undefined for a
                    // single method (division by M - 1).
                    let lcom_hs = if trivial {
                        0.0
                    } else if singular {
                        f64::NAN
                    } else {
                        (m - c / f) / (m - 1.0)
                    };
                    tx.insert(MetricRecord::new(
                        Subject::Entity(ty.id),
                        MetricKind::LackOfCohesionHs,
                        lcom_hs,
                    ));
                }
                Ok(())
            })
        },
    )?;
    Ok(computed)
}

/// Returns (distinct fields, methods with a body, summed used-field counts).
fn measure_type(ctx: &PassContext, ty: &Entity) -> (usize, usize, usize) {
    let field_hashes: HashSet<EntityHash> = ctx
        .facts
        .members_of(ty.hash, MemberKind::Field)
        .filter_map(|m| ctx.facts.entity(m.entity))
        .map(|e| e.hash)
        .collect();

    let mut method_count = 0;
    let mut total_cohesion = 0;
    for member in ctx.facts.members_of(ty.hash, MemberKind::Method) {
        let Some(method) = ctx.facts.entity(member.entity) else {
            continue;
        };
        // start == end means no explicit body; such methods do not qualify.
        if method.span.is_empty() {
            continue;
        }

        let used_fields: HashSet<EntityHash> = ctx
            .facts
            .field_references_in(method.file, &method.span)
            .filter(|r| field_hashes.contains(&r.hash))
            .map(|r| r.hash)
            .collect();

        method_count += 1;
        total_cohesion += used_fields.len();
    }

    (field_hashes.len(), method_count, total_cohesion)
}
