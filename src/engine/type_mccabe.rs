// src/engine/type_mccabe.rs
//! Type-level McCabe: the sum of a type's method complexities.
//!
//! Runs sequentially after the function passes, since it reads their
//! already-committed records.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::facts::{EntityId, MemberKind, Tag};
use crate::store::{MetricKind, MetricRecord, Subject};

use super::PassContext;

pub const PASS_NAME: &str = "type McCabe";

/// Aggregates persisted function McCabe values per type and persists the sum
/// in one transaction. A type with no eligible methods gets an explicit 0.
///
/// Method bodies can live in files other than the type's own, so an existing
/// sum is never trusted across runs: every type's record is replaced within
/// the transaction.
pub fn type_mccabe(ctx: &PassContext) -> Result<usize> {
    let mut sums: BTreeMap<EntityId, f64> = BTreeMap::new();

    for ty in ctx.facts.type_definitions() {
        // Skip types included from outside the analyzed roots.
        let Some(path) = ctx.facts.file_path(ty.file) else {
            continue;
        };
        if !crate::facts::is_rooted_under_any(&ctx.config.input, path) {
            continue;
        }
        if ty.has_tag(Tag::TemplateInstantiation) {
            continue;
        }

        let mut sum = 0.0;
        for member in ctx.facts.members_of(ty.hash, MemberKind::Method) {
            let Some(method_node) = ctx.facts.entity(member.entity) else {
                continue;
            };

            // The definition is a different node when the method is defined
            // outside the class body. Several definitions can share a hash
            // (headers compiled into multiple units); the first candidate in
            // the deterministic (path, id) order wins, a documented small
            // inaccuracy.
            let definitions = ctx.facts.function_definitions_by_hash(method_node.hash);
            let Some(definition) = definitions.first() else {
                continue;
            };

            // Implicitly generated methods (default ctors, operator=) do not
            // contribute.
            if definition.has_tag(Tag::Implicit) {
                continue;
            }

            // A missing function record is a silent zero contribution, not
            // an error.
            if let Some(value) = ctx
                .store
                .value(Subject::Entity(definition.id), MetricKind::McCabeFunction)
            {
                sum += value;
            }
        }
        sums.insert(ty.id, sum);
    }

    let computed = sums.len();
    ctx.store
        .transaction(|tx| {
            for (&type_id, &value) in &sums {
                tx.delete(Subject::Entity(type_id), MetricKind::McCabeType);
                tx.insert(MetricRecord::new(
                    Subject::Entity(type_id),
                    MetricKind::McCabeType,
                    value,
                ));
            }
            Ok(())
        })
        .map_err(|e| e.in_pass(PASS_NAME))?;
    Ok(computed)
}
