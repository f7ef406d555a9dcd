// src/engine/relational.rs
//! Relational cohesion per module: H = (R + 1) / N, where R counts internal
//! type relationships and N the types defined in the module.
//!
//! Runs sequentially as the last pass. Modules come from an explicit list
//! file or are inferred from directories directly under the input roots.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::Result;
use crate::facts::{EntityHash, FileId, UsageKind};
use crate::store::{MetricKind, MetricRecord, Subject};

use super::PassContext;

pub const PASS_NAME: &str = "relational cohesion";

/// Module path prefixes for this run. A configured but unreadable module
/// list falls back to directory inference, matching the front-end convention
/// that absence of the file means "not specified".
fn module_prefixes(ctx: &PassContext) -> BTreeSet<String> {
    if let Some(path) = &ctx.config.modules {
        if let Ok(text) = std::fs::read_to_string(path) {
            return text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
        }
        log::warn!(
            "module list {} not readable, inferring modules from directories",
            path.display()
        );
    }

    let mut prefixes = BTreeSet::new();
    for root in &ctx.config.input {
        for dir in ctx.facts.directories_directly_under(root) {
            prefixes.insert(dir.path.clone());
        }
    }
    prefixes
}

/// Computes and persists relational cohesion for every module, in one
/// transaction.
pub fn relational_cohesion(ctx: &PassContext) -> Result<usize> {
    let prefixes = module_prefixes(ctx);

    ctx.store
        .transaction(|tx| {
            let mut computed = 0;
            for prefix in &prefixes {
                let Some(module_file) = ctx.facts.file_by_path(prefix) else {
                    log::debug!("module {prefix} has no file record, skipping");
                    continue;
                };
                let subject = Subject::File(module_file.id);

                // A module's relationships come from files the invalidator
                // does not tie to its directory, so the value is rebuilt
                // every run. The delete also sheds the record of a module
                // that no longer defines any type.
                tx.delete(subject, MetricKind::RelationalCohesion);

                let Some(value) = measure_module(ctx, prefix) else {
                    log::debug!("module {prefix} defines no types, skipping");
                    continue;
                };

                tx.insert(MetricRecord::new(
                    subject,
                    MetricKind::RelationalCohesion,
                    value,
                ));
                computed += 1;
            }
            Ok(computed)
        })
        .map_err(|e| e.in_pass(PASS_NAME))
}

/// Returns the module's cohesion value, or None when it defines no types
/// (the formula's denominator would be zero).
fn measure_module(ctx: &PassContext, prefix: &str) -> Option<f64> {
    // Types defined inside the module, with the file that defines each hash.
    // On duplicate hashes the first definition (entity-id order) wins.
    let mut types_found: HashSet<EntityHash> = HashSet::new();
    let mut defining_file: HashMap<EntityHash, FileId> = HashMap::new();
    for ty in ctx.facts.type_definitions() {
        let Some(path) = ctx.facts.file_path(ty.file) else {
            continue;
        };
        if crate::facts::is_rooted_under(prefix, path) {
            types_found.insert(ty.hash);
            defining_file.entry(ty.hash).or_insert(ty.file);
        }
    }

    let type_count = types_found.len();
    if type_count == 0 {
        return None;
    }

    // One relationship per (file, type) pair: repeated use of a type within
    // the same file must not inflate R.
    let mut counted: HashSet<(FileId, EntityHash)> = HashSet::new();
    let mut relations = 0u64;
    for kind in UsageKind::ALL {
        for usage in ctx.facts.usages_under(prefix, kind) {
            if !types_found.contains(&usage.type_hash) {
                continue;
            }
            // Uses within the defining file are self-relations.
            if defining_file.get(&usage.type_hash) == Some(&usage.file) {
                continue;
            }
            if counted.insert((usage.file, usage.type_hash)) {
                relations += 1;
            }
        }
    }

    Some((relations as f64 + 1.0) / type_count as f64)
}
