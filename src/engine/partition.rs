// src/engine/partition.rs
//! Order-preserving split of a subject set into work partitions.

/// Splits `items` into at most `parts` contiguous chunks whose sizes differ
/// by at most one. Every item lands in exactly one chunk; empty chunks are
/// never emitted.
#[must_use]
pub fn partition<T>(items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let parts = parts.clamp(1, total);

    let base = total / parts;
    let extra = total % parts;

    let mut chunks = Vec::with_capacity(parts);
    let mut rest = items;
    for index in 0..parts {
        // The first `extra` chunks carry one item more.
        let size = base + usize::from(index < extra);
        let tail = rest.split_off(size);
        chunks.push(rest);
        rest = tail;
    }
    debug_assert!(rest.is_empty());
    chunks
}
