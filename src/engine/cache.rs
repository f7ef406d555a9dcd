// src/engine/cache.rs
//! Result cache and invalidator.
//!
//! Built once per engine instance by scanning the persisted store, so
//! invalidation never needs a full table scan. After `invalidate()` returns
//! the cache is not mutated again for the rest of the run.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::facts::{ChangeSet, EntityId, FactStore, FileId};
use crate::store::{MetricStore, Subject};

pub const PASS_NAME: &str = "invalidation";

/// What one invalidation deleted. Orphans are individual stale subjects,
/// not files, so the two counts are kept apart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Files whose records were deleted because the file is stale.
    pub files: usize,
    /// Subjects deleted because their owner vanished from the fact base.
    pub orphans: usize,
}

/// Index of previously-persisted metric records by owning file.
#[derive(Debug, Default)]
pub struct ResultCache {
    /// Files that own file-level records (module metrics).
    files: BTreeSet<FileId>,
    /// Entity-level record subjects and their owning file.
    entities: BTreeMap<EntityId, FileId>,
    /// Subjects whose owner no longer resolves in the fact base. The front
    /// end already pruned the file or entity row, so these records are stale
    /// by definition.
    orphans: BTreeSet<Subject>,
}

impl ResultCache {
    /// Scans the persisted store once and indexes every record's owner.
    #[must_use]
    pub fn build(store: &MetricStore, facts: &FactStore) -> Self {
        let mut cache = Self::default();
        for record in store.records() {
            match record.subject {
                Subject::File(file) => {
                    if facts.file(file).is_some() {
                        cache.files.insert(file);
                    } else {
                        cache.orphans.insert(record.subject);
                    }
                }
                Subject::Entity(entity) => match facts.entity(entity) {
                    Some(e) => {
                        cache.entities.insert(entity, e.file);
                    }
                    None => {
                        cache.orphans.insert(record.subject);
                    }
                },
            }
        }
        cache
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.entities.is_empty() && self.orphans.is_empty()
    }

    /// Deletes all metric records belonging to changed or vanished files, in
    /// one transaction, and drops the matching cache entries. Runs before any
    /// metric pass; a transactional failure here aborts the whole run.
    /// Calling it again without intervening changes deletes nothing.
    ///
    /// Returns how many stale files and orphaned subjects were invalidated.
    ///
    /// # Errors
    /// Propagates a store failure, tagged with the invalidation pass name.
    pub fn invalidate(
        &mut self,
        facts: &FactStore,
        changes: &ChangeSet,
        store: &MetricStore,
    ) -> Result<InvalidationReport> {
        if self.is_empty() {
            return Ok(InvalidationReport::default());
        }

        // A file id that resolved at build time keeps resolving against the
        // same snapshot; an unresolvable one is treated as stale.
        let is_stale = |file: FileId| {
            facts
                .file_path(file)
                .map_or(true, |path| changes.status(path).is_stale())
        };

        let stale_files: BTreeSet<FileId> = self
            .files
            .iter()
            .copied()
            .chain(self.entities.values().copied())
            .filter(|&f| is_stale(f))
            .collect();

        if stale_files.is_empty() && self.orphans.is_empty() {
            return Ok(InvalidationReport::default());
        }

        let result = store
            .transaction(|tx| {
                for &file in &stale_files {
                    if let Some(path) = facts.file_path(file) {
                        log::info!("[caliper] database cleanup: {path}");
                    }
                }
                for &file in self.files.intersection(&stale_files) {
                    tx.delete_subject(Subject::File(file));
                }
                for (&entity, file) in &self.entities {
                    if stale_files.contains(file) {
                        tx.delete_subject(Subject::Entity(entity));
                    }
                }
                for &subject in &self.orphans {
                    log::info!("[caliper] database cleanup: orphaned {subject:?}");
                    tx.delete_subject(subject);
                }
                Ok(InvalidationReport {
                    files: stale_files.len(),
                    orphans: self.orphans.len(),
                })
            })
            .map_err(|e| e.in_pass(PASS_NAME))?;

        self.files.retain(|f| !stale_files.contains(f));
        self.entities.retain(|_, f| !stale_files.contains(f));
        self.orphans.clear();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{
        AstKind, Entity, FileKind, FileRecord, FileStatus, Span, SymbolKind,
    };
    use crate::store::{MetricKind, MetricRecord};

    fn fixture() -> (FactStore, MetricStore) {
        let mut facts = FactStore::new();
        facts.add_file(FileRecord {
            id: 1,
            path: "src/a.cpp".into(),
            kind: FileKind::Regular,
        });
        facts.add_file(FileRecord {
            id: 2,
            path: "src/b.cpp".into(),
            kind: FileKind::Regular,
        });
        for (id, file) in [(10, 1), (20, 2)] {
            facts.add_entity(Entity {
                id,
                hash: id,
                file,
                span: Span::default(),
                symbol: SymbolKind::Function,
                ast: AstKind::Definition,
                tags: Default::default(),
            });
        }

        let store = MetricStore::in_memory();
        store
            .transaction(|tx| {
                tx.insert(MetricRecord::new(
                    Subject::Entity(10),
                    MetricKind::McCabeFunction,
                    3.0,
                ));
                tx.insert(MetricRecord::new(
                    Subject::Entity(20),
                    MetricKind::McCabeFunction,
                    5.0,
                ));
                Ok(())
            })
            .unwrap();

        (facts, store)
    }

    #[test]
    fn test_invalidates_only_stale_files() {
        let (facts, store) = fixture();
        let mut changes = ChangeSet::new();
        changes.set("src/a.cpp", FileStatus::Modified);

        let mut cache = ResultCache::build(&store, &facts);
        let report = cache.invalidate(&facts, &changes, &store).unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.orphans, 0);
        assert!(!store.contains(Subject::Entity(10), MetricKind::McCabeFunction));
        assert!(store.contains(Subject::Entity(20), MetricKind::McCabeFunction));
    }

    #[test]
    fn test_invalidation_is_idempotent() {
        let (facts, store) = fixture();
        let mut changes = ChangeSet::new();
        changes.set("src/a.cpp", FileStatus::ActionChanged);

        let mut cache = ResultCache::build(&store, &facts);
        assert_eq!(cache.invalidate(&facts, &changes, &store).unwrap().files, 1);
        let again = cache.invalidate(&facts, &changes, &store).unwrap();
        assert_eq!(again, InvalidationReport::default());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_orphaned_records_are_dropped() {
        let (facts, store) = fixture();
        // A record whose entity is gone from the fact base.
        store
            .transaction(|tx| {
                tx.insert(MetricRecord::new(
                    Subject::Entity(99),
                    MetricKind::BumpyRoad,
                    1.0,
                ));
                Ok(())
            })
            .unwrap();

        let mut cache = ResultCache::build(&store, &facts);
        let report = cache
            .invalidate(&facts, &ChangeSet::new(), &store)
            .unwrap();

        // The vanished entity is an orphan, not a stale file.
        assert_eq!(report.files, 0);
        assert_eq!(report.orphans, 1);
        assert!(!store.contains(Subject::Entity(99), MetricKind::BumpyRoad));
        assert_eq!(store.len(), 2);
    }
}
