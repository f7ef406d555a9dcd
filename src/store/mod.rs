// src/store/mod.rs
//! Persisted metric records with transactional insert/delete.
//!
//! The table lives in memory behind a mutex and is flushed to its backing
//! JSON file on every commit, so records committed by one partition stay
//! durable even when a later partition aborts the run.

pub mod record;

pub use self::record::{MetricKind, MetricRecord, Subject};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate metric record: {subject:?} already has a {kind:?} value")]
    Duplicate { subject: Subject, kind: MetricKind },
}

type Table = BTreeMap<(Subject, MetricKind), f64>;

/// Staged operations of one transaction. Deletes apply before inserts.
#[derive(Debug, Default)]
pub struct Transaction {
    deletes: Vec<Subject>,
    targeted_deletes: Vec<(Subject, MetricKind)>,
    inserts: Vec<MetricRecord>,
}

impl Transaction {
    /// Stages removal of every record describing `subject`.
    pub fn delete_subject(&mut self, subject: Subject) {
        self.deletes.push(subject);
    }

    /// Stages removal of the single (subject, kind) record, leaving the
    /// subject's other kinds untouched. Replacing a record is this followed
    /// by an insert in the same transaction.
    pub fn delete(&mut self, subject: Subject, kind: MetricKind) {
        self.targeted_deletes.push((subject, kind));
    }

    /// Stages an insert. Committing a (subject, kind) pair that still exists
    /// after the staged deletes is a constraint violation.
    pub fn insert(&mut self, record: MetricRecord) {
        self.inserts.push(record);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.targeted_deletes.is_empty() && self.inserts.is_empty()
    }

    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.deletes.len() + self.targeted_deletes.len()
    }

    #[must_use]
    pub fn insert_count(&self) -> usize {
        self.inserts.len()
    }
}

/// The persistent metric-record store.
pub struct MetricStore {
    path: Option<PathBuf>,
    table: Mutex<Table>,
}

impl MetricStore {
    /// A store with no backing file; used by unit tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            table: Mutex::new(Table::new()),
        }
    }

    /// Opens (or creates) a store backed by `path`.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut table = Table::new();
        if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
                source,
                path: path.to_path_buf(),
            })?;
            let records: Vec<MetricRecord> = serde_json::from_str(&text)?;
            for r in records {
                table.insert((r.subject, r.kind), r.value);
            }
        }
        Ok(Self {
            path: Some(path.to_path_buf()),
            table: Mutex::new(table),
        })
    }

    /// Runs `f` against a staged transaction and commits it atomically.
    /// If `f` fails, nothing is applied; if the commit fails, the in-memory
    /// table and the backing file are both left untouched.
    ///
    /// # Errors
    /// Propagates the closure's error, or a `StoreError` from the commit.
    pub fn transaction<T, F>(&self, f: F) -> crate::Result<T>
    where
        F: FnOnce(&mut Transaction) -> crate::Result<T>,
    {
        let mut tx = Transaction::default();
        let out = f(&mut tx)?;
        self.commit(tx)?;
        Ok(out)
    }

    fn commit(&self, tx: Transaction) -> Result<(), StoreError> {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());

        // Stage against a working copy so a constraint violation or a failed
        // flush leaves the committed state untouched.
        let mut next = table.clone();
        for subject in &tx.deletes {
            next.retain(|(s, _), _| s != subject);
        }
        for key in &tx.targeted_deletes {
            next.remove(key);
        }
        for record in &tx.inserts {
            let key = (record.subject, record.kind);
            if next.contains_key(&key) {
                return Err(StoreError::Duplicate {
                    subject: record.subject,
                    kind: record.kind,
                });
            }
            next.insert(key, record.value);
        }

        self.flush(&next)?;
        *table = next;
        Ok(())
    }

    fn flush(&self, table: &Table) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let records: Vec<MetricRecord> = table
            .iter()
            .map(|(&(subject, kind), &value)| MetricRecord::new(subject, kind, value))
            .collect();
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json).map_err(|source| StoreError::Io {
            source,
            path: path.clone(),
        })
    }

    #[must_use]
    pub fn value(&self, subject: Subject, kind: MetricKind) -> Option<f64> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.get(&(subject, kind)).copied()
    }

    #[must_use]
    pub fn contains(&self, subject: Subject, kind: MetricKind) -> bool {
        self.value(subject, kind).is_some()
    }

    /// Snapshot of all records in (subject, kind) order.
    #[must_use]
    pub fn records(&self) -> Vec<MetricRecord> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table
            .iter()
            .map(|(&(subject, kind), &value)| MetricRecord::new(subject, kind, value))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaliperError;

    fn record(subject: Subject, kind: MetricKind, value: f64) -> MetricRecord {
        MetricRecord::new(subject, kind, value)
    }

    #[test]
    fn test_commit_applies_deletes_before_inserts() {
        let store = MetricStore::in_memory();
        store
            .transaction(|tx| {
                tx.insert(record(Subject::Entity(1), MetricKind::McCabeFunction, 4.0));
                Ok(())
            })
            .unwrap();

        // Replacing a record in one transaction is delete + insert.
        store
            .transaction(|tx| {
                tx.delete_subject(Subject::Entity(1));
                tx.insert(record(Subject::Entity(1), MetricKind::McCabeFunction, 7.0));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            store.value(Subject::Entity(1), MetricKind::McCabeFunction),
            Some(7.0)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_targeted_delete_leaves_other_kinds_of_the_subject() {
        let store = MetricStore::in_memory();
        store
            .transaction(|tx| {
                tx.insert(record(Subject::Entity(9), MetricKind::McCabeType, 4.0));
                tx.insert(record(Subject::Entity(9), MetricKind::LackOfCohesion, 0.5));
                Ok(())
            })
            .unwrap();

        store
            .transaction(|tx| {
                tx.delete(Subject::Entity(9), MetricKind::McCabeType);
                tx.insert(record(Subject::Entity(9), MetricKind::McCabeType, 9.0));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            store.value(Subject::Entity(9), MetricKind::McCabeType),
            Some(9.0)
        );
        assert_eq!(
            store.value(Subject::Entity(9), MetricKind::LackOfCohesion),
            Some(0.5)
        );
    }

    #[test]
    fn test_duplicate_insert_is_rejected_atomically() {
        let store = MetricStore::in_memory();
        store
            .transaction(|tx| {
                tx.insert(record(Subject::Entity(1), MetricKind::BumpyRoad, 1.0));
                Ok(())
            })
            .unwrap();

        let err = store
            .transaction(|tx| {
                tx.insert(record(Subject::Entity(2), MetricKind::BumpyRoad, 0.5));
                tx.insert(record(Subject::Entity(1), MetricKind::BumpyRoad, 0.9));
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CaliperError::Store(StoreError::Duplicate { .. })
        ));

        // The valid insert in the failed transaction must not have leaked.
        assert!(!store.contains(Subject::Entity(2), MetricKind::BumpyRoad));
        assert_eq!(
            store.value(Subject::Entity(1), MetricKind::BumpyRoad),
            Some(1.0)
        );
    }

    #[test]
    fn test_closure_error_discards_staged_work() {
        let store = MetricStore::in_memory();
        let result: crate::Result<()> = store.transaction(|tx| {
            tx.insert(record(Subject::File(5), MetricKind::RelationalCohesion, 2.0));
            Err(CaliperError::Facts("boom".into()))
        });
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip_through_file_preserves_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        let store = MetricStore::open(&path).unwrap();
        store
            .transaction(|tx| {
                tx.insert(record(
                    Subject::Entity(3),
                    MetricKind::LackOfCohesionHs,
                    f64::NAN,
                ));
                tx.insert(record(Subject::Entity(3), MetricKind::LackOfCohesion, 0.25));
                Ok(())
            })
            .unwrap();

        let reopened = MetricStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened
            .value(Subject::Entity(3), MetricKind::LackOfCohesionHs)
            .unwrap()
            .is_nan());
        assert_eq!(
            reopened.value(Subject::Entity(3), MetricKind::LackOfCohesion),
            Some(0.25)
        );
    }
}
