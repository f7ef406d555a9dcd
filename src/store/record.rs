// src/store/record.rs
//! The engine's sole owned, persisted output type.

use serde::{Deserialize, Serialize};

use crate::facts::{EntityId, FileId};

/// Discriminant of a metric record. One algorithm produces each kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MetricKind {
    ParameterCount,
    McCabeFunction,
    BumpyRoad,
    McCabeType,
    LackOfCohesion,
    LackOfCohesionHs,
    RelationalCohesion,
}

impl MetricKind {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MetricKind::ParameterCount => "parameter count",
            MetricKind::McCabeFunction => "function McCabe",
            MetricKind::BumpyRoad => "bumpy road",
            MetricKind::McCabeType => "type McCabe",
            MetricKind::LackOfCohesion => "lack of cohesion",
            MetricKind::LackOfCohesionHs => "lack of cohesion (HS)",
            MetricKind::RelationalCohesion => "relational cohesion",
        }
    }
}

/// What a metric record describes: a source entity (function or type) or a
/// file/module.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Subject {
    Entity(EntityId),
    File(FileId),
}

/// One persisted measurement. Never updated in place: invalidation deletes
/// the record and a later pass inserts a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub subject: Subject,
    pub kind: MetricKind,
    #[serde(with = "nan_as_null")]
    pub value: f64,
}

impl MetricRecord {
    #[must_use]
    pub const fn new(subject: Subject, kind: MetricKind, value: f64) -> Self {
        Self {
            subject,
            kind,
            value,
        }
    }
}

/// NaN is a documented sentinel ("undefined", e.g. HS-LCOM of a
/// single-method type) but JSON has no NaN literal, so it round-trips as
/// `null`.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, ser: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            ser.serialize_none()
        } else {
            ser.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(de)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_round_trips_as_null() {
        let record = MetricRecord::new(
            Subject::Entity(9),
            MetricKind::LackOfCohesionHs,
            f64::NAN,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"value\":null"));

        let back: MetricRecord = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_nan());
        assert_eq!(back.subject, Subject::Entity(9));
    }

    #[test]
    fn test_finite_value_round_trips() {
        let record = MetricRecord::new(Subject::File(3), MetricKind::RelationalCohesion, 1.5);
        let json = serde_json::to_string(&record).unwrap();
        let back: MetricRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
