//! Field-level comparison of two snapshots of the same flight

use std::collections::BTreeMap;

use serde::Serialize;

use super::snapshot::{FieldValue, FlightSnapshot, SnapshotField};

/// Timestamp changes at or below this many seconds are treated as jitter
pub const DEFAULT_TOLERANCE_SECS: i64 = 600;

/// Fields that changed between two snapshots, with their old and new values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    changes: BTreeMap<SnapshotField, (FieldValue, FieldValue)>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn contains(&self, field: SnapshotField) -> bool {
        self.changes.contains_key(&field)
    }

    pub fn get(&self, field: SnapshotField) -> Option<&(FieldValue, FieldValue)> {
        self.changes.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = SnapshotField> + '_ {
        self.changes.keys().copied()
    }
}

/// Comparator errors. Both indicate a defect in the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("Identity mismatch: {old} vs {new}")]
    IdentityMismatch { old: String, new: String },

    #[error("Schema mismatch: version {old} vs {new}")]
    SchemaMismatch { old: u32, new: u32 },
}

/// Compare two snapshots of the same flight.
///
/// Timestamp fields count as changed when they appear, disappear, or move by
/// more than `tolerance_secs`. Text fields count on any inequality.
pub fn compare(
    old: &FlightSnapshot,
    new: &FlightSnapshot,
    tolerance_secs: i64,
) -> Result<Diff, DiffError> {
    if old.flight_id != new.flight_id || old.flight_code != new.flight_code {
        return Err(DiffError::IdentityMismatch {
            old: format!("{}/{}", old.flight_code, old.flight_id),
            new: format!("{}/{}", new.flight_code, new.flight_id),
        });
    }
    if old.schema_version != new.schema_version {
        return Err(DiffError::SchemaMismatch {
            old: old.schema_version,
            new: new.schema_version,
        });
    }

    let mut changes = BTreeMap::new();
    for field in SnapshotField::ALL {
        let before = old.field(field);
        let after = new.field(field);
        if field_changed(&before, &after, tolerance_secs) {
            changes.insert(field, (before, after));
        }
    }

    Ok(Diff { changes })
}

fn field_changed(before: &FieldValue, after: &FieldValue, tolerance_secs: i64) -> bool {
    match (before, after) {
        (FieldValue::Timestamp(Some(a)), FieldValue::Timestamp(Some(b))) => {
            (*b - *a).num_seconds().abs() > tolerance_secs
        }
        _ => before != after,
    }
}
