//! core::prepare
//!
//! Projects resolved views back into serial views before serialization.
//!
//! Preparation is the inverse of resolution: each reference field's serial
//! list is replaced by the serials of its resolved targets, in resolved-view
//! order. No searching is involved; a handle is turned into a serial through
//! [`RecordLookup::serial_of`].

use tracing::warn;

use crate::core::dataset::{Record, RecordKind};
use crate::core::document::RecordLookup;
use crate::core::types::Serial;

/// The planned serial views for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRecord {
    kind: RecordKind,
    fields: Vec<Vec<Serial>>,
}

impl PreparedRecord {
    /// Planned serials per reference field, in field declaration order.
    pub fn fields(&self) -> &[Vec<Serial>] {
        &self.fields
    }

    /// Total number of planned serials.
    pub fn len(&self) -> usize {
        self.fields.iter().map(Vec::len).sum()
    }

    /// Check if no serials are planned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the record's serial views with the planned ones.
    pub fn apply(self, record: &mut Record) {
        debug_assert_eq!(record.kind(), self.kind, "preparation applied to another kind");
        for ((_, field), serials) in record.ref_fields_mut().into_iter().zip(self.fields) {
            field.set_serials(serials);
        }
    }
}

/// Regenerates serial views from resolved views.
pub struct Preparer<'a, L: RecordLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: RecordLookup + ?Sized> Preparer<'a, L> {
    /// Create a preparer that reads target serials from `lookup`.
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Compute the serial views for one record without mutating it.
    pub fn project(&self, record: &Record) -> PreparedRecord {
        let fields = record
            .ref_fields()
            .into_iter()
            .map(|(spec, field)| {
                field
                    .resolved()
                    .iter()
                    .filter_map(|target| {
                        let serial = self.lookup.serial_of(*target);
                        if serial.is_none() {
                            warn!(
                                "{} {} field '{}' holds a handle to no record: {:?}",
                                record.kind(),
                                record.serial(),
                                spec.name,
                                target
                            );
                        }
                        serial.cloned()
                    })
                    .collect()
            })
            .collect();

        PreparedRecord {
            kind: record.kind(),
            fields,
        }
    }

    /// Project and apply in one step.
    pub fn prepare(&self, record: &mut Record) {
        let prepared = self.project(record);
        prepared.apply(record);
    }
}
