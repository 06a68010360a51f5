//! core::verify
//!
//! Document integrity verification.
//!
//! # Checks
//!
//! - Serials are unique within each kind's collection
//! - Every serial in a reference field names a record of a candidate kind
//! - Every record passes its completeness check
//! - Each serial's dataset type segment matches its collection's code
//!
//! # Invariants
//!
//! - Never mutates the document
//! - Must be deterministic (errors follow document iteration order)

use std::fmt;

use thiserror::Error;

use super::dataset::RecordKind;
use super::document::{Document, RecordLookup};
use super::resolve::SerialIndex;
use super::types::Serial;

/// Errors from verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("duplicate serial {serial} in {kind} collection")]
    DuplicateSerial { kind: RecordKind, serial: Serial },

    #[error("{kind} {source_serial} field '{field}' names missing record {serial}")]
    DanglingReference {
        kind: RecordKind,
        source_serial: Serial,
        field: &'static str,
        serial: Serial,
    },

    #[error("{kind} {serial} is missing required fields")]
    Incomplete { kind: RecordKind, serial: Serial },

    #[error("{kind} {serial} has dataset type '{}', expected '{}'", .serial.dataset_type(), .kind.code())]
    DatasetTypeMismatch { kind: RecordKind, serial: Serial },
}

/// Findings of one verification run, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyResult {
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Check if the document passed every check.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Count the findings per check.
    pub fn summary(&self) -> VerifySummary {
        let mut summary = VerifySummary::default();
        for error in &self.errors {
            match error {
                VerifyError::DuplicateSerial { .. } => summary.duplicates += 1,
                VerifyError::DanglingReference { .. } => summary.dangling += 1,
                VerifyError::Incomplete { .. } => summary.incomplete += 1,
                VerifyError::DatasetTypeMismatch { .. } => summary.mismatched += 1,
            }
        }
        summary
    }
}

/// Per-check finding counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifySummary {
    pub duplicates: usize,
    pub dangling: usize,
    pub incomplete: usize,
    pub mismatched: usize,
}

impl VerifySummary {
    /// Total number of findings.
    pub fn total(&self) -> usize {
        self.duplicates + self.dangling + self.incomplete + self.mismatched
    }
}

impl fmt::Display for VerifySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} duplicate, {} dangling, {} incomplete, {} mismatched",
            self.duplicates, self.dangling, self.incomplete, self.mismatched
        )
    }
}

/// Verify a document in flat or linked state.
///
/// Reference checks read serial views, so run
/// [`Document::prepare_all`] first if resolved views were edited.
pub fn verify(document: &Document) -> VerifyResult {
    let mut errors: Vec<VerifyError> = document
        .duplicate_serials()
        .into_iter()
        .map(|(kind, serial)| VerifyError::DuplicateSerial { kind, serial })
        .collect();

    let index = SerialIndex::build(document);
    for (handle, record) in document.iter() {
        let kind = handle.kind();

        if record.serial().dataset_type() != kind.code() {
            errors.push(VerifyError::DatasetTypeMismatch {
                kind,
                serial: record.serial().clone(),
            });
        }

        if !record.is_complete() {
            errors.push(VerifyError::Incomplete {
                kind,
                serial: record.serial().clone(),
            });
        }

        for (spec, field) in record.ref_fields() {
            for serial in field.serials() {
                let found = spec
                    .targets
                    .iter()
                    .any(|&target| index.find(target, serial).is_some());
                if !found {
                    errors.push(VerifyError::DanglingReference {
                        kind,
                        source_serial: record.serial().clone(),
                        field: spec.name,
                        serial: serial.clone(),
                    });
                }
            }
        }
    }

    VerifyResult { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::{Antenna, Header, Location};
    use crate::core::types::Classification;

    fn serial(text: &str) -> Serial {
        Serial::parse(text).unwrap()
    }

    fn named_location(text: &str) -> Location {
        let mut location = Location::new(Header::new(serial(text), Classification::Unclassified));
        location.name = Some("site".into());
        location
    }

    #[test]
    fn empty_document_passes() {
        let result = verify(&Document::new());
        assert!(result.is_ok());
        assert_eq!(result.summary().total(), 0);
    }

    #[test]
    fn consistent_document_passes() {
        let mut doc = Document::new();
        doc.insert(named_location("USA::LO:1"));
        let mut antenna = Antenna::new(Header::new(serial("USA::AT:1"), Classification::Secret));
        antenna.location.push_serial(serial("USA::LO:1"));
        doc.insert(antenna);

        assert!(verify(&doc).is_ok());
    }

    #[test]
    fn reports_each_problem() {
        let mut doc = Document::new();
        doc.insert(named_location("USA::LO:1"));
        doc.insert(named_location("USA::LO:1"));
        doc.insert(Location::new(Header::bare(serial("USA::AT:2"))));
        let mut antenna = Antenna::new(Header::new(serial("USA::AT:1"), Classification::Secret));
        antenna.location.push_serial(serial("USA::LO:9"));
        doc.insert(antenna);

        let result = verify(&doc);
        assert!(!result.is_ok());
        assert_eq!(
            result.summary(),
            VerifySummary {
                duplicates: 1,
                dangling: 1,
                incomplete: 1,
                mismatched: 1,
            }
        );
        assert_eq!(
            result.errors,
            vec![
                VerifyError::DuplicateSerial {
                    kind: RecordKind::Location,
                    serial: serial("USA::LO:1"),
                },
                VerifyError::DatasetTypeMismatch {
                    kind: RecordKind::Location,
                    serial: serial("USA::AT:2"),
                },
                VerifyError::Incomplete {
                    kind: RecordKind::Location,
                    serial: serial("USA::AT:2"),
                },
                VerifyError::DanglingReference {
                    kind: RecordKind::Antenna,
                    source_serial: serial("USA::AT:1"),
                    field: "location",
                    serial: serial("USA::LO:9"),
                },
            ]
        );
    }

    #[test]
    fn summary_renders_counts() {
        let summary = VerifySummary {
            duplicates: 2,
            dangling: 0,
            incomplete: 3,
            mismatched: 1,
        };
        assert_eq!(summary.total(), 6);
        assert_eq!(
            summary.to_string(),
            "2 duplicate, 0 dangling, 3 incomplete, 1 mismatched"
        );
    }

    #[test]
    fn mismatch_message_names_both_codes() {
        let err = VerifyError::DatasetTypeMismatch {
            kind: RecordKind::Location,
            serial: serial("USA::AT:2"),
        };
        let message = err.to_string();
        assert!(message.contains("'AT'"));
        assert!(message.contains("'LO'"));
    }
}
