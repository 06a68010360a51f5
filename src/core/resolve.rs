//! core::resolve
//!
//! Turns serial-valued reference fields into record handles.
//!
//! # Algorithm
//!
//! For each serial in a reference field, the candidate kinds declared by the
//! field's [`RefSpec`] are searched in order; the first collection holding
//! the serial wins. The serial's dataset type segment is not consulted.
//! Serials that match nothing are left out of the resolved view and listed
//! in the [`ResolutionReport`].
//!
//! # Two phases
//!
//! [`Resolver::plan`] reads a record and a [`RecordLookup`] and produces a
//! [`RecordResolution`]; [`RecordResolution::apply`] replaces the record's
//! resolved views with it. Because apply replaces rather than appends,
//! resolving a record twice yields the same result as resolving it once.
//!
//! # Example
//!
//! ```
//! use smdx::core::dataset::{Antenna, Header, Location, Record};
//! use smdx::core::document::Document;
//! use smdx::core::resolve::{Resolver, SerialIndex};
//! use smdx::core::types::Serial;
//!
//! let site = Serial::parse("USA::LO:1").unwrap();
//! let mut doc = Document::new();
//! doc.insert(Location::new(Header::bare(site.clone())));
//!
//! let mut antenna = Antenna::new(Header::bare(Serial::parse("USA::AT:1").unwrap()));
//! antenna.location.push_serial(site);
//! let mut record = Record::from(antenna);
//!
//! let index = SerialIndex::build(&doc);
//! let report = Resolver::new(&index).resolve(&mut record);
//! assert_eq!(report.resolved, 1);
//! assert_eq!(record.ref_field("location").unwrap().resolved().len(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dataset::{Record, RecordKind, RefField, RefSpec};
use crate::core::document::{Document, RecordLookup, RecordRef};
use crate::core::types::Serial;

/// Errors from bulk resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{count} reference(s) could not be resolved, first: {first}")]
    Unresolved {
        count: usize,
        first: UnresolvedRef,
        all: Vec<UnresolvedRef>,
    },
}

impl ResolveError {
    /// Build an `Unresolved` error from a non-empty list.
    pub(crate) fn unresolved(all: Vec<UnresolvedRef>) -> Self {
        let first = all[0].clone();
        ResolveError::Unresolved {
            count: all.len(),
            first,
            all,
        }
    }
}

/// What to do with serials that name no record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Drop silently
    Ignore,
    /// Drop and log a warning per serial
    #[default]
    Warn,
    /// Fail the whole pass
    Error,
}

/// How the resolver searches collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStrategy {
    /// Hash index built once per pass
    #[default]
    Indexed,
    /// Linear scan of each candidate collection
    Scan,
}

/// Runtime settings for [`Document::resolve_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub on_unresolved: UnresolvedPolicy,
    pub lookup: LookupStrategy,
    /// Also search the remaining candidate kinds to detect ambiguous matches
    pub report_ambiguous: bool,
}

/// A serial that matched no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    /// Kind of the record holding the field
    pub source_kind: RecordKind,
    /// Serial of the record holding the field
    pub source: Serial,
    /// Field name
    pub field: &'static str,
    /// The serial that matched nothing
    pub serial: Serial,
}

impl fmt::Display for UnresolvedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} field '{}' -> {}",
            self.source_kind, self.source, self.field, self.serial
        )
    }
}

/// A polymorphic serial found in more than one candidate collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousRef {
    pub source_kind: RecordKind,
    pub source: Serial,
    pub field: &'static str,
    pub serial: Serial,
    /// The kind resolution picked
    pub chosen: RecordKind,
    /// Other candidate kinds that also hold the serial
    pub also: Vec<RecordKind>,
}

impl fmt::Display for AmbiguousRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let also: Vec<&str> = self.also.iter().map(|k| k.name()).collect();
        write!(
            f,
            "{} {} field '{}' -> {} resolved to {}, also in {}",
            self.source_kind,
            self.source,
            self.field,
            self.serial,
            self.chosen,
            also.join(", ")
        )
    }
}

/// Summary of one or more resolutions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Records visited
    pub records: usize,
    /// Serials turned into handles
    pub resolved: usize,
    /// Serials that matched nothing
    pub unresolved: Vec<UnresolvedRef>,
    /// Polymorphic serials with more than one match (only when requested)
    pub ambiguous: Vec<AmbiguousRef>,
}

impl ResolutionReport {
    /// Check if every serial resolved.
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub(crate) fn absorb(&mut self, plan: &RecordResolution) {
        self.records += 1;
        self.resolved += plan.fields.iter().map(Vec::len).sum::<usize>();
        self.unresolved.extend(plan.unresolved.iter().cloned());
        self.ambiguous.extend(plan.ambiguous.iter().cloned());
    }
}

/// The planned resolved views for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResolution {
    kind: RecordKind,
    fields: Vec<Vec<RecordRef>>,
    unresolved: Vec<UnresolvedRef>,
    ambiguous: Vec<AmbiguousRef>,
}

impl RecordResolution {
    /// Planned handles per reference field, in field declaration order.
    pub fn fields(&self) -> &[Vec<RecordRef>] {
        &self.fields
    }

    /// Serials that matched nothing.
    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    /// Replace the record's resolved views with the planned ones.
    ///
    /// The record must be the one (or a copy of the one) that was planned.
    pub fn apply(self, record: &mut Record) {
        debug_assert_eq!(record.kind(), self.kind, "resolution applied to another kind");
        for ((_, field), resolved) in record.ref_fields_mut().into_iter().zip(self.fields) {
            field.set_resolved(resolved);
        }
    }
}

/// Resolves reference fields against a read-only lookup.
pub struct Resolver<'a, L: RecordLookup + ?Sized> {
    lookup: &'a L,
    report_ambiguous: bool,
}

impl<'a, L: RecordLookup + ?Sized> Resolver<'a, L> {
    /// Create a resolver over `lookup`.
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            report_ambiguous: false,
        }
    }

    /// Search every candidate kind so ambiguous matches are reported.
    pub fn report_ambiguous(mut self, enabled: bool) -> Self {
        self.report_ambiguous = enabled;
        self
    }

    /// Plan the resolved views for one record without mutating it.
    pub fn plan(&self, record: &Record) -> RecordResolution {
        let mut plan = RecordResolution {
            kind: record.kind(),
            fields: Vec::new(),
            unresolved: Vec::new(),
            ambiguous: Vec::new(),
        };
        for (spec, field) in record.ref_fields() {
            let resolved = self.resolve_field(record, spec, field, &mut plan);
            plan.fields.push(resolved);
        }
        plan
    }

    /// Plan and apply in one step.
    pub fn resolve(&self, record: &mut Record) -> ResolutionReport {
        let plan = self.plan(record);
        let mut report = ResolutionReport::default();
        report.absorb(&plan);
        plan.apply(record);
        report
    }

    fn resolve_field(
        &self,
        record: &Record,
        spec: &'static RefSpec,
        field: &RefField,
        plan: &mut RecordResolution,
    ) -> Vec<RecordRef> {
        let mut resolved = Vec::with_capacity(field.serials().len());
        for serial in field.serials() {
            let mut hits = spec
                .targets
                .iter()
                .filter_map(|&kind| self.lookup.find(kind, serial));

            let Some(first) = hits.next() else {
                plan.unresolved.push(UnresolvedRef {
                    source_kind: record.kind(),
                    source: record.serial().clone(),
                    field: spec.name,
                    serial: serial.clone(),
                });
                continue;
            };
            resolved.push(first);

            if self.report_ambiguous {
                let also: Vec<RecordKind> = hits.map(|hit| hit.kind()).collect();
                if !also.is_empty() {
                    plan.ambiguous.push(AmbiguousRef {
                        source_kind: record.kind(),
                        source: record.serial().clone(),
                        field: spec.name,
                        serial: serial.clone(),
                        chosen: first.kind(),
                        also,
                    });
                }
            }
        }
        resolved
    }
}

/// A `(kind, serial) -> position` index over a document.
///
/// Built once per pass so each lookup is a hash probe instead of a scan.
/// Duplicate serials within a collection resolve to the first occurrence,
/// matching [`Document`]'s own linear lookup.
#[derive(Debug, Clone, Default)]
pub struct SerialIndex {
    positions: HashMap<RecordKind, HashMap<Serial, usize>>,
    serials: BTreeMap<RecordKind, Vec<Serial>>,
}

impl SerialIndex {
    /// Index every collection of `document`.
    pub fn build(document: &Document) -> Self {
        let mut index = Self::default();
        for kind in RecordKind::ALL {
            let records = document.get_collection(kind);
            if records.is_empty() {
                continue;
            }
            let positions = index.positions.entry(kind).or_default();
            let serials = index.serials.entry(kind).or_default();
            for (position, record) in records.iter().enumerate() {
                positions.entry(record.serial().clone()).or_insert(position);
                serials.push(record.serial().clone());
            }
        }
        index
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.serials.values().map(Vec::len).sum()
    }

    /// Check if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordLookup for SerialIndex {
    fn find(&self, kind: RecordKind, serial: &Serial) -> Option<RecordRef> {
        self.positions
            .get(&kind)?
            .get(serial)
            .map(|&position| RecordRef::new(kind, position))
    }

    fn serial_of(&self, target: RecordRef) -> Option<&Serial> {
        self.serials.get(&target.kind())?.get(target.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::{Allotment, Antenna, Assignment, Header, Jrfl, Location};

    fn serial(text: &str) -> Serial {
        Serial::parse(text).unwrap()
    }

    fn jrfl_pointing_at(serials: &[&str]) -> Record {
        let mut jrfl = Jrfl::new(Header::bare(serial("USA::JR:1")));
        for s in serials {
            jrfl.frequency.push_serial(serial(s));
        }
        jrfl.into()
    }

    #[test]
    fn monomorphic_field_resolves_and_drops_missing() {
        let mut doc = Document::new();
        let site = doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));

        let mut antenna = Antenna::new(Header::bare(serial("USA::AT:1")));
        antenna.location.push_serial(serial("USA::LO:1"));
        antenna.location.push_serial(serial("USA::LO:404"));
        let mut record = Record::from(antenna);

        let report = Resolver::new(&doc).resolve(&mut record);

        assert_eq!(report.resolved, 1);
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].serial, serial("USA::LO:404"));
        assert_eq!(report.unresolved[0].field, "location");
        assert_eq!(record.ref_field("location").unwrap().resolved(), &[site]);
        // The serial view is untouched
        assert_eq!(record.ref_field("location").unwrap().serials().len(), 2);
    }

    #[test]
    fn polymorphic_falls_through_to_later_kind() {
        let mut doc = Document::new();
        let allotment = doc.insert(Allotment::new(Header::bare(serial("USA::AL:7"))));

        let mut record = jrfl_pointing_at(&["USA::AL:7"]);
        Resolver::new(&doc).resolve(&mut record);

        assert_eq!(record.ref_field("frequency").unwrap().resolved(), &[allotment]);
    }

    #[test]
    fn polymorphic_first_declared_kind_wins() {
        let mut doc = Document::new();
        let shared = serial("USA::XX:7");
        let assignment = doc.insert(Assignment::new(Header::bare(shared.clone())));
        doc.insert(Allotment::new(Header::bare(shared)));

        let mut record = jrfl_pointing_at(&["USA::XX:7"]);
        let report = Resolver::new(&doc)
            .report_ambiguous(true)
            .resolve(&mut record);

        assert_eq!(
            record.ref_field("frequency").unwrap().resolved(),
            &[assignment]
        );
        assert_eq!(report.ambiguous.len(), 1);
        assert_eq!(report.ambiguous[0].chosen, RecordKind::Assignment);
        assert_eq!(report.ambiguous[0].also, vec![RecordKind::Allotment]);
    }

    #[test]
    fn ambiguity_not_reported_by_default() {
        let mut doc = Document::new();
        doc.insert(Assignment::new(Header::bare(serial("USA::XX:7"))));
        doc.insert(Allotment::new(Header::bare(serial("USA::XX:7"))));

        let mut record = jrfl_pointing_at(&["USA::XX:7"]);
        let report = Resolver::new(&doc).resolve(&mut record);
        assert!(report.ambiguous.is_empty());
    }

    #[test]
    fn dataset_type_segment_is_not_checked() {
        let mut doc = Document::new();
        // An allotment whose serial claims to be a location
        let odd = doc.insert(Allotment::new(Header::bare(serial("USA::LO:1"))));

        let mut record = jrfl_pointing_at(&["USA::LO:1"]);
        Resolver::new(&doc).resolve(&mut record);
        assert_eq!(record.ref_field("frequency").unwrap().resolved(), &[odd]);
    }

    #[test]
    fn resolving_twice_does_not_duplicate() {
        let mut doc = Document::new();
        doc.insert(Assignment::new(Header::bare(serial("USA::AS:1"))));

        let mut record = jrfl_pointing_at(&["USA::AS:1"]);
        let resolver = Resolver::new(&doc);
        resolver.resolve(&mut record);
        let once = record.ref_field("frequency").unwrap().resolved().to_vec();
        resolver.resolve(&mut record);
        let twice = record.ref_field("frequency").unwrap().resolved().to_vec();

        assert_eq!(once.len(), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn index_agrees_with_scan() {
        let mut doc = Document::new();
        doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));
        doc.insert(Location::new(Header::bare(serial("USA::LO:2"))));
        doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));
        doc.insert(Assignment::new(Header::bare(serial("USA::AS:1"))));

        assert!(SerialIndex::build(&Document::new()).is_empty());

        let index = SerialIndex::build(&doc);
        assert!(!index.is_empty());
        assert_eq!(index.len(), 4);
        for (handle, record) in doc.iter() {
            let s = record.serial();
            assert_eq!(index.find(handle.kind(), s), doc.find(handle.kind(), s));
            assert_eq!(index.serial_of(handle), doc.serial_of(handle));
        }
        assert!(index
            .find(RecordKind::Antenna, &serial("USA::LO:1"))
            .is_none());
    }

    #[test]
    fn plan_does_not_mutate() {
        let mut doc = Document::new();
        doc.insert(Assignment::new(Header::bare(serial("USA::AS:1"))));

        let record = jrfl_pointing_at(&["USA::AS:1"]);
        let plan = Resolver::new(&doc).plan(&record);
        assert_eq!(plan.fields().len(), 1);
        assert_eq!(plan.fields()[0].len(), 1);
        assert!(record.ref_field("frequency").unwrap().resolved().is_empty());
    }

    #[test]
    fn unresolved_error_carries_first() {
        let missing = UnresolvedRef {
            source_kind: RecordKind::Jrfl,
            source: serial("USA::JR:1"),
            field: "frequency",
            serial: serial("USA::AS:9"),
        };
        let err = ResolveError::unresolved(vec![missing.clone()]);
        let ResolveError::Unresolved { count, first, .. } = &err;
        assert_eq!(*count, 1);
        assert_eq!(first, &missing);
        assert!(err.to_string().contains("USA::AS:9"));
    }
}
