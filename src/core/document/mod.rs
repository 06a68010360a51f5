//! core::document
//!
//! The document container and record handles.
//!
//! # Architecture
//!
//! A [`Document`] owns one ordered collection per [`RecordKind`]. Records
//! point at each other through [`RecordRef`] handles (kind + position) held
//! in the resolved view of their reference fields.
//!
//! # Lifecycle
//!
//! - **Flat**: only serial views are populated (as produced by a codec)
//! - **Linked**: after [`Document::resolve_all`], resolved views are populated
//! - **Prepared**: after [`Document::prepare_all`], serial views mirror the
//!   (possibly edited) resolved views and can be serialized
//!
//! The document does not track which state it is in.
//!
//! # Invariants
//!
//! - Collections are append-only; a handle stays valid for the document's
//!   lifetime. [`Document::normalize`] reorders collections and rewrites
//!   every live handle to match.
//! - Serials are expected to be unique within one kind's collection. This is
//!   not enforced on insert; see [`crate::core::verify`].

pub mod schema;

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::core::dataset::{DatasetKind, Record, RecordKind, RefField};
use crate::core::prepare::Preparer;
use crate::core::resolve::{
    LookupStrategy, RecordResolution, ResolutionReport, ResolveError, ResolveOptions, Resolver,
    SerialIndex, UnresolvedPolicy,
};
use crate::core::types::Serial;

/// A handle to one record in a [`Document`].
///
/// Handles are only created by the document and the resolver, so each one
/// names a record that exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordRef {
    kind: RecordKind,
    position: usize,
}

impl RecordRef {
    pub(crate) fn new(kind: RecordKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Kind of the referenced record.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Position within the kind's collection.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Read-only lookup over a populated document.
///
/// The resolver and preparer only see a document through this trait.
pub trait RecordLookup {
    /// Find the record of `kind` whose serial is `serial`.
    ///
    /// When a collection holds the serial more than once, the first
    /// occurrence in insertion order wins.
    fn find(&self, kind: RecordKind, serial: &Serial) -> Option<RecordRef>;

    /// The serial of the record behind `target`.
    fn serial_of(&self, target: RecordRef) -> Option<&Serial>;
}

/// A set of record collections processed together.
#[derive(Debug, Clone, Default)]
pub struct Document {
    collections: BTreeMap<RecordKind, Vec<Record>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to its kind's collection.
    ///
    /// The caller is responsible for keeping serials unique per kind.
    pub fn insert(&mut self, record: impl Into<Record>) -> RecordRef {
        let record = record.into();
        let kind = record.kind();
        let collection = self.collections.entry(kind).or_default();
        collection.push(record);
        RecordRef::new(kind, collection.len() - 1)
    }

    /// The collection for one kind, in insertion order.
    pub fn get_collection(&self, kind: RecordKind) -> &[Record] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Get the record behind a handle.
    pub fn get(&self, target: RecordRef) -> Option<&Record> {
        self.collections.get(&target.kind)?.get(target.position)
    }

    /// Get the record behind a handle, mutably.
    pub fn get_mut(&mut self, target: RecordRef) -> Option<&mut Record> {
        self.collections
            .get_mut(&target.kind)?
            .get_mut(target.position)
    }

    /// Get the concrete record behind a handle.
    pub fn get_as<T: DatasetKind>(&self, target: RecordRef) -> Option<&T> {
        self.get(target).and_then(T::from_record)
    }

    /// Get the concrete record behind a handle, mutably.
    pub fn get_as_mut<T: DatasetKind>(&mut self, target: RecordRef) -> Option<&mut T> {
        self.get_mut(target).and_then(T::from_record_mut)
    }

    /// Iterate the concrete records of one type.
    ///
    /// # Example
    ///
    /// ```
    /// use smdx::core::dataset::{Header, Location};
    /// use smdx::core::document::Document;
    /// use smdx::core::types::Serial;
    ///
    /// let mut doc = Document::new();
    /// doc.insert(Location::new(Header::bare(Serial::parse("USA::LO:1").unwrap())));
    /// assert_eq!(doc.records_of::<Location>().count(), 1);
    /// ```
    pub fn records_of<'a, T: DatasetKind + 'a>(&'a self) -> impl Iterator<Item = &'a T> {
        self.get_collection(T::KIND).iter().filter_map(T::from_record)
    }

    /// Iterate every record with its handle.
    ///
    /// Order is collection declaration order, then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordRef, &Record)> {
        self.collections.iter().flat_map(|(kind, records)| {
            records
                .iter()
                .enumerate()
                .map(move |(position, record)| (RecordRef::new(*kind, position), record))
        })
    }

    /// Total number of records across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Check if the document holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Follow a reference field's resolved view to its target records.
    pub fn follow<'a>(&'a self, field: &'a RefField) -> impl Iterator<Item = &'a Record> + 'a {
        field.resolved().iter().filter_map(move |r| self.get(*r))
    }

    /// Handles of the records whose resolved views point at `target`.
    ///
    /// A record referring to `target` several times is listed once.
    pub fn referrers(&self, target: RecordRef) -> Vec<RecordRef> {
        self.iter()
            .filter(|(_, record)| {
                record
                    .ref_fields()
                    .iter()
                    .any(|(_, field)| field.resolved().contains(&target))
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Resolve every record's reference fields against this document.
    ///
    /// Resolution is planned against a read-only view and only then
    /// applied, so every record is updated or none is. Calling this more
    /// than once replaces resolved views rather than appending to them.
    ///
    /// # Errors
    ///
    /// With [`UnresolvedPolicy::Error`], returns [`ResolveError::Unresolved`]
    /// if any serial names no record; the document is left untouched.
    pub fn resolve_all(
        &mut self,
        options: &ResolveOptions,
    ) -> Result<ResolutionReport, ResolveError> {
        let plans = match options.lookup {
            LookupStrategy::Indexed => {
                let index = SerialIndex::build(&*self);
                self.plan_resolution(&Resolver::new(&index).report_ambiguous(options.report_ambiguous))
            }
            LookupStrategy::Scan => {
                self.plan_resolution(&Resolver::new(&*self).report_ambiguous(options.report_ambiguous))
            }
        };

        let mut report = ResolutionReport::default();
        for (_, plan) in &plans {
            report.absorb(plan);
        }

        match options.on_unresolved {
            UnresolvedPolicy::Error if !report.unresolved.is_empty() => {
                return Err(ResolveError::unresolved(report.unresolved));
            }
            UnresolvedPolicy::Warn => {
                for missing in &report.unresolved {
                    warn!("unresolved reference: {}", missing);
                }
            }
            _ => {}
        }
        for ambiguous in &report.ambiguous {
            debug!("ambiguous reference: {}", ambiguous);
        }

        for (handle, plan) in plans {
            if let Some(record) = self.get_mut(handle) {
                plan.apply(record);
            }
        }

        debug!(
            records = report.records,
            resolved = report.resolved,
            unresolved = report.unresolved.len(),
            "resolved document"
        );
        Ok(report)
    }

    fn plan_resolution<L: RecordLookup + ?Sized>(
        &self,
        resolver: &Resolver<'_, L>,
    ) -> Vec<(RecordRef, RecordResolution)> {
        self.iter()
            .map(|(handle, record)| (handle, resolver.plan(record)))
            .collect()
    }

    /// Regenerate every record's serial views from its resolved views.
    ///
    /// Must run before the document is handed to a codec if resolved views
    /// were edited. Records that were never resolved end up with empty
    /// serial views. Returns the number of serials written.
    pub fn prepare_all(&mut self) -> usize {
        let preparer = Preparer::new(&*self);
        let plans: Vec<_> = self
            .iter()
            .map(|(handle, record)| (handle, preparer.project(record)))
            .collect();

        let mut written = 0;
        for (handle, plan) in plans {
            written += plan.len();
            if let Some(record) = self.get_mut(handle) {
                plan.apply(record);
            }
        }

        debug!(serials = written, "prepared document");
        written
    }

    /// Sort every collection and drop duplicate records.
    ///
    /// Collections are sorted by the record ordering (most recent first,
    /// then by serial). Of several records sharing a kind and serial the
    /// first after sorting is kept. Every resolved handle is rewritten to
    /// the new positions; handles to a dropped duplicate move to the kept
    /// record. Returns the number of records dropped.
    pub fn normalize(&mut self) -> usize {
        let mut moves: HashMap<RecordKind, Vec<usize>> = HashMap::new();
        let mut dropped = 0;

        for (kind, records) in self.collections.iter_mut() {
            let mut indexed: Vec<(usize, Record)> =
                std::mem::take(records).into_iter().enumerate().collect();
            indexed.sort_by(|a, b| a.1.compare(&b.1));

            let mut new_positions = vec![0; indexed.len()];
            let mut seen: HashMap<Serial, usize> = HashMap::new();
            for (old, record) in indexed {
                if let Some(&kept) = seen.get(record.serial()) {
                    new_positions[old] = kept;
                    dropped += 1;
                    continue;
                }
                seen.insert(record.serial().clone(), records.len());
                new_positions[old] = records.len();
                records.push(record);
            }
            moves.insert(*kind, new_positions);
        }

        for records in self.collections.values_mut() {
            for record in records.iter_mut() {
                for (_, field) in record.ref_fields_mut() {
                    for target in field.resolved_mut() {
                        if let Some(&position) = moves
                            .get(&target.kind)
                            .and_then(|positions| positions.get(target.position))
                        {
                            target.position = position;
                        }
                    }
                }
            }
        }

        if dropped > 0 {
            debug!(dropped, "dropped duplicate records");
        }
        dropped
    }

    /// Clear every record's resolved views.
    pub fn clear_resolved(&mut self) {
        for records in self.collections.values_mut() {
            for record in records.iter_mut() {
                record.clear_resolved();
            }
        }
    }

    /// Kinds that hold at least one record, in collection order.
    pub fn kinds(&self) -> Vec<RecordKind> {
        self.collections
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Serials that occur more than once within their kind's collection.
    pub fn duplicate_serials(&self) -> Vec<(RecordKind, Serial)> {
        let mut duplicates = Vec::new();
        for (kind, records) in &self.collections {
            let mut seen = HashSet::new();
            for record in records {
                if !seen.insert(record.serial())
                    && !duplicates.contains(&(*kind, record.serial().clone()))
                {
                    duplicates.push((*kind, record.serial().clone()));
                }
            }
        }
        duplicates
    }
}

impl RecordLookup for Document {
    fn find(&self, kind: RecordKind, serial: &Serial) -> Option<RecordRef> {
        self.get_collection(kind)
            .iter()
            .position(|record| record.serial() == serial)
            .map(|position| RecordRef::new(kind, position))
    }

    fn serial_of(&self, target: RecordRef) -> Option<&Serial> {
        self.get(target).map(Record::serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::{Antenna, Header, Location, Transmitter};
    use crate::core::types::{Classification, UtcTimestamp};

    fn serial(text: &str) -> Serial {
        Serial::parse(text).unwrap()
    }

    fn header(text: &str, at: &str) -> Header {
        Header::new(serial(text), Classification::Unclassified)
            .with_entry_timestamp(UtcTimestamp::parse(at).unwrap())
    }

    #[test]
    fn empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc.get_collection(RecordKind::Location).is_empty());
        assert!(doc.kinds().is_empty());
    }

    #[test]
    fn insert_returns_stable_handles() {
        let mut doc = Document::new();
        let a = doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));
        let b = doc.insert(Location::new(Header::bare(serial("USA::LO:2"))));
        let t = doc.insert(Transmitter::new(Header::bare(serial("USA::TX:1"))));

        assert_eq!(a.position(), 0);
        assert_eq!(b.position(), 1);
        assert_eq!(t.position(), 0);
        assert_eq!(t.kind(), RecordKind::Transmitter);
        assert_eq!(doc.get(b).unwrap().serial(), &serial("USA::LO:2"));
        assert!(doc.get_as::<Location>(t).is_none());
        assert!(doc.get_as::<Transmitter>(t).is_some());
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn iteration_follows_declaration_then_insertion_order() {
        let mut doc = Document::new();
        doc.insert(Transmitter::new(Header::bare(serial("USA::TX:1"))));
        doc.insert(Location::new(Header::bare(serial("USA::LO:2"))));
        doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));

        let serials: Vec<String> = doc.iter().map(|(_, r)| r.serial().to_text()).collect();
        assert_eq!(serials, ["USA::LO:2", "USA::LO:1", "USA::TX:1"]);
    }

    #[test]
    fn linear_find_prefers_first_occurrence() {
        let mut doc = Document::new();
        doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));
        doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));

        let found = doc.find(RecordKind::Location, &serial("USA::LO:1")).unwrap();
        assert_eq!(found.position(), 0);
        assert!(doc.find(RecordKind::Antenna, &serial("USA::LO:1")).is_none());
        assert_eq!(
            doc.duplicate_serials(),
            vec![(RecordKind::Location, serial("USA::LO:1"))]
        );
    }

    #[test]
    fn referrers_lists_each_source_once() {
        let mut doc = Document::new();
        let site = doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));
        let mut antenna = Antenna::new(Header::bare(serial("USA::AT:1")));
        antenna.location.attach(site);
        antenna.location.attach(site);
        let antenna = doc.insert(antenna);

        assert_eq!(doc.referrers(site), vec![antenna]);
        assert!(doc.referrers(antenna).is_empty());
    }

    #[test]
    fn normalize_sorts_dedups_and_rewrites_handles() {
        let mut doc = Document::new();
        let old = doc.insert(Location::new(header("USA::LO:1", "2020-01-01T00:00:00Z")));
        let newer = doc.insert(Location::new(header("USA::LO:2", "2022-01-01T00:00:00Z")));
        let dup = doc.insert(Location::new(header("USA::LO:1", "2021-01-01T00:00:00Z")));

        let mut antenna = Antenna::new(header("USA::AT:1", "2020-01-01T00:00:00Z"));
        antenna.location.attach(old);
        antenna.location.attach(newer);
        antenna.location.attach(dup);
        let antenna = doc.insert(antenna);

        assert_eq!(doc.normalize(), 1);

        let serials: Vec<String> = doc
            .get_collection(RecordKind::Location)
            .iter()
            .map(|r| r.serial().to_text())
            .collect();
        assert_eq!(serials, ["USA::LO:2", "USA::LO:1"]);

        // The kept USA::LO:1 is the 2021 entry
        let kept = &doc.get_collection(RecordKind::Location)[1];
        assert_eq!(
            kept.header().entry_timestamp,
            Some(UtcTimestamp::parse("2021-01-01T00:00:00Z").unwrap())
        );

        let antenna = doc.get_as::<Antenna>(antenna).unwrap();
        let targets: Vec<String> = doc
            .follow(&antenna.location)
            .map(|r| r.serial().to_text())
            .collect();
        assert_eq!(targets, ["USA::LO:1", "USA::LO:2", "USA::LO:1"]);
    }
}
