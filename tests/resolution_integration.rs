//! Integration tests for the document lifecycle.
//!
//! These tests drive documents through parse -> resolve -> edit ->
//! prepare -> render, using the JSON schema as the codec.

use smdx::core::config::Config;
use smdx::core::dataset::{
    Allotment, Antenna, Assignment, Header, Jrfl, Location, RecordKind, SsReply, Transmitter,
};
use smdx::core::document::schema::{parse_document, render_document};
use smdx::core::document::{Document, RecordLookup};
use smdx::core::resolve::{LookupStrategy, ResolveError, ResolveOptions, UnresolvedPolicy};
use smdx::core::types::{Classification, Serial, UtcTimestamp};
use smdx::core::verify::{verify, VerifySummary};

// =============================================================================
// Test Helpers
// =============================================================================

fn serial(text: &str) -> Serial {
    Serial::parse(text).unwrap()
}

const FIXTURE: &str = r#"{
    "kind": "smdx.document",
    "schema_version": 1,
    "location": [
        { "header": { "serial": "USA::LO:1", "entry_timestamp": "2020-01-01T00:00:00Z", "classification": "U" }, "name": "Hill" },
        { "header": { "serial": "USA::LO:2", "entry_timestamp": "2021-01-01T00:00:00Z", "classification": "U" }, "name": "Ridge" }
    ],
    "antenna": [
        { "header": { "serial": "USA::AT:1" }, "location": ["USA::LO:1"] }
    ],
    "transmitter": [
        { "header": { "serial": "USA::TX:1" }, "location": ["USA::LO:2"], "antenna": ["USA::AT:1"] }
    ],
    "assignment": [
        {
            "header": { "serial": "USA::AS:1" },
            "transmitter": ["USA::TX:1"],
            "related": ["USA::AL:1", "USA::AS:2"]
        },
        { "header": { "serial": "USA::AS:2" } }
    ],
    "allotment": [
        { "header": { "serial": "USA::AL:1" }, "location": ["USA::LO:1", "USA::LO:2"] }
    ]
}"#;

fn strict() -> ResolveOptions {
    ResolveOptions {
        on_unresolved: UnresolvedPolicy::Error,
        ..ResolveOptions::default()
    }
}

fn find_assignment<'a>(doc: &'a Document, text: &str) -> &'a Assignment {
    let target = serial(text);
    doc.records_of::<Assignment>()
        .find(|a| a.header.serial == target)
        .unwrap()
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn parse_resolve_navigate() {
    let mut doc = parse_document(FIXTURE).unwrap();
    let report = doc.resolve_all(&strict()).unwrap();

    assert_eq!(report.records, doc.len());
    assert_eq!(report.resolved, 8);
    assert!(report.is_clean());

    let assignment = find_assignment(&doc, "USA::AS:1");
    let related: Vec<(RecordKind, String)> = doc
        .follow(&assignment.related)
        .map(|r| (r.kind(), r.serial().to_text()))
        .collect();
    assert_eq!(
        related,
        [
            (RecordKind::Allotment, "USA::AL:1".to_string()),
            (RecordKind::Assignment, "USA::AS:2".to_string()),
        ]
    );

    // Two hops: assignment -> transmitter -> antenna -> location
    let tx = doc.follow(&assignment.transmitter).next().unwrap();
    let antenna = doc.follow(tx.ref_field("antenna").unwrap()).next().unwrap();
    let site = doc.follow(antenna.ref_field("location").unwrap()).next().unwrap();
    assert_eq!(site.serial(), &serial("USA::LO:1"));
}

#[test]
fn edit_prepare_render_roundtrip() {
    let mut doc = parse_document(FIXTURE).unwrap();
    doc.resolve_all(&strict()).unwrap();

    // Re-point the antenna at the second location
    let ridge = doc.find(RecordKind::Location, &serial("USA::LO:2")).unwrap();
    let hill = doc.find(RecordKind::Location, &serial("USA::LO:1")).unwrap();
    let antenna = doc.find(RecordKind::Antenna, &serial("USA::AT:1")).unwrap();
    {
        let antenna = doc.get_as_mut::<Antenna>(antenna).unwrap();
        assert!(antenna.location.detach(hill));
        antenna.location.attach(ridge);
    }

    // Add a new transmitter built in code
    let mut tx = Transmitter::new(Header::new(serial("USA::TX:2"), Classification::Secret));
    tx.antenna.attach(antenna);
    doc.insert(tx);

    doc.prepare_all();
    let rendered = render_document(&doc).unwrap();

    let mut reparsed = parse_document(&rendered).unwrap();
    reparsed.resolve_all(&strict()).unwrap();

    let antenna = reparsed.records_of::<Antenna>().next().unwrap();
    assert_eq!(antenna.location.serials(), &[serial("USA::LO:2")]);

    let tx2 = reparsed
        .records_of::<Transmitter>()
        .find(|t| t.header.serial == serial("USA::TX:2"))
        .unwrap();
    assert_eq!(tx2.antenna.serials(), &[serial("USA::AT:1")]);
    assert_eq!(tx2.antenna.resolved().len(), 1);
}

#[test]
fn unedited_document_renders_identically_after_prepare() {
    let mut doc = parse_document(FIXTURE).unwrap();
    let before = render_document(&doc).unwrap();

    doc.resolve_all(&strict()).unwrap();
    doc.prepare_all();

    assert_eq!(render_document(&doc).unwrap(), before);
}

#[test]
fn prepare_without_resolve_empties_serial_views() {
    let mut doc = parse_document(FIXTURE).unwrap();
    doc.prepare_all();
    assert!(find_assignment(&doc, "USA::AS:1").related.serials().is_empty());
}

// =============================================================================
// Unresolved references
// =============================================================================

fn dangling_document() -> Document {
    let mut doc = Document::new();
    doc.insert(Location::new(Header::bare(serial("USA::LO:1"))));
    let mut antenna = Antenna::new(Header::bare(serial("USA::AT:1")));
    antenna.location.push_serial(serial("USA::LO:1"));
    antenna.location.push_serial(serial("USA::LO:404"));
    doc.insert(antenna);
    doc
}

#[test]
fn unresolved_serial_dropped_and_reported() {
    let mut doc = dangling_document();
    let report = doc.resolve_all(&ResolveOptions::default()).unwrap();

    assert_eq!(report.resolved, 1);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].serial, serial("USA::LO:404"));
    assert_eq!(report.unresolved[0].source, serial("USA::AT:1"));

    let antenna = doc.records_of::<Antenna>().next().unwrap();
    assert_eq!(antenna.location.resolved().len(), 1);
    assert_eq!(antenna.location.serials().len(), 2);
}

#[test]
fn ignore_policy_still_reports() {
    let mut doc = dangling_document();
    let options = ResolveOptions {
        on_unresolved: UnresolvedPolicy::Ignore,
        ..ResolveOptions::default()
    };
    let report = doc.resolve_all(&options).unwrap();
    assert_eq!(report.unresolved.len(), 1);
}

#[test]
fn error_policy_leaves_document_flat() {
    let mut doc = dangling_document();
    let err = doc.resolve_all(&strict()).unwrap_err();

    let ResolveError::Unresolved { count, first, all } = err;
    assert_eq!(count, 1);
    assert_eq!(first.serial, serial("USA::LO:404"));
    assert_eq!(all.len(), 1);

    let antenna = doc.records_of::<Antenna>().next().unwrap();
    assert!(antenna.location.resolved().is_empty());
}

#[test]
fn error_policy_keeps_previous_resolution() {
    let mut doc = dangling_document();
    doc.resolve_all(&ResolveOptions::default()).unwrap();
    assert!(doc.resolve_all(&strict()).is_err());

    let antenna = doc.records_of::<Antenna>().next().unwrap();
    assert_eq!(antenna.location.resolved().len(), 1);
}

// =============================================================================
// Polymorphic resolution
// =============================================================================

#[test]
fn polymorphic_match_in_later_kind_only() {
    let mut doc = Document::new();
    let allotment = doc.insert(Allotment::new(Header::bare(serial("USA::AL:5"))));
    let mut jrfl = Jrfl::new(Header::bare(serial("USA::JR:1")));
    jrfl.frequency.push_serial(serial("USA::AL:5"));
    doc.insert(jrfl);

    doc.resolve_all(&strict()).unwrap();
    let jrfl = doc.records_of::<Jrfl>().next().unwrap();
    assert_eq!(jrfl.frequency.resolved(), &[allotment]);
}

#[test]
fn polymorphic_first_declared_kind_wins_in_both_strategies() {
    for lookup in [LookupStrategy::Indexed, LookupStrategy::Scan] {
        let mut doc = Document::new();
        doc.insert(Allotment::new(Header::bare(serial("USA::ZZ:5"))));
        let assignment = doc.insert(Assignment::new(Header::bare(serial("USA::ZZ:5"))));
        let mut jrfl = Jrfl::new(Header::bare(serial("USA::JR:1")));
        jrfl.frequency.push_serial(serial("USA::ZZ:5"));
        doc.insert(jrfl);

        let options = ResolveOptions {
            lookup,
            report_ambiguous: true,
            ..strict()
        };
        let report = doc.resolve_all(&options).unwrap();

        let jrfl = doc.records_of::<Jrfl>().next().unwrap();
        assert_eq!(jrfl.frequency.resolved(), &[assignment], "{lookup:?}");
        assert_eq!(report.ambiguous.len(), 1);
        assert_eq!(report.ambiguous[0].chosen, RecordKind::Assignment);
    }
}

#[test]
fn scan_and_index_agree_on_fixture() {
    let mut indexed = parse_document(FIXTURE).unwrap();
    let mut scanned = indexed.clone();

    let a = indexed.resolve_all(&strict()).unwrap();
    let b = scanned
        .resolve_all(&ResolveOptions {
            lookup: LookupStrategy::Scan,
            ..strict()
        })
        .unwrap();

    assert_eq!(a, b);
    for ((_, left), (_, right)) in indexed.iter().zip(scanned.iter()) {
        for ((_, l), (_, r)) in left.ref_fields().iter().zip(right.ref_fields().iter()) {
            assert_eq!(l.resolved(), r.resolved());
        }
    }
}

// =============================================================================
// Ordering, normalization, verification, config
// =============================================================================

#[test]
fn normalize_keeps_links_intact() {
    let mut doc = parse_document(FIXTURE).unwrap();
    doc.resolve_all(&strict()).unwrap();
    assert_eq!(doc.normalize(), 0);

    // Ridge (2021) now sorts before Hill (2020)
    let locations = doc.get_collection(RecordKind::Location);
    assert_eq!(locations[0].serial(), &serial("USA::LO:2"));

    let allotment = doc.records_of::<Allotment>().next().unwrap();
    let targets: Vec<_> = doc.follow(&allotment.location).map(|r| r.serial().clone()).collect();
    assert_eq!(targets, [serial("USA::LO:1"), serial("USA::LO:2")]);
}

#[test]
fn verify_flags_fixture_gaps() {
    let doc = parse_document(FIXTURE).unwrap();
    let result = verify(&doc);

    // Only the two locations carry full headers
    assert!(!result.is_ok());
    assert_eq!(
        result.summary(),
        VerifySummary {
            incomplete: doc.len() - 2,
            ..VerifySummary::default()
        }
    );

    // Renaming a location strands the antenna and allotment serials naming it
    let mut doc = doc;
    let hill = doc.find(RecordKind::Location, &serial("USA::LO:1")).unwrap();
    doc.get_as_mut::<Location>(hill).unwrap().header.serial = serial("USA::LO:99");
    let summary = verify(&doc).summary();
    assert_eq!(summary.dangling, 2);
    assert_eq!(summary.total(), doc.len() - 2 + 2);
}

#[test]
fn incomplete_reply_without_request() {
    let ts = UtcTimestamp::parse("2022-06-01T12:00:00Z").unwrap();
    let header = Header::new(serial("USA::RP:1"), Classification::Confidential).with_entry_timestamp(ts);
    let mut doc = Document::new();
    let reply = doc.insert(SsReply::new(header));
    assert!(!doc.get(reply).unwrap().is_complete());
}

#[test]
fn config_drives_resolution() {
    let config = Config::from_toml_str("[resolve]\non_unresolved = \"error\"\nlookup = \"scan\"\n").unwrap();
    let mut doc = dangling_document();
    assert!(doc.resolve_all(&config.resolve_options()).is_err());
}
