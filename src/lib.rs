//! smdx - typed spectrum-management data-exchange documents
//!
//! A document is a set of strongly-typed record collections (locations,
//! antennas, transmitters, assignments, ...). Records name each other by
//! [`Serial`](core::types::Serial), a composite colon-delimited identifier.
//!
//! # Architecture
//!
//! - [`core`] - Domain types, the document container, and the two reference passes
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Reference lifecycle
//!
//! ```text
//! codec -> Document (flat) -> resolve_all -> linked graph -> prepare_all -> Document (flat) -> codec
//! ```
//!
//! # Example
//!
//! ```
//! use smdx::core::dataset::Antenna;
//! use smdx::core::document::schema::parse_document;
//! use smdx::core::resolve::ResolveOptions;
//!
//! let mut doc = parse_document(r#"{
//!     "kind": "smdx.document",
//!     "schema_version": 1,
//!     "location": [{ "header": { "serial": "USA::LO:1" }, "name": "Site A" }],
//!     "antenna": [{ "header": { "serial": "USA::AT:1" }, "location": ["USA::LO:1"] }]
//! }"#).unwrap();
//!
//! let report = doc.resolve_all(&ResolveOptions::default()).unwrap();
//! assert!(report.is_clean());
//!
//! let antenna = doc.records_of::<Antenna>().next().unwrap();
//! let site = doc.follow(&antenna.location).next().unwrap();
//! assert_eq!(site.serial().to_text(), "USA::LO:1");
//! ```

pub mod core;
pub mod logging;
