//! core::document::schema
//!
//! JSON rendition of a flat document (v1).
//!
//! # Schema Design
//!
//! - Self-describing with `kind` and `schema_version`
//! - One array per record kind, in insertion order; empty arrays omitted
//! - Reference fields carry canonical serial strings only
//! - Strictly parsed (unknown fields rejected)
//!
//! Parsing yields a document in flat state; call
//! [`Document::resolve_all`] before navigating it.
//!
//! # Example
//!
//! ```
//! use smdx::core::document::schema::{parse_document, render_document};
//!
//! let json = r#"{
//!     "kind": "smdx.document",
//!     "schema_version": 1,
//!     "location": [{ "header": { "serial": "USA::LO:1" }, "name": "Site A" }],
//!     "antenna": [{ "header": { "serial": "USA::AT:1" }, "location": ["USA::LO:1"] }]
//! }"#;
//!
//! let doc = parse_document(json).unwrap();
//! assert_eq!(doc.len(), 2);
//!
//! let rendered = render_document(&doc).unwrap();
//! assert_eq!(parse_document(&rendered).unwrap().len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Document;
use crate::core::dataset::{
    Allotment, Antenna, Assignment, Contact, FeDeployment, ForceElement, Jrfl, Location,
    Organisation, Receiver, Record, Satellite, SsReply, SsRequest, Transmitter,
};

/// The kind identifier for documents.
pub const DOCUMENT_KIND: &str = "smdx.document";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from document encoding and decoding.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse document: {0}")]
    ParseError(String),

    #[error("invalid kind '{found}', expected '{}'", DOCUMENT_KIND)]
    InvalidKind { found: String },

    #[error("unsupported schema version {0}, supported: {SCHEMA_VERSION}")]
    UnsupportedVersion(u32),

    #[error("failed to render document: {0}")]
    RenderError(String),
}

/// Envelope for version dispatch before full parsing.
#[derive(Debug, Deserialize)]
struct DocumentEnvelope {
    kind: String,
    schema_version: u32,
}

/// Wire shape of a v1 document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentV1 {
    kind: String,
    schema_version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    location: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    contact: Vec<Contact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    organisation: Vec<Organisation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    antenna: Vec<Antenna>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    transmitter: Vec<Transmitter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    receiver: Vec<Receiver>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    assignment: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    allotment: Vec<Allotment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    satellite: Vec<Satellite>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    jrfl: Vec<Jrfl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ss_request: Vec<SsRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ss_reply: Vec<SsReply>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    force_element: Vec<ForceElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fe_deployment: Vec<FeDeployment>,
}

impl DocumentV1 {
    fn into_document(self) -> Document {
        let mut doc = Document::new();
        insert_all(&mut doc, self.location);
        insert_all(&mut doc, self.contact);
        insert_all(&mut doc, self.organisation);
        insert_all(&mut doc, self.antenna);
        insert_all(&mut doc, self.transmitter);
        insert_all(&mut doc, self.receiver);
        insert_all(&mut doc, self.assignment);
        insert_all(&mut doc, self.allotment);
        insert_all(&mut doc, self.satellite);
        insert_all(&mut doc, self.jrfl);
        insert_all(&mut doc, self.ss_request);
        insert_all(&mut doc, self.ss_reply);
        insert_all(&mut doc, self.force_element);
        insert_all(&mut doc, self.fe_deployment);
        doc
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            kind: DOCUMENT_KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            location: doc.records_of::<Location>().cloned().collect(),
            contact: doc.records_of::<Contact>().cloned().collect(),
            organisation: doc.records_of::<Organisation>().cloned().collect(),
            antenna: doc.records_of::<Antenna>().cloned().collect(),
            transmitter: doc.records_of::<Transmitter>().cloned().collect(),
            receiver: doc.records_of::<Receiver>().cloned().collect(),
            assignment: doc.records_of::<Assignment>().cloned().collect(),
            allotment: doc.records_of::<Allotment>().cloned().collect(),
            satellite: doc.records_of::<Satellite>().cloned().collect(),
            jrfl: doc.records_of::<Jrfl>().cloned().collect(),
            ss_request: doc.records_of::<SsRequest>().cloned().collect(),
            ss_reply: doc.records_of::<SsReply>().cloned().collect(),
            force_element: doc.records_of::<ForceElement>().cloned().collect(),
            fe_deployment: doc.records_of::<FeDeployment>().cloned().collect(),
        }
    }
}

fn insert_all<T: Into<Record>>(doc: &mut Document, records: Vec<T>) {
    for record in records {
        doc.insert(record);
    }
}

/// Parse document JSON with version dispatch.
///
/// # Errors
///
/// Returns an error if:
/// - The JSON is malformed
/// - The `kind` field doesn't match [`DOCUMENT_KIND`]
/// - The `schema_version` is not supported
/// - Any record or serial is invalid, or an unknown field is present
pub fn parse_document(json: &str) -> Result<Document, DocumentError> {
    let envelope: DocumentEnvelope =
        serde_json::from_str(json).map_err(|e| DocumentError::ParseError(e.to_string()))?;

    if envelope.kind != DOCUMENT_KIND {
        return Err(DocumentError::InvalidKind {
            found: envelope.kind,
        });
    }

    match envelope.schema_version {
        1 => {
            let wire: DocumentV1 = serde_json::from_str(json)
                .map_err(|e| DocumentError::ParseError(e.to_string()))?;
            Ok(wire.into_document())
        }
        v => Err(DocumentError::UnsupportedVersion(v)),
    }
}

/// Render a document as v1 JSON.
///
/// Only serial views are written. Run [`Document::prepare_all`] first if
/// resolved views were edited.
pub fn render_document(doc: &Document) -> Result<String, DocumentError> {
    serde_json::to_string_pretty(&DocumentV1::from_document(doc))
        .map_err(|e| DocumentError::RenderError(e.to_string()))
}
