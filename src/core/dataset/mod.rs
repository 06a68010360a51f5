//! core::dataset
//!
//! Record kinds, the shared record header, and reference fields.
//!
//! # Overview
//!
//! Every record in a [`Document`](crate::core::document::Document) belongs to
//! one of a closed set of kinds ([`RecordKind`]). Each concrete record type
//! (see [`kinds`]) carries a [`Header`] plus zero or more [`RefField`]s.
//!
//! A reference field holds two parallel views:
//! - **Serial view**: the list of [`Serial`]s as read from or written to the wire
//! - **Resolved view**: [`RecordRef`] handles to the records those serials name
//!
//! The resolver fills the resolved view from the serial view; the preparer
//! projects the resolved view back into serials.
//!
//! # Ordering
//!
//! [`Record`] equality and hashing use kind and serial only.
//! [`Record::compare`] sorts by kind name, then by entry timestamp (most
//! recent first), then by serial. It is not an `Ord` impl: two equal records
//! with different entry timestamps do not compare as `Equal`.

pub mod kinds;

pub use kinds::{
    Allotment, Antenna, Assignment, Configuration, Contact, FeDeployment, ForceElement, Jrfl,
    Link, Location, Organisation, Receiver, Satellite, SsReply, SsRequest, Station, Transmitter,
};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::document::RecordRef;
use crate::core::types::{Classification, Serial, UtcTimestamp};

/// The closed set of record kinds a document can hold.
///
/// Declaration order is the document's collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    Location,
    Contact,
    Organisation,
    Antenna,
    Transmitter,
    Receiver,
    Assignment,
    Allotment,
    Satellite,
    Jrfl,
    SsRequest,
    SsReply,
    ForceElement,
    FeDeployment,
}

impl RecordKind {
    /// All kinds in collection order.
    pub const ALL: [RecordKind; 14] = [
        RecordKind::Location,
        RecordKind::Contact,
        RecordKind::Organisation,
        RecordKind::Antenna,
        RecordKind::Transmitter,
        RecordKind::Receiver,
        RecordKind::Assignment,
        RecordKind::Allotment,
        RecordKind::Satellite,
        RecordKind::Jrfl,
        RecordKind::SsRequest,
        RecordKind::SsReply,
        RecordKind::ForceElement,
        RecordKind::FeDeployment,
    ];

    /// Dataset name, used for cross-kind ordering and display.
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Location => "Location",
            RecordKind::Contact => "Contact",
            RecordKind::Organisation => "Organisation",
            RecordKind::Antenna => "Antenna",
            RecordKind::Transmitter => "Transmitter",
            RecordKind::Receiver => "Receiver",
            RecordKind::Assignment => "Assignment",
            RecordKind::Allotment => "Allotment",
            RecordKind::Satellite => "Satellite",
            RecordKind::Jrfl => "JRFL",
            RecordKind::SsRequest => "SSRequest",
            RecordKind::SsReply => "SSReply",
            RecordKind::ForceElement => "ForceElement",
            RecordKind::FeDeployment => "FEDeployment",
        }
    }

    /// Two-character dataset type code expected in serials of this kind.
    pub fn code(&self) -> &'static str {
        match self {
            RecordKind::Location => "LO",
            RecordKind::Contact => "CT",
            RecordKind::Organisation => "OR",
            RecordKind::Antenna => "AT",
            RecordKind::Transmitter => "TX",
            RecordKind::Receiver => "RX",
            RecordKind::Assignment => "AS",
            RecordKind::Allotment => "AL",
            RecordKind::Satellite => "SA",
            RecordKind::Jrfl => "JR",
            RecordKind::SsRequest => "RQ",
            RecordKind::SsReply => "RP",
            RecordKind::ForceElement => "FE",
            RecordKind::FeDeployment => "FD",
        }
    }

    /// Look up a kind by its dataset type code.
    pub fn from_code(code: &str) -> Option<RecordKind> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity and descriptive metadata shared by every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    /// Record identity, unique within its kind's collection
    pub serial: Serial,

    /// Creation time (required for completeness)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_timestamp: Option<UtcTimestamp>,

    /// Classification marking (required for completeness)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    /// Workflow state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Time of the most recent change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change_timestamp: Option<UtcTimestamp>,

    /// Free-text remarks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Header {
    /// Create a complete header stamped with the current time.
    pub fn new(serial: Serial, classification: Classification) -> Self {
        Self {
            serial,
            entry_timestamp: Some(UtcTimestamp::now()),
            classification: Some(classification),
            state: None,
            last_change_timestamp: None,
            remarks: None,
        }
    }

    /// Create a header carrying only the serial.
    pub fn bare(serial: Serial) -> Self {
        Self {
            serial,
            entry_timestamp: None,
            classification: None,
            state: None,
            last_change_timestamp: None,
            remarks: None,
        }
    }

    /// Set the entry timestamp.
    pub fn with_entry_timestamp(mut self, ts: UtcTimestamp) -> Self {
        self.entry_timestamp = Some(ts);
        self
    }

    /// True when identity, entry timestamp, and classification are present.
    pub fn is_complete(&self) -> bool {
        self.entry_timestamp.is_some() && self.classification.is_some()
    }
}

/// Static description of one reference field.
///
/// `targets` lists the candidate kinds in resolution order. A field with a
/// single target is monomorphic; with several it is polymorphic and the first
/// kind whose collection holds the serial wins.
#[derive(Debug, PartialEq, Eq)]
pub struct RefSpec {
    /// Field name, as it appears on the wire
    pub name: &'static str,
    /// Candidate target kinds, in resolution order
    pub targets: &'static [RecordKind],
}

impl RefSpec {
    /// Check if more than one target kind is allowed.
    pub fn is_polymorphic(&self) -> bool {
        self.targets.len() > 1
    }
}

/// A reference field: serials on the wire, handles at runtime.
///
/// Only the serial list is serialized. The resolved list is transient and
/// starts empty after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefField {
    serials: Vec<Serial>,
    #[serde(skip)]
    resolved: Vec<RecordRef>,
}

impl RefField {
    /// Create a field from serials, with an empty resolved view.
    pub fn from_serials(serials: impl IntoIterator<Item = Serial>) -> Self {
        Self {
            serials: serials.into_iter().collect(),
            resolved: Vec::new(),
        }
    }

    /// The serial view.
    pub fn serials(&self) -> &[Serial] {
        &self.serials
    }

    /// Replace the serial view.
    pub fn set_serials(&mut self, serials: Vec<Serial>) {
        self.serials = serials;
    }

    /// Append a serial to the serial view.
    pub fn push_serial(&mut self, serial: Serial) {
        self.serials.push(serial);
    }

    /// The resolved view.
    pub fn resolved(&self) -> &[RecordRef] {
        &self.resolved
    }

    /// Attach a resolved reference.
    ///
    /// The serial view is unchanged until the record is prepared.
    pub fn attach(&mut self, target: RecordRef) {
        self.resolved.push(target);
    }

    /// Remove every resolved reference to `target`.
    ///
    /// Returns true if anything was removed.
    pub fn detach(&mut self, target: RecordRef) -> bool {
        let before = self.resolved.len();
        self.resolved.retain(|r| *r != target);
        self.resolved.len() != before
    }

    /// Clear the resolved view.
    pub fn clear_resolved(&mut self) {
        self.resolved.clear();
    }

    /// Replace the resolved view wholesale.
    pub(crate) fn set_resolved(&mut self, resolved: Vec<RecordRef>) {
        self.resolved = resolved;
    }

    pub(crate) fn resolved_mut(&mut self) -> &mut [RecordRef] {
        &mut self.resolved
    }

    /// Check if the serial view is empty.
    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }
}

/// Behavior shared by every concrete record type.
pub trait Dataset {
    /// The record's kind.
    fn kind(&self) -> RecordKind;

    /// The shared header.
    fn header(&self) -> &Header;

    /// Mutable access to the shared header.
    fn header_mut(&mut self) -> &mut Header;

    /// Reference fields paired with their static description, in declaration order.
    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        Vec::new()
    }

    /// Mutable reference fields, in the same order as [`Dataset::ref_fields`].
    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        Vec::new()
    }

    /// Kind-specific required fields beyond the header.
    fn has_required_fields(&self) -> bool {
        true
    }

    /// Presence check over the header and the kind's required fields.
    ///
    /// Does not validate formats or referential integrity.
    fn is_complete(&self) -> bool {
        self.header().is_complete() && self.has_required_fields()
    }
}

/// Typed access from a [`Record`] to its concrete variant.
pub trait DatasetKind: Dataset + Into<Record> + Sized {
    /// The kind every value of this type has.
    const KIND: RecordKind;

    /// Borrow the concrete record if `record` is of this kind.
    fn from_record(record: &Record) -> Option<&Self>;

    /// Mutably borrow the concrete record if `record` is of this kind.
    fn from_record_mut(record: &mut Record) -> Option<&mut Self>;
}

macro_rules! records {
    ($($variant:ident),* $(,)?) => {
        /// A record of any kind.
        #[derive(Debug, Clone)]
        pub enum Record {
            $($variant($variant),)*
        }

        impl Record {
            /// Borrow the record through the shared [`Dataset`] interface.
            pub fn as_dataset(&self) -> &dyn Dataset {
                match self {
                    $(Record::$variant(r) => r,)*
                }
            }

            /// Mutably borrow the record through the shared [`Dataset`] interface.
            pub fn as_dataset_mut(&mut self) -> &mut dyn Dataset {
                match self {
                    $(Record::$variant(r) => r,)*
                }
            }
        }

        $(
            impl From<$variant> for Record {
                fn from(record: $variant) -> Self {
                    Record::$variant(record)
                }
            }

            impl DatasetKind for $variant {
                const KIND: RecordKind = RecordKind::$variant;

                fn from_record(record: &Record) -> Option<&Self> {
                    match record {
                        Record::$variant(r) => Some(r),
                        _ => None,
                    }
                }

                fn from_record_mut(record: &mut Record) -> Option<&mut Self> {
                    match record {
                        Record::$variant(r) => Some(r),
                        _ => None,
                    }
                }
            }
        )*
    };
}

records!(
    Location,
    Contact,
    Organisation,
    Antenna,
    Transmitter,
    Receiver,
    Assignment,
    Allotment,
    Satellite,
    Jrfl,
    SsRequest,
    SsReply,
    ForceElement,
    FeDeployment,
);

impl Record {
    /// The record's kind.
    pub fn kind(&self) -> RecordKind {
        self.as_dataset().kind()
    }

    /// The shared header.
    pub fn header(&self) -> &Header {
        self.as_dataset().header()
    }

    /// Mutable access to the shared header.
    pub fn header_mut(&mut self) -> &mut Header {
        self.as_dataset_mut().header_mut()
    }

    /// The record's serial.
    pub fn serial(&self) -> &Serial {
        &self.header().serial
    }

    /// Reference fields with their descriptions.
    pub fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        self.as_dataset().ref_fields()
    }

    /// Mutable reference fields with their descriptions.
    pub fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        self.as_dataset_mut().ref_fields_mut()
    }

    /// Look up a reference field by name.
    pub fn ref_field(&self, name: &str) -> Option<&RefField> {
        self.ref_fields()
            .into_iter()
            .find(|(spec, _)| spec.name == name)
            .map(|(_, field)| field)
    }

    /// Look up a reference field by name, mutably.
    pub fn ref_field_mut(&mut self, name: &str) -> Option<&mut RefField> {
        self.ref_fields_mut()
            .into_iter()
            .find(|(spec, _)| spec.name == name)
            .map(|(_, field)| field)
    }

    /// See [`Dataset::is_complete`].
    pub fn is_complete(&self) -> bool {
        self.as_dataset().is_complete()
    }

    /// Clear every resolved view, returning the record to flat state.
    pub fn clear_resolved(&mut self) {
        for (_, field) in self.ref_fields_mut() {
            field.clear_resolved();
        }
    }

    /// Output order: kind name, then entry timestamp descending, then serial.
    ///
    /// A missing timestamp sorts after any present one. Use with
    /// `sort_by(Record::compare)`; records that are `==` may still compare
    /// unequal here when their timestamps differ.
    pub fn compare(&self, other: &Record) -> Ordering {
        if self.kind() != other.kind() {
            return self.kind().name().cmp(other.kind().name());
        }
        other
            .header()
            .entry_timestamp
            .cmp(&self.header().entry_timestamp)
            .then_with(|| self.serial().cmp(other.serial()))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.serial() == other.serial()
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial().hash(state);
    }
}
