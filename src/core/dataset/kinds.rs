//! core::dataset::kinds
//!
//! Concrete record types, one per [`RecordKind`].
//!
//! Descriptive fields are kept as opaque strings; their formats belong to
//! the codec. Reference fields are declared through static [`RefSpec`]s so
//! the resolver and preparer can walk them without knowing the concrete type.

use serde::{Deserialize, Serialize};

use super::{Dataset, Header, RecordKind, RefField, RefSpec};

const RELATED_TARGETS: &[RecordKind] = &[
    RecordKind::Assignment,
    RecordKind::Allotment,
    RecordKind::SsReply,
    RecordKind::ForceElement,
    RecordKind::FeDeployment,
];

const EQUIPMENT_TARGETS: &[RecordKind] = &[
    RecordKind::Transmitter,
    RecordKind::Receiver,
    RecordKind::Antenna,
];

pub static LOCATION_REF: RefSpec = RefSpec {
    name: "location",
    targets: &[RecordKind::Location],
};

pub static CONTACT_REF: RefSpec = RefSpec {
    name: "contact",
    targets: &[RecordKind::Contact],
};

pub static ORGANISATION_REF: RefSpec = RefSpec {
    name: "organisation",
    targets: &[RecordKind::Organisation],
};

pub static ANTENNA_REF: RefSpec = RefSpec {
    name: "antenna",
    targets: &[RecordKind::Antenna],
};

pub static TRANSMITTER_REF: RefSpec = RefSpec {
    name: "transmitter",
    targets: &[RecordKind::Transmitter],
};

pub static RECEIVER_REF: RefSpec = RefSpec {
    name: "receiver",
    targets: &[RecordKind::Receiver],
};

pub static REQUEST_REF: RefSpec = RefSpec {
    name: "request",
    targets: &[RecordKind::SsRequest],
};

pub static FORCE_ELEMENT_REF: RefSpec = RefSpec {
    name: "force_element",
    targets: &[RecordKind::ForceElement],
};

/// Links between frequency-use records.
pub static RELATED_REF: RefSpec = RefSpec {
    name: "related",
    targets: RELATED_TARGETS,
};

/// Frequency records listed by a JRFL.
pub static FREQUENCY_REF: RefSpec = RefSpec {
    name: "frequency",
    targets: &[RecordKind::Assignment, RecordKind::Allotment],
};

/// Equipment of any of the three equipment kinds.
pub static EQUIPMENT_REF: RefSpec = RefSpec {
    name: "equipment",
    targets: EQUIPMENT_TARGETS,
};

macro_rules! header_access {
    ($kind:ident) => {
        fn kind(&self) -> RecordKind {
            RecordKind::$kind
        }

        fn header(&self) -> &Header {
            &self.header
        }

        fn header_mut(&mut self) -> &mut Header {
            &mut self.header
        }
    };
}

/// A geographic location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
}

impl Location {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            name: None,
            latitude: None,
            longitude: None,
        }
    }
}

impl Dataset for Location {
    header_access!(Location);

    fn has_required_fields(&self) -> bool {
        self.name.is_some()
    }
}

/// A point of contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            name: None,
            phone: None,
            email: None,
        }
    }
}

impl Dataset for Contact {
    header_access!(Contact);
}

/// An organisation and its contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Organisation {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub contact: RefField,
}

impl Organisation {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            name: None,
            contact: RefField::default(),
        }
    }
}

impl Dataset for Organisation {
    header_access!(Organisation);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&CONTACT_REF, &self.contact)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![(&CONTACT_REF, &mut self.contact)]
    }
}

/// An antenna installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Antenna {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nomenclature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub location: RefField,
}

impl Antenna {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            nomenclature: None,
            gain: None,
            location: RefField::default(),
        }
    }
}

impl Dataset for Antenna {
    header_access!(Antenna);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&LOCATION_REF, &self.location)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![(&LOCATION_REF, &mut self.location)]
    }
}

/// A transmitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transmitter {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nomenclature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub location: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub antenna: RefField,
}

impl Transmitter {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            nomenclature: None,
            power: None,
            location: RefField::default(),
            antenna: RefField::default(),
        }
    }
}

impl Dataset for Transmitter {
    header_access!(Transmitter);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&LOCATION_REF, &self.location), (&ANTENNA_REF, &self.antenna)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![
            (&LOCATION_REF, &mut self.location),
            (&ANTENNA_REF, &mut self.antenna),
        ]
    }
}

/// A receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Receiver {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nomenclature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub location: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub antenna: RefField,
}

impl Receiver {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            nomenclature: None,
            sensitivity: None,
            location: RefField::default(),
            antenna: RefField::default(),
        }
    }
}

impl Dataset for Receiver {
    header_access!(Receiver);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&LOCATION_REF, &self.location), (&ANTENNA_REF, &self.antenna)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![
            (&LOCATION_REF, &mut self.location),
            (&ANTENNA_REF, &mut self.antenna),
        ]
    }
}

/// One equipment configuration within an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One link within an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// One station within an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Station {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
}

/// A frequency assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assignment {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configurations: Vec<Configuration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stations: Vec<Station>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub location: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub transmitter: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub receiver: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub related: RefField,
}

impl Assignment {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            title: None,
            configurations: Vec::new(),
            links: Vec::new(),
            stations: Vec::new(),
            location: RefField::default(),
            transmitter: RefField::default(),
            receiver: RefField::default(),
            related: RefField::default(),
        }
    }
}

impl Dataset for Assignment {
    header_access!(Assignment);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![
            (&LOCATION_REF, &self.location),
            (&TRANSMITTER_REF, &self.transmitter),
            (&RECEIVER_REF, &self.receiver),
            (&RELATED_REF, &self.related),
        ]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![
            (&LOCATION_REF, &mut self.location),
            (&TRANSMITTER_REF, &mut self.transmitter),
            (&RECEIVER_REF, &mut self.receiver),
            (&RELATED_REF, &mut self.related),
        ]
    }

    fn has_required_fields(&self) -> bool {
        !self.configurations.is_empty() && !self.links.is_empty() && !self.stations.is_empty()
    }
}

/// A frequency allotment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Allotment {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub location: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub related: RefField,
}

impl Allotment {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            title: None,
            band: None,
            location: RefField::default(),
            related: RefField::default(),
        }
    }
}

impl Dataset for Allotment {
    header_access!(Allotment);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&LOCATION_REF, &self.location), (&RELATED_REF, &self.related)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![
            (&LOCATION_REF, &mut self.location),
            (&RELATED_REF, &mut self.related),
        ]
    }
}

/// A satellite and its on-board equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Satellite {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub transmitter: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub receiver: RefField,
}

impl Satellite {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            name: None,
            orbit: None,
            transmitter: RefField::default(),
            receiver: RefField::default(),
        }
    }
}

impl Dataset for Satellite {
    header_access!(Satellite);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![
            (&TRANSMITTER_REF, &self.transmitter),
            (&RECEIVER_REF, &self.receiver),
        ]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![
            (&TRANSMITTER_REF, &mut self.transmitter),
            (&RECEIVER_REF, &mut self.receiver),
        ]
    }
}

/// A joint restricted frequency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Jrfl {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub frequency: RefField,
}

impl Jrfl {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            title: None,
            frequency: RefField::default(),
        }
    }
}

impl Dataset for Jrfl {
    header_access!(Jrfl);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&FREQUENCY_REF, &self.frequency)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![(&FREQUENCY_REF, &mut self.frequency)]
    }
}

/// A spectrum supportability request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsRequest {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub equipment: RefField,
}

impl SsRequest {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            title: None,
            equipment: RefField::default(),
        }
    }
}

impl Dataset for SsRequest {
    header_access!(SsRequest);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&EQUIPMENT_REF, &self.equipment)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![(&EQUIPMENT_REF, &mut self.equipment)]
    }
}

/// A reply to a spectrum supportability request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsReply {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub request: RefField,
}

impl SsReply {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            comment: None,
            request: RefField::default(),
        }
    }
}

impl Dataset for SsReply {
    header_access!(SsReply);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![(&REQUEST_REF, &self.request)]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![(&REQUEST_REF, &mut self.request)]
    }

    fn has_required_fields(&self) -> bool {
        !self.request.is_empty()
    }
}

/// A force element and the equipment it fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForceElement {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub organisation: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub equipment: RefField,
}

impl ForceElement {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            name: None,
            organisation: RefField::default(),
            equipment: RefField::default(),
        }
    }
}

impl Dataset for ForceElement {
    header_access!(ForceElement);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![
            (&ORGANISATION_REF, &self.organisation),
            (&EQUIPMENT_REF, &self.equipment),
        ]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![
            (&ORGANISATION_REF, &mut self.organisation),
            (&EQUIPMENT_REF, &mut self.equipment),
        ]
    }
}

/// A deployment of force elements to locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeDeployment {
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub force_element: RefField,
    #[serde(default, skip_serializing_if = "RefField::is_empty")]
    pub location: RefField,
}

impl FeDeployment {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            name: None,
            force_element: RefField::default(),
            location: RefField::default(),
        }
    }
}

impl Dataset for FeDeployment {
    header_access!(FeDeployment);

    fn ref_fields(&self) -> Vec<(&'static RefSpec, &RefField)> {
        vec![
            (&FORCE_ELEMENT_REF, &self.force_element),
            (&LOCATION_REF, &self.location),
        ]
    }

    fn ref_fields_mut(&mut self) -> Vec<(&'static RefSpec, &mut RefField)> {
        vec![
            (&FORCE_ELEMENT_REF, &mut self.force_element),
            (&LOCATION_REF, &mut self.location),
        ]
    }

    fn has_required_fields(&self) -> bool {
        !self.force_element.is_empty()
    }
}
