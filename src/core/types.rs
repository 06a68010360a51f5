//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Serial`] - Validated composite record identifier
//! - [`UtcTimestamp`] - RFC3339 timestamp
//! - [`Classification`] - Security classification marking
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so every serial held by a record is well formed.
//!
//! # Examples
//!
//! ```
//! use smdx::core::types::Serial;
//!
//! let serial = Serial::parse("USA:N1:LO:1001").unwrap();
//! assert_eq!(serial.country(), "USA");
//! assert_eq!(serial.org_code(), Some("N1"));
//! assert_eq!(serial.dataset_type(), "LO");
//! assert_eq!(serial.serial_id(), "1001");
//!
//! assert!(Serial::parse("usa::LO:1").is_err());
//! assert!(Serial::parse("USA::LO").is_err());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four colon-separated parts of a [`Serial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Country,
    OrgCode,
    DatasetType,
    SerialId,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Country => "country",
            Segment::OrgCode => "org code",
            Segment::DatasetType => "dataset type",
            Segment::SerialId => "serial id",
        };
        f.write_str(name)
    }
}

/// Errors from serial parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("malformed serial '{input}': {reason}")]
    BadStructure { input: String, reason: String },

    #[error("serial '{input}': {segment} segment has {len} characters, at most {max} allowed")]
    SegmentTooLong {
        input: String,
        segment: Segment,
        len: usize,
        max: usize,
    },
}

/// Maximum length of the canonical text form.
pub const SERIAL_MAX_LEN: usize = 29;

/// A validated record identifier: `country:orgCode:datasetType:serialId`.
///
/// Segment rules:
/// - `country`: 1-5 uppercase ASCII letters
/// - `orgCode`: 0-4 ASCII alphanumerics (empty when absent)
/// - `datasetType`: exactly 2 ASCII alphanumerics
/// - `serialId`: 1-15 printable, non-whitespace characters
///
/// Serials compare part by part in that order, case-sensitively. The
/// dataset type is a hint about the record kind, never a guarantee.
///
/// A serial parsed from the three-segment shorthand remembers that spelling
/// and renders it back, but compares and hashes equal to its canonical form.
///
/// # Example
///
/// ```
/// use smdx::core::types::Serial;
///
/// let a = Serial::parse("USA::LO:1").unwrap();
/// let b = Serial::parse("USA::LO:2").unwrap();
/// assert!(a < b);
/// assert_eq!(a.to_text(), "USA::LO:1");
///
/// // The three-segment shorthand omits the org code
/// let short = Serial::parse("USA:LO:1").unwrap();
/// assert_eq!(short, a);
/// assert_eq!(short.to_text(), "USA:LO:1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Serial {
    country: String,
    org_code: String,
    dataset_type: String,
    serial_id: String,
    /// Parsed from `country:datasetType:serialId`; only affects rendering.
    shorthand: bool,
}

impl Serial {
    /// Build a serial from its parts.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if any part violates its segment rule.
    pub fn new(
        country: &str,
        org_code: Option<&str>,
        dataset_type: &str,
        serial_id: &str,
    ) -> Result<Self, FormatError> {
        let org_code = org_code.unwrap_or("");
        let input = format!("{country}:{org_code}:{dataset_type}:{serial_id}");
        Self::from_parts(&input, country, org_code, dataset_type, serial_id, false)
    }

    /// Parse a serial from its colon-delimited text form.
    ///
    /// Accepts the canonical four-segment form (`USA:N1:LO:1`, `USA::LO:1`)
    /// and the three-segment shorthand without an org code (`USA:LO:1`).
    /// Either way [`Serial::to_text`] reproduces `text`.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::BadStructure` for a wrong segment count, a missing
    /// required segment or a disallowed character, and
    /// `FormatError::SegmentTooLong` when a segment exceeds its maximum length.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let parts: Vec<&str> = text.split(':').collect();
        match parts.as_slice() {
            [country, org, dataset_type, id] => {
                Self::from_parts(text, country, org, dataset_type, id, false)
            }
            [country, dataset_type, id] => {
                Self::from_parts(text, country, "", dataset_type, id, true)
            }
            _ => Err(FormatError::BadStructure {
                input: text.to_string(),
                reason: format!("expected 3 or 4 ':'-separated segments, found {}", parts.len()),
            }),
        }
    }

    fn from_parts(
        input: &str,
        country: &str,
        org_code: &str,
        dataset_type: &str,
        serial_id: &str,
        shorthand: bool,
    ) -> Result<Self, FormatError> {
        check_segment(input, Segment::Country, country, 1, 5, |c| {
            c.is_ascii_uppercase()
        })?;
        check_segment(input, Segment::OrgCode, org_code, 0, 4, |c| {
            c.is_ascii_alphanumeric()
        })?;
        check_segment(input, Segment::DatasetType, dataset_type, 2, 2, |c| {
            c.is_ascii_alphanumeric()
        })?;
        check_segment(input, Segment::SerialId, serial_id, 1, 15, |c| {
            c != ':' && !c.is_whitespace() && !c.is_control()
        })?;

        Ok(Self {
            country: country.to_string(),
            org_code: org_code.to_string(),
            dataset_type: dataset_type.to_string(),
            serial_id: serial_id.to_string(),
            shorthand,
        })
    }

    /// Country segment.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Org code segment, `None` when empty.
    pub fn org_code(&self) -> Option<&str> {
        if self.org_code.is_empty() {
            None
        } else {
            Some(&self.org_code)
        }
    }

    /// Two-character dataset type segment.
    pub fn dataset_type(&self) -> &str {
        &self.dataset_type
    }

    /// Serial id segment.
    pub fn serial_id(&self) -> &str {
        &self.serial_id
    }

    /// Render the text form this serial was spelled in.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Render the four-segment form, even for shorthand serials.
    pub fn to_canonical_text(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.country, self.org_code, self.dataset_type, self.serial_id
        )
    }

    fn segments(&self) -> (&str, &str, &str, &str) {
        (
            &self.country,
            &self.org_code,
            &self.dataset_type,
            &self.serial_id,
        )
    }
}

impl PartialEq for Serial {
    fn eq(&self, other: &Self) -> bool {
        self.segments() == other.segments()
    }
}

impl Eq for Serial {}

impl Hash for Serial {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments().hash(state);
    }
}

impl Ord for Serial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments().cmp(&other.segments())
    }
}

impl PartialOrd for Serial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn check_segment(
    input: &str,
    segment: Segment,
    value: &str,
    min: usize,
    max: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<(), FormatError> {
    let len = value.chars().count();
    if len > max {
        return Err(FormatError::SegmentTooLong {
            input: input.to_string(),
            segment,
            len,
            max,
        });
    }
    if len < min {
        let reason = if min == max {
            format!("{segment} segment must be exactly {min} characters")
        } else {
            format!("{segment} segment is required")
        };
        return Err(FormatError::BadStructure {
            input: input.to_string(),
            reason,
        });
    }
    if let Some(c) = value.chars().find(|&c| !allowed(c)) {
        return Err(FormatError::BadStructure {
            input: input.to_string(),
            reason: format!("{segment} segment cannot contain {c:?}"),
        });
    }
    Ok(())
}

impl FromStr for Serial {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Serial {
    type Error = FormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Serial> for String {
    fn from(serial: Serial) -> Self {
        serial.to_text()
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shorthand {
            write!(f, "{}:{}:{}", self.country, self.dataset_type, self.serial_id)
        } else {
            write!(
                f,
                "{}:{}:{}:{}",
                self.country, self.org_code, self.dataset_type, self.serial_id
            )
        }
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use smdx::core::types::UtcTimestamp;
///
/// let ts = UtcTimestamp::parse("2021-01-01T00:00:00Z").unwrap();
/// assert!(ts > UtcTimestamp::parse("2020-01-01T00:00:00Z").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Parse an RFC3339 timestamp, converting any offset to UTC.
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        let dt = chrono::DateTime::parse_from_rfc3339(text)?;
        Ok(Self(dt.with_timezone(&chrono::Utc)))
    }
}

impl fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Security classification marking carried by every record.
///
/// Encoded on the wire by its single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "U")]
    Unclassified,
    #[serde(rename = "R")]
    Restricted,
    #[serde(rename = "C")]
    Confidential,
    #[serde(rename = "S")]
    Secret,
    #[serde(rename = "T")]
    TopSecret,
}

impl Classification {
    /// Single-letter marking code.
    pub fn code(&self) -> &'static str {
        match self {
            Classification::Unclassified => "U",
            Classification::Restricted => "R",
            Classification::Confidential => "C",
            Classification::Secret => "S",
            Classification::TopSecret => "T",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
