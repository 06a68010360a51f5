//! core::config::schema
//!
//! Configuration file schema.
//!
//! All fields are optional; [`super::Config`] applies defaults on access.

use serde::{Deserialize, Serialize};

use crate::core::resolve::{LookupStrategy, UnresolvedPolicy};

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [resolve]
/// on_unresolved = "error"
/// lookup = "indexed"
/// report_ambiguous = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Reference resolution settings
    pub resolve: Option<ResolveSection>,
}

/// The `[resolve]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveSection {
    /// Handling of serials that name no record
    pub on_unresolved: Option<UnresolvedPolicy>,

    /// Collection search strategy
    pub lookup: Option<LookupStrategy>,

    /// Whether to report polymorphic serials found in several collections
    pub report_ambiguous: Option<bool>,
}
