//! core
//!
//! Domain types, the document container, and the reference passes.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Serial, UtcTimestamp, Classification
//! - [`dataset`] - Record kinds, headers, reference fields, ordering
//! - [`document`] - Document container, record handles, JSON schema
//! - [`resolve`] - Serial-to-handle resolution
//! - [`prepare`] - Handle-to-serial preparation
//! - [`verify`] - Document integrity checks
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents malformed serials from being represented
//! - The set of record kinds is closed and known at compile time
//! - Passes read through a read-only lookup and are deterministic

pub mod config;
pub mod dataset;
pub mod document;
pub mod prepare;
pub mod resolve;
pub mod types;
pub mod verify;
