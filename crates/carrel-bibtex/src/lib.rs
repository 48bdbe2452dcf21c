//! BibTeX entry parsing and schema tables
//!
//! This crate is the leaf of the carrel workspace: it knows what a BibTeX
//! entry looks like and which fields each entry type may carry, and nothing
//! about records, stores, or collections.
//!
//! Features:
//! - Nom-based parser for single `@type{key, field = {value}, ...}` entries
//! - Per-entry-type required/optional field tables
//! - The allowed-attribute universe used to gate record persistence

pub mod entry;
pub mod parser;
pub mod schema;

pub use entry::{EntryType, Field, ParsedEntry};
pub use parser::{parse_entry, ParseError};
pub use schema::{is_allowed_attribute, optional_fields, required_fields, STRUCTURAL_ATTRS};
