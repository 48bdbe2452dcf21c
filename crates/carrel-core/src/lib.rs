//! carrel-core: record model for the carrel paper collection
//!
//! This library provides pure Rust implementations of:
//! - Paper records with schema-validated BibTeX attributes and an active
//!   persistence projection
//! - A flat two-column attribute store with save/load round-tripping
//! - The sentinel-delimited notes/relations text stream
//! - Collection-level registry, batch operations, relation propagation,
//!   and keyword queries

pub mod collection;
pub mod error;
pub mod notes;
pub mod record;
pub mod relation;
pub mod store;

// Re-export main types for convenience
pub use collection::{CollectionIndex, RelationTargets};
pub use error::RecordError;
pub use notes::{decode_notes, encode_stream, NotesFile, RELATION_PREFIX, SPLIT_LINE};
pub use record::{PaperId, PaperRecord, CATEGORIES};
pub use relation::Relation;
pub use store::{AttrRow, AttributeStore};

// Re-export the schema surface so collaborators need only one crate
pub use carrel_bibtex::{is_allowed_attribute, optional_fields, required_fields, EntryType};
