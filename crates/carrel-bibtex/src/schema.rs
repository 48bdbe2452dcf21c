//! Per-entry-type schema tables
//!
//! The required/optional tables follow the final schema revision: `journal`
//! is required for articles, and `inproceedings` carries the broad optional
//! set including `organization` and `publisher`. The tables are process-wide
//! immutable lookups with no mutation API.

use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::entry::EntryType;

/// Attribute names every record may persist regardless of entry type.
pub const STRUCTURAL_ATTRS: [&str; 7] = [
    "bibtex",
    "keywords",
    "category",
    "relations",
    "entry",
    "key",
    "paper_id",
];

/// Field names that must all be present for an entry of the given type.
pub fn required_fields(entry: EntryType) -> &'static [&'static str] {
    match entry {
        EntryType::Article => &["author", "title", "journal", "year"],
        EntryType::Book => &["author", "title", "publisher", "year"],
        EntryType::InBook => &["author", "title", "chapter", "pages", "publisher", "year"],
        EntryType::InProceedings => &["author", "title", "booktitle", "year"],
        EntryType::PhdThesis => &["author", "title", "school", "year"],
        EntryType::MastersThesis => &["author", "title", "school", "year"],
        EntryType::TechReport => &["author", "title", "institution", "year"],
        EntryType::Misc => &[],
    }
}

/// Field names permitted but not mandatory for the given type.
pub fn optional_fields(entry: EntryType) -> &'static [&'static str] {
    match entry {
        EntryType::Article => &["volume", "number", "pages", "month", "note", "key"],
        EntryType::Book => &[
            "volume", "number", "series", "address", "edition", "month", "note", "key",
        ],
        EntryType::InBook => &[
            "volume", "number", "series", "type", "address", "edition", "month", "note", "key",
        ],
        EntryType::InProceedings => &[
            "editor",
            "volume",
            "number",
            "series",
            "pages",
            "address",
            "month",
            "organization",
            "publisher",
            "note",
            "key",
        ],
        EntryType::PhdThesis => &["type", "address", "month", "note", "key"],
        EntryType::MastersThesis => &["type", "address", "month", "note", "key"],
        EntryType::TechReport => &["type", "number", "address", "month", "note", "key"],
        EntryType::Misc => &["author", "title", "howpublished", "month", "year", "note", "key"],
    }
}

lazy_static! {
    /// Union of all required and optional field names across all entry
    /// types, plus the structural names.
    static ref ALLOWED_ATTRS: HashSet<&'static str> = {
        let mut allowed = HashSet::new();
        for entry in EntryType::ALL {
            allowed.extend(required_fields(entry));
            allowed.extend(optional_fields(entry));
        }
        allowed.extend(STRUCTURAL_ATTRS);
        allowed
    };
}

/// Whether `name` may ever appear in a record's attribute store.
pub fn is_allowed_attribute(name: &str) -> bool {
    ALLOWED_ATTRS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntryType::Article, &["author", "title", "journal", "year"])]
    #[case(EntryType::Book, &["author", "title", "publisher", "year"])]
    #[case(EntryType::PhdThesis, &["author", "title", "school", "year"])]
    #[case(EntryType::Misc, &[])]
    fn required_tables(#[case] entry: EntryType, #[case] expected: &[&str]) {
        assert_eq!(required_fields(entry), expected);
    }

    #[rstest]
    #[case(EntryType::InProceedings, "organization")]
    #[case(EntryType::InProceedings, "publisher")]
    #[case(EntryType::Misc, "howpublished")]
    #[case(EntryType::Article, "volume")]
    fn optional_tables(#[case] entry: EntryType, #[case] field: &str) {
        assert!(optional_fields(entry).contains(&field));
    }

    #[test]
    fn required_and_optional_are_disjoint() {
        for entry in EntryType::ALL {
            for name in required_fields(entry) {
                assert!(
                    !optional_fields(entry).contains(name),
                    "{name} is both required and optional for {entry}"
                );
            }
        }
    }

    #[test]
    fn allowed_attributes_cover_schema_and_structure() {
        assert!(is_allowed_attribute("author"));
        assert!(is_allowed_attribute("booktitle"));
        assert!(is_allowed_attribute("howpublished"));
        assert!(is_allowed_attribute("paper_id"));
        assert!(is_allowed_attribute("bibtex"));
        assert!(is_allowed_attribute("relations"));
        assert!(!is_allowed_attribute("wrongfield"));
        assert!(!is_allowed_attribute(""));
    }
}
