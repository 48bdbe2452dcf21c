//! Error types for the record model and collection index

use std::path::PathBuf;

use carrel_bibtex::EntryType;

use crate::record::PaperId;

/// Errors from record and collection operations. All are terminal for the
/// operation that raised them; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Bibtex ingestion failed at the parse layer (malformed wrapper or
    /// unknown entry type).
    #[error(transparent)]
    Bibtex(#[from] carrel_bibtex::ParseError),

    /// A parsed field is neither required nor optional for the entry type.
    #[error("unrecognized field `{field}` for entry type `{entry}`")]
    UnrecognizedField { field: String, entry: EntryType },

    /// Required fields still missing after all fields were processed.
    #[error("missing required fields for `{entry}`: {}", .missing.join(", "))]
    MissingRequiredFields { entry: EntryType, missing: Vec<String> },

    /// The operation needs bibtex to be set first.
    #[error("no bibtex set for paper {0}; call set_bibtex first")]
    BibtexNotSet(PaperId),

    /// The category is not in the whitelist.
    #[error("`{0}` is not a valid category")]
    InvalidCategory(String),

    /// Relation label or note collides with the persistence encoding.
    #[error("invalid relation text `{text}`: {reason}")]
    InvalidRelationText { text: String, reason: &'static str },

    /// Keyword collides with the comma-joined persistence encoding.
    #[error("invalid keyword `{0}`: keywords may not contain commas or newlines")]
    InvalidKeywordText(String),

    /// Batch relation arguments failed up-front validation.
    #[error("invalid relation arguments: {0}")]
    InvalidRelationArguments(String),

    /// A stored attribute name is outside the allowed set.
    #[error("`{0}` is not a legal attribute name for a paper")]
    IllegalAttributeName(String),

    /// No record registered under the id.
    #[error("no paper with id {0} in the collection")]
    PaperNotFound(PaperId),

    /// No record carries the citation key.
    #[error("`{0}` is not a known citation key")]
    UnknownCitationKey(String),

    /// The collection root directory does not exist.
    #[error("collection root `{}` does not exist", .0.display())]
    RootNotFound(PathBuf),

    /// The PDF to register is not in the papers directory.
    #[error("no such PDF `{}` in the papers directory", .0.display())]
    PdfNotFound(PathBuf),

    /// A papers-directory file name with no parsable id.
    #[error("`{0}` is not a registered paper file name (expected `<id>_registered.pdf`)")]
    InvalidFileName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("attribute store error: {0}")]
    Store(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offender() {
        let err = RecordError::UnrecognizedField {
            field: "wrongfield".to_string(),
            entry: EntryType::Article,
        };
        assert!(err.to_string().contains("wrongfield"));
        assert!(err.to_string().contains("article"));

        let err = RecordError::MissingRequiredFields {
            entry: EntryType::Article,
            missing: vec!["journal".to_string(), "year".to_string()],
        };
        assert!(err.to_string().contains("journal, year"));

        let err = RecordError::IllegalAttributeName("colour".to_string());
        assert!(err.to_string().contains("colour"));
    }
}
