//! Directed relation triples between papers

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::record::PaperId;

/// Delimiter joining the three positions of an encoded relation.
pub const FIELD_DELIMITER: char = '_';

/// A directed link from one paper to another carrying a label and a
/// free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub target: PaperId,
    pub label: String,
    pub note: String,
}

impl Relation {
    /// Build a validated relation. The label must stay clear of the `_`
    /// store delimiter; neither label nor note may span lines.
    pub fn new(
        target: PaperId,
        label: impl Into<String>,
        note: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let label = label.into();
        let note = note.into();
        validate_text(&label, &note)?;
        Ok(Self {
            target,
            label,
            note,
        })
    }

    /// Encode as `target_label_note` for the attribute store.
    pub fn encode(&self) -> String {
        format!(
            "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
            self.target, self.label, self.note
        )
    }

    /// Decode the store encoding. The note is rejoined from the third
    /// position onward, so underscores inside it survive.
    pub fn decode(value: &str) -> Result<Self, RecordError> {
        let mut parts = value.splitn(3, FIELD_DELIMITER);
        let (Some(target), Some(label)) = (parts.next(), parts.next()) else {
            return Err(RecordError::InvalidRelationText {
                text: value.to_string(),
                reason: "expected `target_label_note`",
            });
        };
        let target = target
            .parse::<PaperId>()
            .map_err(|_| RecordError::InvalidRelationText {
                text: value.to_string(),
                reason: "target is not an integer id",
            })?;
        Ok(Self {
            target,
            label: label.to_string(),
            note: parts.next().unwrap_or("").to_string(),
        })
    }
}

/// Check relation text against the persistence delimiters.
pub fn validate_text(label: &str, note: &str) -> Result<(), RecordError> {
    if label.contains(FIELD_DELIMITER) {
        return Err(RecordError::InvalidRelationText {
            text: label.to_string(),
            reason: "labels may not contain `_`",
        });
    }
    if label.contains('\n') {
        return Err(RecordError::InvalidRelationText {
            text: label.to_string(),
            reason: "labels may not span lines",
        });
    }
    if note.contains('\n') {
        return Err(RecordError::InvalidRelationText {
            text: note.to_string(),
            reason: "notes may not span lines",
        });
    }
    Ok(())
}
