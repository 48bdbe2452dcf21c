//! BibTeX entry data structures

use serde::{Deserialize, Serialize};

use crate::parser::ParseError;

/// BibTeX entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Article,
    Book,
    InBook,
    InProceedings,
    PhdThesis,
    MastersThesis,
    TechReport,
    Misc,
}

impl EntryType {
    /// Every known entry type, in canonical order.
    pub const ALL: [EntryType; 8] = [
        Self::Article,
        Self::Book,
        Self::InBook,
        Self::InProceedings,
        Self::PhdThesis,
        Self::MastersThesis,
        Self::TechReport,
        Self::Misc,
    ];

    /// Convert entry type to canonical string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::InBook => "inbook",
            Self::InProceedings => "inproceedings",
            Self::PhdThesis => "phdthesis",
            Self::MastersThesis => "mastersthesis",
            Self::TechReport => "techreport",
            Self::Misc => "misc",
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = ParseError;

    /// Parse an entry type token (case-insensitive). Unknown tokens are an
    /// error rather than a catch-all variant: the schema tables gate
    /// everything downstream, so an unrecognized type cannot be carried.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_lowercase().as_str() {
            "article" => Ok(Self::Article),
            "book" => Ok(Self::Book),
            "inbook" => Ok(Self::InBook),
            "inproceedings" => Ok(Self::InProceedings),
            "phdthesis" => Ok(Self::PhdThesis),
            "mastersthesis" => Ok(Self::MastersThesis),
            "techreport" => Ok(Self::TechReport),
            "misc" => Ok(Self::Misc),
            _ => Err(ParseError::UnknownEntryType(token.to_string())),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single BibTeX field (name-value pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A parsed BibTeX entry, prior to schema validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEntry {
    pub entry_type: EntryType,
    pub cite_key: String,
    pub fields: Vec<Field>,
}

impl ParsedEntry {
    /// Get a field value by name
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
