//! The paper record model
//!
//! A `PaperRecord` owns one paper's metadata: schema-validated BibTeX
//! attributes, a category, keywords, relations, and notes. The set of
//! attribute names currently populated (`active_attrs`) gates what the
//! flat store persists; it always contains `paper_id`.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use tracing::{info, warn};

use carrel_bibtex::{
    is_allowed_attribute, optional_fields, parse_entry, required_fields, EntryType, Field,
};

use crate::error::RecordError;
use crate::notes::NotesFile;
use crate::relation::Relation;
use crate::store::{AttrRow, AttributeStore};

/// Stable integer identity of a paper within a collection.
pub type PaperId = u64;

/// Categories a paper may be filed under.
pub const CATEGORIES: [&str; 1] = ["survey"];

/// One paper's metadata, notes, and relations, bound to a private store
/// location and a notes stream.
#[derive(Debug)]
pub struct PaperRecord {
    paper_id: PaperId,
    store: AttributeStore,
    notes_file: NotesFile,
    bibtex: Option<String>,
    entry: Option<EntryType>,
    key: Option<String>,
    fields: Vec<Field>,
    category: Option<String>,
    keywords: Vec<String>,
    relations: Vec<Relation>,
    notes: Vec<String>,
    active_attrs: BTreeSet<String>,
}

impl PaperRecord {
    /// Bind a record to its store locations, creating empty files on first
    /// use and reading any notes already on disk.
    pub fn open(
        paper_id: PaperId,
        data_path: impl AsRef<Path>,
        notes_path: impl AsRef<Path>,
    ) -> Result<Self, RecordError> {
        let store = AttributeStore::new(data_path.as_ref());
        store.ensure_exists()?;
        let notes_file = NotesFile::new(notes_path.as_ref());
        notes_file.ensure_exists()?;
        let notes = notes_file.read()?;
        Ok(Self {
            paper_id,
            store,
            notes_file,
            bibtex: None,
            entry: None,
            key: None,
            fields: Vec::new(),
            category: None,
            keywords: Vec::new(),
            relations: Vec::new(),
            notes,
            active_attrs: BTreeSet::from(["paper_id".to_string()]),
        })
    }

    /// Ingest one BibTeX entry. The parse is transactional: either the
    /// whole entry validates and the active projection is replaced, or the
    /// record is left exactly as it was.
    pub fn set_bibtex(&mut self, bibtex: &str) -> Result<(), RecordError> {
        if self.bibtex.is_some() {
            warn!(
                paper_id = self.paper_id,
                "bibtex overwritten; all derived state is reset"
            );
        }

        let parsed = parse_entry(bibtex)?;
        let entry = parsed.entry_type;
        let required = required_fields(entry);
        let optional = optional_fields(entry);

        let mut fields: Vec<Field> = Vec::with_capacity(parsed.fields.len());
        for field in parsed.fields {
            let name = field.name.as_str();
            if !required.contains(&name) && !optional.contains(&name) {
                return Err(RecordError::UnrecognizedField {
                    field: field.name,
                    entry,
                });
            }
            // last value wins when a field repeats
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => existing.value = field.value,
                None => fields.push(field),
            }
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|name| fields.iter().all(|f| f.name != **name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RecordError::MissingRequiredFields { entry, missing });
        }

        let mut active: BTreeSet<String> = ["paper_id", "bibtex", "entry", "key"]
            .into_iter()
            .map(str::to_string)
            .collect();
        active.extend(fields.iter().map(|f| f.name.clone()));

        self.bibtex = Some(bibtex.to_string());
        self.entry = Some(entry);
        self.key = Some(parsed.cite_key);
        self.fields = fields;
        self.category = None;
        self.keywords.clear();
        self.relations.clear();
        self.active_attrs = active;
        Ok(())
    }

    fn require_bibtex(&self) -> Result<(), RecordError> {
        if self.bibtex.is_none() {
            return Err(RecordError::BibtexNotSet(self.paper_id));
        }
        Ok(())
    }

    /// File the paper under a whitelisted category. Single-valued, so
    /// repeated identical calls are naturally idempotent.
    pub fn set_category(&mut self, category: &str) -> Result<(), RecordError> {
        self.require_bibtex()?;
        if !CATEGORIES.contains(&category) {
            return Err(RecordError::InvalidCategory(category.to_string()));
        }
        self.category = Some(category.to_string());
        self.active_attrs.insert("category".to_string());
        Ok(())
    }

    /// Append a keyword, preserving insertion order. Adding a keyword that
    /// is already present is an informational no-op.
    pub fn add_keyword(&mut self, keyword: &str) -> Result<(), RecordError> {
        self.require_bibtex()?;
        if keyword.contains(',') || keyword.contains('\n') {
            return Err(RecordError::InvalidKeywordText(keyword.to_string()));
        }
        if self.keywords.iter().any(|k| k == keyword) {
            info!(
                paper_id = self.paper_id,
                keyword, "keyword already present; nothing to do"
            );
            return Ok(());
        }
        self.keywords.push(keyword.to_string());
        self.active_attrs.insert("keywords".to_string());
        Ok(())
    }

    /// Remove a keyword. Removing an absent keyword is an informational
    /// no-op.
    pub fn del_keyword(&mut self, keyword: &str) -> Result<(), RecordError> {
        self.require_bibtex()?;
        match self.keywords.iter().position(|k| k == keyword) {
            Some(pos) => {
                self.keywords.remove(pos);
            }
            None => info!(
                paper_id = self.paper_id,
                keyword, "keyword not present; nothing to do"
            ),
        }
        Ok(())
    }

    /// Replace a keyword in place, keeping its position. Returns whether
    /// the record carried the old keyword at all.
    pub fn rename_keyword(&mut self, old: &str, new: &str) -> Result<bool, RecordError> {
        if new.contains(',') || new.contains('\n') {
            return Err(RecordError::InvalidKeywordText(new.to_string()));
        }
        match self.keywords.iter_mut().find(|k| *k == old) {
            Some(keyword) => {
                *keyword = new.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Append a relation triple. An exact-triple duplicate is an
    /// informational no-op; triples differing in label or note count as
    /// distinct.
    pub fn add_relation(
        &mut self,
        target: PaperId,
        label: &str,
        note: &str,
    ) -> Result<(), RecordError> {
        self.require_bibtex()?;
        let relation = Relation::new(target, label, note)?;
        if self.relations.contains(&relation) {
            info!(
                paper_id = self.paper_id,
                target, label, "relation already present; nothing to do"
            );
            return Ok(());
        }
        self.relations.push(relation);
        self.active_attrs.insert("relations".to_string());
        Ok(())
    }

    /// Append a free-text note; persisted through the notes stream on the
    /// next save.
    pub fn add_note(&mut self, text: &str) {
        self.notes.push(text.trim_end_matches('\n').to_string());
    }

    /// Re-read the notes stream from disk, discarding relation renderings.
    pub fn reload_notes(&mut self) -> Result<(), RecordError> {
        self.notes = self.notes_file.read()?;
        Ok(())
    }

    /// Flatten the active attributes to the store (full replace) and
    /// rewrite the notes stream with relation lines re-derived from memory.
    pub fn save(&mut self) -> Result<(), RecordError> {
        self.require_bibtex()?;
        let mut rows = Vec::with_capacity(self.active_attrs.len() + self.relations.len());
        for attr in &self.active_attrs {
            let name = attr.as_str();
            match name {
                "paper_id" => rows.push(AttrRow::new(name, self.paper_id.to_string())),
                "bibtex" => rows.push(AttrRow::new(name, self.bibtex.clone().unwrap_or_default())),
                "entry" => rows.push(AttrRow::new(
                    name,
                    self.entry.map(|e| e.as_str()).unwrap_or_default(),
                )),
                "key" => rows.push(AttrRow::new(name, self.key.clone().unwrap_or_default())),
                "category" => {
                    rows.push(AttrRow::new(name, self.category.clone().unwrap_or_default()))
                }
                "keywords" => rows.push(AttrRow::new(name, self.keywords.join(","))),
                "relations" => {
                    rows.extend(self.relations.iter().map(|r| AttrRow::new(name, r.encode())))
                }
                _ => rows.push(AttrRow::new(name, self.field(name).unwrap_or_default())),
            }
        }
        self.store.write_rows(&rows)?;

        // Tidy the notes stream: pick up hand edits, drop stale relation
        // lines, then mirror the in-memory relations back out.
        self.reload_notes()?;
        self.notes_file.write(&self.notes, &self.relations)?;
        Ok(())
    }

    /// Replace in-memory state from the store. Every row is validated
    /// before any state changes, so a failed load leaves the record
    /// untouched.
    pub fn load(&mut self) -> Result<(), RecordError> {
        let rows = self.store.read_rows()?;
        for row in &rows {
            if !is_allowed_attribute(&row.name) {
                return Err(RecordError::IllegalAttributeName(row.name.clone()));
            }
        }

        let mut bibtex = None;
        let mut entry = None;
        let mut key = None;
        let mut category = None;
        let mut fields: Vec<Field> = Vec::new();
        let mut keywords: Vec<String> = Vec::new();
        let mut relations: Vec<Relation> = Vec::new();
        let mut active: BTreeSet<String> = BTreeSet::from(["paper_id".to_string()]);

        for row in rows {
            active.insert(row.name.clone());
            match row.name.as_str() {
                "paper_id" => {
                    if row.value.parse::<PaperId>() != Ok(self.paper_id) {
                        warn!(
                            paper_id = self.paper_id,
                            stored = %row.value,
                            "stored paper id does not match record identity"
                        );
                    }
                }
                "bibtex" => bibtex = Some(row.value),
                "entry" => entry = Some(row.value.parse::<EntryType>()?),
                "key" => key = Some(row.value),
                "category" => category = Some(row.value),
                "keywords" => {
                    keywords = if row.value.is_empty() {
                        Vec::new()
                    } else {
                        row.value.split(',').map(str::to_string).collect()
                    };
                }
                "relations" => relations.push(Relation::decode(&row.value)?),
                _ => fields.push(Field {
                    name: row.name,
                    value: row.value,
                }),
            }
        }

        self.bibtex = bibtex;
        self.entry = entry;
        self.key = key;
        self.category = category;
        self.fields = fields;
        self.keywords = keywords;
        self.relations = relations;
        self.active_attrs = active;
        Ok(())
    }

    pub fn paper_id(&self) -> PaperId {
        self.paper_id
    }

    pub fn bibtex(&self) -> Option<&str> {
        self.bibtex.as_deref()
    }

    pub fn entry(&self) -> Option<EntryType> {
        self.entry
    }

    /// The citation key, for bibliography export.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// A parsed bibtex field value by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// The attribute names currently populated and eligible for
    /// persistence.
    pub fn active_attrs(&self) -> &BTreeSet<String> {
        &self.active_attrs
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active_attrs.contains(name)
    }
}

impl fmt::Display for PaperRecord {
    /// Human-readable single-record summary: title line (category as a
    /// bracketed prefix when set), then keywords, notes, and relations
    /// blocks when non-empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Paper {}: ", self.paper_id)?;
        if let Some(category) = &self.category {
            write!(f, "[{category}] ")?;
        }
        writeln!(
            f,
            "{}",
            self.title().or(self.key.as_deref()).unwrap_or("(no bibtex)")
        )?;
        if !self.keywords.is_empty() {
            writeln!(f, "Keywords: {}", self.keywords.join(", "))?;
        }
        if !self.notes.is_empty() {
            writeln!(f, "Notes:")?;
            for note in &self.notes {
                writeln!(f, "{note}")?;
            }
        }
        if !self.relations.is_empty() {
            writeln!(f, "Relations:")?;
            for relation in &self.relations {
                writeln!(f, "{} to {}: {}", relation.label, relation.target, relation.note)?;
            }
        }
        Ok(())
    }
}
