//! Collection-level orchestration over paper records
//!
//! `CollectionIndex` maps integer paper ids to records, files PDFs under
//! the collection's directory layout, and fans batch operations out to the
//! individual records. PDF contents are opaque; the collection only
//! moves and renames them by id.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::RecordError;
use crate::record::{PaperId, PaperRecord};
use crate::relation;

/// File-name suffix marking a PDF as filed under its collection id.
const REGISTERED_SUFFIX: &str = "_registered";

/// Second parameter of a relation batch: one target or many.
#[derive(Debug, Clone)]
pub enum RelationTargets {
    One(PaperId),
    Many(Vec<PaperId>),
}

impl RelationTargets {
    fn ids(self) -> Result<Vec<PaperId>, RecordError> {
        match self {
            Self::One(id) => Ok(vec![id]),
            Self::Many(ids) if ids.is_empty() => Err(RecordError::InvalidRelationArguments(
                "target list is empty".to_string(),
            )),
            Self::Many(ids) => Ok(ids),
        }
    }
}

impl From<PaperId> for RelationTargets {
    fn from(id: PaperId) -> Self {
        Self::One(id)
    }
}

impl From<Vec<PaperId>> for RelationTargets {
    fn from(ids: Vec<PaperId>) -> Self {
        Self::Many(ids)
    }
}

impl From<&[PaperId]> for RelationTargets {
    fn from(ids: &[PaperId]) -> Self {
        Self::Many(ids.to_vec())
    }
}

/// Maps paper ids to records and owns the collection's directory layout.
#[derive(Debug)]
pub struct CollectionIndex {
    root: PathBuf,
    papers_dir: PathBuf,
    notes_dir: PathBuf,
    data_dir: PathBuf,
    records: BTreeMap<PaperId, PaperRecord>,
}

impl CollectionIndex {
    /// Open a collection rooted at an existing directory, creating the
    /// `papers/`, `notes/` and `data/` subdirectories on first use.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RecordError::RootNotFound(root));
        }
        let papers_dir = root.join("papers");
        let notes_dir = root.join("notes");
        let data_dir = root.join("data");
        for dir in [&papers_dir, &notes_dir, &data_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            root,
            papers_dir,
            notes_dir,
            data_dir,
            records: BTreeMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn papers_dir(&self) -> &Path {
        &self.papers_dir
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<PaperId> {
        self.records.keys().copied().collect()
    }

    pub fn contains(&self, id: PaperId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn record(&self, id: PaperId) -> Result<&PaperRecord, RecordError> {
        self.records.get(&id).ok_or(RecordError::PaperNotFound(id))
    }

    pub fn record_mut(&mut self, id: PaperId) -> Result<&mut PaperRecord, RecordError> {
        self.records
            .get_mut(&id)
            .ok_or(RecordError::PaperNotFound(id))
    }

    fn next_id(&self) -> PaperId {
        self.records.keys().next_back().map_or(1, |max| max + 1)
    }

    /// File a PDF into the collection and attach a record for it. An
    /// unregistered PDF is renamed to `<id>_registered.pdf` under the next
    /// sequential id; a registered one is re-attached under its embedded
    /// id.
    pub fn register_paper(&mut self, pdf_name: &str, registered: bool) -> Result<PaperId, RecordError> {
        let file_name = if pdf_name.ends_with(".pdf") {
            pdf_name.to_string()
        } else {
            format!("{pdf_name}.pdf")
        };
        let path = self.papers_dir.join(&file_name);
        if !path.is_file() {
            return Err(RecordError::PdfNotFound(path));
        }

        let id = if registered {
            parse_registered_id(&file_name)?
        } else {
            let id = self.next_id();
            let new_path = self
                .papers_dir
                .join(format!("{id}{REGISTERED_SUFFIX}.pdf"));
            fs::rename(&path, new_path)?;
            id
        };

        let record = PaperRecord::open(
            id,
            self.data_dir.join(format!("{id}.csv")),
            self.notes_dir.join(format!("{id}.txt")),
        )?;
        self.records.insert(id, record);
        info!(id, file = %file_name, "registered paper");
        Ok(id)
    }

    /// Scan the papers directory and attach every PDF not yet in the
    /// index: first the already-registered files, then the unregistered
    /// ones (which get fresh ids). Returns the attached ids.
    pub fn discover_papers(&mut self) -> Result<Vec<PaperId>, RecordError> {
        let mut registered = Vec::new();
        let mut unregistered = Vec::new();
        for dir_entry in fs::read_dir(&self.papers_dir)? {
            let name = dir_entry?.file_name().to_string_lossy().into_owned();
            let Some(stem) = name.strip_suffix(".pdf") else {
                continue;
            };
            match stem
                .strip_suffix(REGISTERED_SUFFIX)
                .and_then(|id| id.parse::<PaperId>().ok())
            {
                Some(id) => {
                    if !self.records.contains_key(&id) {
                        registered.push(name.clone());
                    }
                }
                None => unregistered.push(name.clone()),
            }
        }
        registered.sort();
        unregistered.sort();

        let mut added = Vec::new();
        for name in registered {
            added.push(self.register_paper(&name, true)?);
        }
        for name in unregistered {
            added.push(self.register_paper(&name, false)?);
        }
        Ok(added)
    }

    pub fn set_bibtex(&mut self, id: PaperId, bibtex: &str) -> Result<(), RecordError> {
        self.record_mut(id)?.set_bibtex(bibtex)
    }

    /// Set the category on each of the given records.
    pub fn set_category(&mut self, ids: &[PaperId], category: &str) -> Result<(), RecordError> {
        for id in ids {
            self.record_mut(*id)?.set_category(category)?;
        }
        Ok(())
    }

    /// Add each keyword to each of the given records.
    pub fn add_keywords(&mut self, ids: &[PaperId], keywords: &[&str]) -> Result<(), RecordError> {
        for id in ids {
            let record = self.record_mut(*id)?;
            for keyword in keywords {
                record.add_keyword(keyword)?;
            }
        }
        Ok(())
    }

    /// Remove each keyword from each of the given records.
    pub fn del_keywords(&mut self, ids: &[PaperId], keywords: &[&str]) -> Result<(), RecordError> {
        for id in ids {
            let record = self.record_mut(*id)?;
            for keyword in keywords {
                record.del_keyword(keyword)?;
            }
        }
        Ok(())
    }

    /// Link `source` to each target with the label and note. Mutual links
    /// carry the same label both ways; one-way links mark the reverse side
    /// with the literal `BE ` prefix. The whole batch is validated before
    /// any record is touched; after that, pairwise application is
    /// independent (a duplicate-triple no-op on one pair does not abort
    /// the rest).
    pub fn add_relation_batch(
        &mut self,
        source: PaperId,
        targets: impl Into<RelationTargets>,
        mutual: bool,
        label: &str,
        note: &str,
    ) -> Result<(), RecordError> {
        let targets = targets.into().ids()?;
        relation::validate_text(label, note)?;
        for id in std::iter::once(&source).chain(targets.iter()) {
            if self.record(*id)?.bibtex().is_none() {
                return Err(RecordError::BibtexNotSet(*id));
            }
        }

        for target in targets {
            self.record_mut(source)?.add_relation(target, label, note)?;
            if mutual {
                self.record_mut(target)?.add_relation(source, label, note)?;
            } else {
                self.record_mut(target)?
                    .add_relation(source, &format!("BE {label}"), note)?;
            }
        }
        Ok(())
    }

    /// Ids of every record carrying the keyword.
    pub fn search_keyword(&self, keyword: &str) -> Vec<PaperId> {
        self.records
            .iter()
            .filter(|(_, record)| record.keywords().iter().any(|k| k == keyword))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every keyword in use across the collection, deduplicated, in
    /// first-seen order.
    pub fn all_keywords(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for record in self.records.values() {
            for keyword in record.keywords() {
                if !seen.iter().any(|k| k == keyword) {
                    seen.push(keyword.clone());
                }
            }
        }
        seen
    }

    /// Rename a keyword across every record; returns the ids that carried
    /// it.
    pub fn rename_keyword(&mut self, old: &str, new: &str) -> Result<Vec<PaperId>, RecordError> {
        let mut affected = Vec::new();
        for (id, record) in self.records.iter_mut() {
            if record.rename_keyword(old, new)? {
                affected.push(*id);
            }
        }
        Ok(affected)
    }

    /// Comma-joined citation keys for the given ids, for citing in a
    /// manuscript.
    pub fn citation_keys(&self, ids: &[PaperId]) -> Result<String, RecordError> {
        let mut keys = Vec::with_capacity(ids.len());
        for id in ids {
            let record = self.record(*id)?;
            keys.push(
                record
                    .key()
                    .ok_or(RecordError::BibtexNotSet(*id))?
                    .to_string(),
            );
        }
        Ok(keys.join(", "))
    }

    /// Id of the record carrying the citation key.
    pub fn id_for_key(&self, key: &str) -> Result<PaperId, RecordError> {
        self.records
            .iter()
            .find(|(_, record)| record.key() == Some(key))
            .map(|(id, _)| *id)
            .ok_or_else(|| RecordError::UnknownCitationKey(key.to_string()))
    }

    /// Concatenated raw bibtex of every record that has one, for
    /// bibliography export.
    pub fn bibliography(&self) -> String {
        let mut bib = String::new();
        for record in self.records.values() {
            if let Some(bibtex) = record.bibtex() {
                bib.push_str(bibtex);
                bib.push('\n');
            }
        }
        bib
    }

    /// Persist every record, sequentially.
    pub fn save_all(&mut self) -> Result<(), RecordError> {
        for record in self.records.values_mut() {
            record.save()?;
        }
        Ok(())
    }

    /// Reload every record from its store, sequentially.
    pub fn load_all(&mut self) -> Result<(), RecordError> {
        for record in self.records.values_mut() {
            record.load()?;
        }
        Ok(())
    }

    /// Human-readable summaries, one block per id; every record when `ids`
    /// is empty.
    pub fn summary(&self, ids: &[PaperId]) -> Result<String, RecordError> {
        let mut out = String::new();
        if ids.is_empty() {
            for record in self.records.values() {
                out.push_str(&record.to_string());
                out.push('\n');
            }
        } else {
            for id in ids {
                out.push_str(&self.record(*id)?.to_string());
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// Extract the id embedded in a `<id>_registered.pdf` file name.
fn parse_registered_id(file_name: &str) -> Result<PaperId, RecordError> {
    file_name
        .strip_suffix(".pdf")
        .and_then(|stem| stem.strip_suffix(REGISTERED_SUFFIX))
        .and_then(|id| id.parse::<PaperId>().ok())
        .ok_or_else(|| RecordError::InvalidFileName(file_name.to_string()))
}
