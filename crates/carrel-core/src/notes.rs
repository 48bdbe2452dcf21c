//! The sentinel-delimited notes/relations stream
//!
//! Notes and rendered relations share one text file per record. The two
//! halves have opposite sources of truth: notes are read back from disk
//! (hand edits are welcome), while relation lines are regenerated from the
//! in-memory triples on every save and never read back. Do not symmetrize
//! this codec.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RecordError;
use crate::relation::Relation;

/// Sentinel line terminating every fragment in the stream.
pub const SPLIT_LINE: &str = "THIS IS A SPLIT LINE";

/// Fragments starting with this prefix are relation renderings, not notes.
pub const RELATION_PREFIX: &str = "RELATION ";

/// Extract the notes from a raw stream, in order. Blank fragments and
/// relation renderings are discarded.
pub fn decode_notes(stream: &str) -> Vec<String> {
    let sentinel_line = format!("{SPLIT_LINE}\n");
    stream
        .split(sentinel_line.as_str())
        .filter(|fragment| !fragment.trim().is_empty() && !fragment.starts_with(RELATION_PREFIX))
        .map(|fragment| fragment.trim_end_matches('\n').to_string())
        .collect()
}

/// Render the full stream: notes first, then one `RELATION <label> to
/// <target>: <note>` line per in-memory triple.
pub fn encode_stream(notes: &[String], relations: &[Relation]) -> String {
    let mut out = String::new();
    for note in notes {
        out.push_str(note);
        out.push('\n');
        out.push_str(SPLIT_LINE);
        out.push('\n');
    }
    for relation in relations {
        out.push_str(&format!(
            "{RELATION_PREFIX}{} to {}: {}\n",
            relation.label, relation.target, relation.note
        ));
        out.push_str(SPLIT_LINE);
        out.push('\n');
    }
    out
}

/// A record's private notes stream location.
#[derive(Debug, Clone)]
pub struct NotesFile {
    path: PathBuf,
}

impl NotesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty stream if none exists yet.
    pub fn ensure_exists(&self) -> Result<(), RecordError> {
        if !self.path.exists() {
            fs::write(&self.path, "")?;
        }
        Ok(())
    }

    /// Read the notes back from disk, discarding relation renderings.
    pub fn read(&self) -> Result<Vec<String>, RecordError> {
        Ok(decode_notes(&fs::read_to_string(&self.path)?))
    }

    /// Rewrite the whole stream from in-memory state.
    pub fn write(&self, notes: &[String], relations: &[Relation]) -> Result<(), RecordError> {
        fs::write(&self.path, encode_stream(notes, relations))?;
        Ok(())
    }
}
