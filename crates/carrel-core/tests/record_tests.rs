//! Paper record integration tests: ingestion, mutators, and the
//! save/load round-trip against real files.

use std::fs;
use std::path::Path;

use carrel_core::{
    AttrRow, AttributeStore, EntryType, PaperRecord, RecordError,
};

fn open_record(dir: &Path, id: u64) -> PaperRecord {
    PaperRecord::open(
        id,
        dir.join(format!("{id}.csv")),
        dir.join(format!("{id}.txt")),
    )
    .unwrap()
}

const ARTICLE: &str = r#"
@article{vaswani2017,
    author = {Vaswani et al.},
    title = {Attention Is All You Need},
    journal = {NeurIPS},
    year = {2017},
    volume = {30},
}
"#;

// === Ingestion ===

#[test]
fn ingestion_populates_active_attrs() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();

    assert_eq!(record.entry(), Some(EntryType::Article));
    assert_eq!(record.key(), Some("vaswani2017"));
    assert_eq!(record.title(), Some("Attention Is All You Need"));
    assert_eq!(record.field("volume"), Some("30"));

    for name in ["paper_id", "bibtex", "entry", "key", "author", "title", "journal", "year", "volume"] {
        assert!(record.is_active(name), "{name} should be active");
    }
    assert!(!record.is_active("keywords"));
    assert!(!record.is_active("category"));
}

#[test]
fn ingestion_rejects_unrecognized_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    let before = record.active_attrs().clone();

    let err = record
        .set_bibtex("@article{k1, author={A}, title={T}, journal={J}, year={2020}, wrongfield={x}}")
        .unwrap_err();
    match err {
        RecordError::UnrecognizedField { field, entry } => {
            assert_eq!(field, "wrongfield");
            assert_eq!(entry, EntryType::Article);
        }
        other => panic!("expected UnrecognizedField, got {other}"),
    }

    // the failed attempt left the record untouched
    assert_eq!(record.active_attrs(), &before);
    assert_eq!(record.bibtex(), None);
    assert_eq!(record.entry(), None);
}

#[test]
fn ingestion_names_missing_required_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    let err = record
        .set_bibtex("@article{k1, author={A}, title={T}}")
        .unwrap_err();
    match err {
        RecordError::MissingRequiredFields { entry, missing } => {
            assert_eq!(entry, EntryType::Article);
            assert_eq!(missing, vec!["journal".to_string(), "year".to_string()]);
        }
        other => panic!("expected MissingRequiredFields, got {other}"),
    }
    assert_eq!(record.bibtex(), None);
}

#[test]
fn ingestion_accepts_misc_with_no_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex("@misc{stray2021, }").unwrap();
    assert_eq!(record.entry(), Some(EntryType::Misc));
    assert_eq!(record.key(), Some("stray2021"));
}

#[test]
fn reingestion_resets_all_derived_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.set_category("survey").unwrap();
    record.add_keyword("transformers").unwrap();
    record.add_relation(2, "cites", "background").unwrap();

    record
        .set_bibtex("@misc{other2020, title = {Something Else}}")
        .unwrap();
    assert_eq!(record.key(), Some("other2020"));
    assert_eq!(record.entry(), Some(EntryType::Misc));
    assert_eq!(record.category(), None);
    assert!(record.keywords().is_empty());
    assert!(record.relations().is_empty());
    assert!(!record.is_active("keywords"));
    assert!(!record.is_active("category"));
    assert!(!record.is_active("relations"));
    assert!(!record.is_active("journal"));
}

// === Mutator guards ===

#[test]
fn mutators_require_bibtex() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    assert!(matches!(
        record.set_category("survey"),
        Err(RecordError::BibtexNotSet(1))
    ));
    assert!(matches!(
        record.add_keyword("x"),
        Err(RecordError::BibtexNotSet(1))
    ));
    assert!(matches!(
        record.add_relation(2, "cites", "n"),
        Err(RecordError::BibtexNotSet(1))
    ));
    assert!(matches!(record.save(), Err(RecordError::BibtexNotSet(1))));
}

#[test]
fn category_whitelist() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();

    assert!(matches!(
        record.set_category("novel"),
        Err(RecordError::InvalidCategory(cat)) if cat == "novel"
    ));
    record.set_category("survey").unwrap();
    record.set_category("survey").unwrap();
    assert_eq!(record.category(), Some("survey"));
}

#[test]
fn add_keyword_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();

    record.add_keyword("attention").unwrap();
    record.add_keyword("attention").unwrap();
    record.add_keyword("nlp").unwrap();
    assert_eq!(record.keywords(), ["attention", "nlp"]);

    record.del_keyword("attention").unwrap();
    record.del_keyword("attention").unwrap(); // absent: notice, not error
    assert_eq!(record.keywords(), ["nlp"]);
}

#[test]
fn keywords_reject_encoding_delimiters() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    assert!(matches!(
        record.add_keyword("deep,learning"),
        Err(RecordError::InvalidKeywordText(_))
    ));
}

#[test]
fn add_relation_distinguishes_triples() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();

    record.add_relation(2, "cites", "intro").unwrap();
    record.add_relation(2, "cites", "intro").unwrap(); // exact repeat: no-op
    record.add_relation(2, "cites", "related work").unwrap();
    record.add_relation(2, "extends", "intro").unwrap();
    assert_eq!(record.relations().len(), 3);
}

#[test]
fn relation_label_may_not_contain_store_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    assert!(matches!(
        record.add_relation(2, "follows_up", "x"),
        Err(RecordError::InvalidRelationText { .. })
    ));
    assert!(record.relations().is_empty());
}

// === Persistence ===

#[test]
fn save_then_load_is_a_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.set_category("survey").unwrap();
    record.add_keyword("attention").unwrap();
    record.add_keyword("nlp").unwrap();
    record.add_relation(3, "cites", "see_eq_4").unwrap();
    record.add_relation(4, "extends", "sequel").unwrap();

    let active = record.active_attrs().clone();
    let keywords = record.keywords().to_vec();
    let relations = record.relations().to_vec();

    record.save().unwrap();
    record.load().unwrap();

    assert_eq!(record.active_attrs(), &active);
    assert_eq!(record.keywords(), keywords.as_slice());
    assert_eq!(record.relations(), relations.as_slice());
    assert_eq!(record.bibtex(), Some(ARTICLE));
    assert_eq!(record.entry(), Some(EntryType::Article));
    assert_eq!(record.key(), Some("vaswani2017"));
    assert_eq!(record.title(), Some("Attention Is All You Need"));
    assert_eq!(record.category(), Some("survey"));
}

#[test]
fn underscored_note_survives_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.add_relation(3, "cites", "see_eq_4").unwrap();
    record.save().unwrap();
    record.load().unwrap();

    let relation = &record.relations()[0];
    assert_eq!(relation.target, 3);
    assert_eq!(relation.label, "cites");
    assert_eq!(relation.note, "see_eq_4");
}

#[test]
fn load_replaces_rather_than_merges() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.add_keyword("saved").unwrap();
    record.save().unwrap();

    record.add_keyword("unsaved").unwrap();
    record.load().unwrap();
    assert_eq!(record.keywords(), ["saved"]);
}

#[test]
fn emptied_keywords_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.add_keyword("temp").unwrap();
    record.del_keyword("temp").unwrap();
    record.save().unwrap();
    record.load().unwrap();
    assert!(record.keywords().is_empty());
    assert!(record.is_active("keywords"));
}

#[test]
fn load_rejects_illegal_attribute_names_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.add_keyword("kept").unwrap();
    record.save().unwrap();

    // tamper with the store behind the record's back
    let store = AttributeStore::new(dir.path().join("1.csv"));
    let mut rows = store.read_rows().unwrap();
    rows.push(AttrRow::new("colour", "blue"));
    store.write_rows(&rows).unwrap();

    let err = record.load().unwrap_err();
    assert!(matches!(err, RecordError::IllegalAttributeName(name) if name == "colour"));

    // the failed load left in-memory state intact
    assert_eq!(record.keywords(), ["kept"]);
    assert_eq!(record.title(), Some("Attention Is All You Need"));
    assert!(record.is_active("keywords"));
}

#[test]
fn fresh_record_loads_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.add_keyword("attention").unwrap();
    record.add_relation(2, "cites", "x").unwrap();
    record.save().unwrap();
    drop(record);

    let mut reopened = open_record(dir.path(), 1);
    reopened.load().unwrap();
    assert_eq!(reopened.key(), Some("vaswani2017"));
    assert_eq!(reopened.keywords(), ["attention"]);
    assert_eq!(reopened.relations().len(), 1);
}

// === Notes stream ===

#[test]
fn notes_are_read_from_disk_on_open() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("1.txt"),
        "hand-written thought\nTHIS IS A SPLIT LINE\n",
    )
    .unwrap();
    let record = open_record(dir.path(), 1);
    assert_eq!(record.notes(), ["hand-written thought"]);
}

#[test]
fn save_mirrors_relations_into_the_notes_stream() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.add_note("read this twice");
    record.add_relation(2, "extends", "the encoder").unwrap();
    record.save().unwrap();

    let stream = fs::read_to_string(dir.path().join("1.txt")).unwrap();
    assert!(stream.contains("read this twice\nTHIS IS A SPLIT LINE\n"));
    assert!(stream.contains("RELATION extends to 2: the encoder\nTHIS IS A SPLIT LINE\n"));
}

#[test]
fn hand_edited_relation_lines_are_never_authoritative() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.add_note("genuine note");
    record.save().unwrap();

    // hand-edit: a forged relation line and a genuine extra note
    let path = dir.path().join("1.txt");
    let mut stream = fs::read_to_string(&path).unwrap();
    stream.push_str("RELATION forged to 9: nope\nTHIS IS A SPLIT LINE\n");
    stream.push_str("late addition\nTHIS IS A SPLIT LINE\n");
    fs::write(&path, stream).unwrap();

    record.save().unwrap();
    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(!rewritten.contains("forged"));
    assert!(rewritten.contains("late addition"));
    assert_eq!(record.notes(), ["genuine note", "late addition"]);
    assert!(record.relations().is_empty());
}

// === Summary ===

#[test]
fn summary_shows_category_prefix_and_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = open_record(dir.path(), 1);
    record.set_bibtex(ARTICLE).unwrap();
    record.set_category("survey").unwrap();
    record.add_keyword("attention").unwrap();
    record.add_note("dense but worth it");
    record.add_relation(2, "extends", "the encoder").unwrap();

    let summary = record.to_string();
    assert!(summary.contains("Paper 1: [survey] Attention Is All You Need"));
    assert!(summary.contains("Keywords: attention"));
    assert!(summary.contains("Notes:\ndense but worth it"));
    assert!(summary.contains("Relations:\nextends to 2: the encoder"));
}

#[test]
fn summary_without_bibtex_is_harmless() {
    let dir = tempfile::tempdir().unwrap();
    let record = open_record(dir.path(), 7);
    assert!(record.to_string().contains("Paper 7"));
}
