//! Classify a vault snapshot against the stored index.
//!
//! Every scanned note is `new` (no record), `changed` (record with a
//! different fingerprint) or `unchanged`. Every record whose path is no
//! longer in the snapshot is `deleted`. The four sets are disjoint, and
//! each keeps the path-sorted order of its input.

use std::collections::{HashMap, HashSet};

use crate::models::{Note, NoteRecord};

/// A scanned note paired with its freshly computed fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintedNote {
    pub path: String,
    pub content: String,
    pub fingerprint: String,
}

impl From<&Note> for FingerprintedNote {
    fn from(note: &Note) -> Self {
        Self {
            path: note.path.clone(),
            content: note.content.clone(),
            fingerprint: note.fingerprint(),
        }
    }
}

/// Result of [`classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDiff {
    pub new: Vec<FingerprintedNote>,
    pub changed: Vec<FingerprintedNote>,
    pub unchanged: Vec<FingerprintedNote>,
    pub deleted: Vec<String>,
}

impl IndexDiff {
    /// Notes that need an embedding: new followed by changed, path-sorted.
    pub fn to_embed(&self) -> Vec<&FingerprintedNote> {
        let mut notes: Vec<&FingerprintedNote> =
            self.new.iter().chain(self.changed.iter()).collect();
        notes.sort_by(|a, b| a.path.cmp(&b.path));
        notes
    }

    pub fn needs_indexing(&self) -> usize {
        self.new.len() + self.changed.len()
    }
}

/// Compare `snapshot` with the stored `records`.
pub fn classify(snapshot: &[Note], records: &[NoteRecord]) -> IndexDiff {
    let stored: HashMap<&str, &str> = records
        .iter()
        .map(|r| (r.path.as_str(), r.fingerprint.as_str()))
        .collect();

    let mut sorted: Vec<&Note> = snapshot.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut diff = IndexDiff::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(sorted.len());
    for note in sorted {
        seen.insert(note.path.as_str());
        let fp = FingerprintedNote::from(note);
        match stored.get(note.path.as_str()) {
            None => diff.new.push(fp),
            Some(old) if *old != fp.fingerprint => diff.changed.push(fp),
            Some(_) => diff.unchanged.push(fp),
        }
    }

    let mut deleted: Vec<String> = records
        .iter()
        .filter(|r| !seen.contains(r.path.as_str()))
        .map(|r| r.path.clone())
        .collect();
    deleted.sort();
    diff.deleted = deleted;

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fingerprint;
    use chrono::Utc;

    fn record(path: &str, content: &str) -> NoteRecord {
        NoteRecord {
            path: path.to_string(),
            fingerprint: fingerprint(content),
            indexed_at: Utc::now(),
        }
    }

    #[test]
    fn test_classifies_all_four_sets() {
        let snapshot = vec![
            Note::new("new.md", "fresh"),
            Note::new("changed.md", "after"),
            Note::new("same.md", "stable"),
        ];
        let records = vec![
            record("changed.md", "before"),
            record("same.md", "stable"),
            record("gone.md", "whatever"),
        ];

        let diff = classify(&snapshot, &records);
        assert_eq!(diff.new.len(), 1);
        assert_eq!(diff.new[0].path, "new.md");
        assert_eq!(diff.changed[0].path, "changed.md");
        assert_eq!(diff.unchanged[0].path, "same.md");
        assert_eq!(diff.deleted, vec!["gone.md".to_string()]);
        assert_eq!(diff.needs_indexing(), 2);
    }

    #[test]
    fn test_to_embed_is_path_sorted() {
        let snapshot = vec![Note::new("b.md", "b2"), Note::new("a.md", "a"), Note::new("c.md", "c")];
        let records = vec![record("b.md", "b1")];
        let diff = classify(&snapshot, &records);
        let paths: Vec<&str> = diff.to_embed().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_empty_inputs() {
        let diff = classify(&[], &[]);
        assert_eq!(diff, IndexDiff::default());
    }

    #[test]
    fn test_deterministic() {
        let snapshot = vec![Note::new("x.md", "1"), Note::new("y.md", "2")];
        let records = vec![record("x.md", "0")];
        assert_eq!(classify(&snapshot, &records), classify(&snapshot, &records));
    }
}
