//! Core data models used throughout Note Linker.
//!
//! These types represent the notes, index records, cached embeddings, and
//! human review decisions that flow through indexing and ranking.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of `content` as 64 lowercase hex characters.
///
/// Content-pure: the same bytes always yield the same fingerprint no
/// matter which path they were read from.
///
/// ```rust
/// use note_linker_core::models::fingerprint;
///
/// let fp = fingerprint("hello");
/// assert_eq!(fp.len(), 64);
/// assert_eq!(fp, fingerprint("hello"));
/// ```
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Display title for a note path: the file stem.
pub fn title_from_path(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Orders two paths so the lexicographically smaller one comes first.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A note as read from the vault during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Path relative to the vault root, with `/` separators.
    pub path: String,
    pub content: String,
}

impl Note {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.content)
    }

    pub fn title(&self) -> String {
        title_from_path(&self.path)
    }
}

/// Last known indexed state of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRecord {
    pub path: String,
    pub fingerprint: String,
    pub indexed_at: DateTime<Utc>,
}

/// A cached embedding, keyed by content fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingEntry {
    pub fingerprint: String,
    pub vector: Vec<f32>,
    pub model: String,
    pub dims: usize,
    pub created_at: DateTime<Utc>,
}

/// Human verdict on a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Yes,
    No,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Yes => "YES",
            Verdict::No => "NO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "YES" | "Y" => Some(Verdict::Yes),
            "NO" | "N" => Some(Verdict::No),
            _ => None,
        }
    }
}

/// A recorded review of a pair, pinned to the fingerprints both notes had
/// when it was made. `path_a <= path_b` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub path_a: String,
    pub path_b: String,
    pub verdict: Verdict,
    pub hash_a: String,
    pub hash_b: String,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    /// Builds a decision in canonical order, swapping the hashes along with
    /// the paths when needed.
    pub fn new(
        path_a: &str,
        path_b: &str,
        verdict: Verdict,
        hash_a: &str,
        hash_b: &str,
    ) -> Self {
        let (pa, pb, ha, hb) = if path_a <= path_b {
            (path_a, path_b, hash_a, hash_b)
        } else {
            (path_b, path_a, hash_b, hash_a)
        };
        Self {
            path_a: pa.to_string(),
            path_b: pb.to_string(),
            verdict,
            hash_a: ha.to_string(),
            hash_b: hb.to_string(),
            decided_at: Utc::now(),
        }
    }

    /// A decision stays valid only while both notes still have the
    /// fingerprints it was recorded against.
    pub fn is_valid_for(&self, current_a: Option<&str>, current_b: Option<&str>) -> bool {
        current_a == Some(self.hash_a.as_str()) && current_b == Some(self.hash_b.as_str())
    }
}
