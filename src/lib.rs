//! # Note Linker
//!
//! Suggests which notes in a Markdown vault should link to each other.
//!
//! Indexing is incremental: each note is fingerprinted by content, only new
//! or changed notes are embedded, and vectors are cached by fingerprint so
//! renames and reverts cost nothing. Candidate pairs are ranked by fusing
//! semantic (cosine) and lexical (BM25) per-note rankings with Reciprocal
//! Rank Fusion, then pairs that already link both ways or were reviewed are
//! dropped.
//!
//! ## Quick Start
//!
//! ```bash
//! nlink init
//! nlink index
//! nlink candidates --limit 20
//! nlink decide "Ownership.md" "Borrowing.md" yes
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | tracing subscriber setup |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `Store` backend |
//! | [`scanner`] | Vault scanning |
//! | [`embedding`] | Embedding providers |
//! | [`progress`] | Indexing progress reporters |
//! | [`lock`] | Cross-process index lock |
//!
//! The pipeline itself lives in `note_linker_core`.

pub mod candidates_cmd;
pub mod config;
pub mod db;
pub mod decide_cmd;
pub mod embedding;
pub mod index_cmd;
pub mod lock;
pub mod logging;
pub mod migrate;
pub mod progress;
pub mod scanner;
pub mod sqlite_store;
pub mod status_cmd;
