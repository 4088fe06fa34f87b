//! # Note Linker Core
//!
//! Shared, I/O-free logic for Note Linker: note fingerprinting, the
//! incremental index differ, the embedding cache contract, and the hybrid
//! (semantic + BM25) candidate-pair ranker.
//!
//! This crate contains no tokio, sqlx, or filesystem access. Persistence,
//! vault scanning, and concrete embedding backends live in the `note-linker`
//! app crate and reach the core only through the [`store::Store`],
//! [`embedding::EmbeddingProvider`], and [`lexical::LexicalScorer`] traits.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Notes, index records, cache entries, decisions |
//! | [`error`] | Typed error taxonomy |
//! | [`markdown`] | Markdown stripping and text preparation |
//! | [`links`] | `## Related` section parsing |
//! | [`embedding`] | Provider trait, BLOB codec, cosine matrix |
//! | [`lexical`] | Lexical scorer trait and BM25 implementation |
//! | [`ranking`] | Dense ranks and Reciprocal Rank Fusion |
//! | [`diff`] | New / changed / unchanged / deleted classification |
//! | [`store`] | Storage trait and in-memory backend |
//! | [`progress`] | Indexing phase events and observers |
//! | [`guard`] | Exclusive indexing-run guard |
//! | [`indexer`] | Incremental indexing orchestration |
//! | [`candidate`] | Candidate-pair generation and filtering |

pub mod candidate;
pub mod diff;
pub mod embedding;
pub mod error;
pub mod guard;
pub mod indexer;
pub mod lexical;
pub mod links;
pub mod markdown;
pub mod models;
pub mod progress;
pub mod ranking;
pub mod store;
