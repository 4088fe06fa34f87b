//! Lexical (keyword) similarity between notes.
//!
//! [`Bm25Scorer`] wraps the [`bm25`](https://crates.io/crates/bm25) crate:
//! every note's prepared text is indexed, then each note in turn is issued
//! as a query against the whole corpus. The result is an N×N matrix where
//! row `i` holds the BM25 relevance of every note to note `i`.
//!
//! Scoring uses English tokenization, stemming, and stop-word removal.
//! Notes sharing no terms with the query score 0, and the diagonal
//! (a note against itself) is forced to 0.

use bm25::{Document, Language, SearchEngineBuilder};
use tracing::debug;

use crate::error::LinkerError;

/// Produces a pairwise lexical score matrix over a corpus.
pub trait LexicalScorer: Send + Sync {
    /// Score every text against every other text.
    ///
    /// # Errors
    ///
    /// [`LinkerError::EmptyLexicalCorpus`] when `texts` is empty.
    fn score_matrix(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, LinkerError>;
}

/// BM25 lexical scorer over English text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bm25Scorer;

impl Bm25Scorer {
    pub fn new() -> Self {
        Self
    }
}

impl LexicalScorer for Bm25Scorer {
    fn score_matrix(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, LinkerError> {
        if texts.is_empty() {
            return Err(LinkerError::EmptyLexicalCorpus);
        }

        let n = texts.len();
        let documents: Vec<Document<u64>> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document {
                id: i as u64,
                contents: text.clone(),
            })
            .collect();
        let engine = SearchEngineBuilder::<u64>::with_documents(Language::English, documents).build();

        let mut matrix = vec![vec![0.0f64; n]; n];
        for (i, query) in texts.iter().enumerate() {
            for result in engine.search(query, n) {
                let j = result.document.id as usize;
                if j != i && j < n {
                    matrix[i][j] = result.score as f64;
                }
            }
        }

        debug!(documents = n, "built BM25 score matrix");
        Ok(matrix)
    }
}
