//! Hybrid candidate-pair ranking.
//!
//! # Algorithm
//!
//! 1. Load every index record whose fingerprint has a cached embedding.
//!    Notes without an embedding are left out entirely.
//! 2. Build the N×N cosine similarity matrix over their embeddings.
//! 3. Build the N×N BM25 matrix over their prepared texts (diagonal 0).
//! 4. Rank each row of both matrices (1 = best, self excluded).
//! 5. For each unordered pair `{i, j}`, compute RRF from both sides and
//!    keep the larger value as the pair's score.
//! 6. Drop pairs whose notes link to each other under `## Related`.
//! 7. Drop pairs with a decision recorded against both notes' current
//!    fingerprints.
//! 8. Sort by score, highest first. Ties keep discovery order.
//!
//! Fewer than two rankable notes produce an empty result.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::embedding::similarity_matrix;
use crate::error::LinkerError;
use crate::lexical::LexicalScorer;
use crate::links::mutual_link_pairs;
use crate::markdown::prepare_note_text;
use crate::models::{fingerprint, title_from_path, Decision, Note};
use crate::ranking::{rank_matrix, rrf_score, DEFAULT_RRF_K};
use crate::store::Store;

/// A suggested link between two notes. `note_a_path < note_b_path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePair {
    pub note_a_path: String,
    pub note_b_path: String,
    pub semantic_similarity: f64,
    pub semantic_rank_a_to_b: usize,
    pub semantic_rank_b_to_a: usize,
    pub lexical_score_a_to_b: f64,
    pub lexical_score_b_to_a: f64,
    pub lexical_rank_a_to_b: usize,
    pub lexical_rank_b_to_a: usize,
    pub rrf_score: f64,
}

impl CandidatePair {
    pub fn pair_key(&self) -> (&str, &str) {
        (&self.note_a_path, &self.note_b_path)
    }

    /// One-line summary of the scores behind the suggestion.
    pub fn explanation(&self) -> String {
        format!(
            "Semantic similarity: {:.2} | BM25 score: {:.1} | RRF score: {:.4}",
            self.semantic_similarity,
            self.lexical_score_a_to_b.max(self.lexical_score_b_to_a),
            self.rrf_score
        )
    }
}

/// Output of one ranking run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateReport {
    pub candidates: Vec<CandidatePair>,
    pub notes_ranked: usize,
    pub pairs_considered: usize,
    pub removed_linked: usize,
    pub removed_decided: usize,
}

/// Fuse semantic and lexical score matrices into one pair per `{i, j}`.
///
/// `paths[i]` names row/column `i` of both matrices. Pairs come back in
/// row-major discovery order (`i < j`), unsorted and unfiltered.
pub fn fuse_pairs(
    paths: &[String],
    semantic: &[Vec<f64>],
    lexical: &[Vec<f64>],
    k: u32,
) -> Result<Vec<CandidatePair>, LinkerError> {
    let n = paths.len();
    let sem_ranks = rank_matrix(semantic);
    let lex_ranks = rank_matrix(lexical);

    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let rrf_ij = rrf_score(sem_ranks[i][j], lex_ranks[i][j], k)?;
            let rrf_ji = rrf_score(sem_ranks[j][i], lex_ranks[j][i], k)?;
            let (a, b) = if paths[i] <= paths[j] { (i, j) } else { (j, i) };
            pairs.push(CandidatePair {
                note_a_path: paths[a].clone(),
                note_b_path: paths[b].clone(),
                semantic_similarity: semantic[a][b],
                semantic_rank_a_to_b: sem_ranks[a][b],
                semantic_rank_b_to_a: sem_ranks[b][a],
                lexical_score_a_to_b: lexical[a][b],
                lexical_score_b_to_a: lexical[b][a],
                lexical_rank_a_to_b: lex_ranks[a][b],
                lexical_rank_b_to_a: lex_ranks[b][a],
                rrf_score: rrf_ij.max(rrf_ji),
            });
        }
    }
    Ok(pairs)
}

/// Decisions that still match the notes' current fingerprints.
pub fn valid_decisions<'a>(
    decisions: &'a [Decision],
    current: &HashMap<String, String>,
) -> Vec<&'a Decision> {
    decisions
        .iter()
        .filter(|d| {
            d.is_valid_for(
                current.get(&d.path_a).map(String::as_str),
                current.get(&d.path_b).map(String::as_str),
            )
        })
        .collect()
}

/// Ranks candidate pairs over the indexed notes.
#[derive(Clone)]
pub struct CandidateRanker {
    store: Arc<dyn Store>,
    scorer: Arc<dyn LexicalScorer>,
    rrf_k: u32,
}

impl CandidateRanker {
    pub fn new(store: Arc<dyn Store>, scorer: Arc<dyn LexicalScorer>) -> Self {
        Self {
            store,
            scorer,
            rrf_k: DEFAULT_RRF_K,
        }
    }

    pub fn with_rrf_k(mut self, k: u32) -> Self {
        self.rrf_k = k;
        self
    }

    /// Rank candidates. `snapshot` supplies the current note contents used
    /// for lexical scoring, link parsing, and decision validity.
    pub async fn rank(&self, snapshot: &[Note]) -> Result<CandidateReport> {
        let records = self.store.list_notes().await?;
        let embeddings = self.store.all_embeddings().await?;

        let (paths, vectors): (Vec<String>, Vec<Vec<f32>>) = records
            .iter()
            .filter_map(|r| {
                embeddings
                    .get(&r.fingerprint)
                    .map(|v| (r.path.clone(), v.clone()))
            })
            .unzip();

        if paths.len() < 2 {
            info!(notes = paths.len(), "not enough embedded notes to rank");
            return Ok(CandidateReport {
                notes_ranked: paths.len(),
                ..CandidateReport::default()
            });
        }

        let contents: HashMap<String, String> = snapshot
            .iter()
            .map(|n| (n.path.clone(), n.content.clone()))
            .collect();
        let texts: Vec<String> = paths
            .iter()
            .map(|p| {
                let content = contents.get(p).map(String::as_str).unwrap_or("");
                prepare_note_text(&title_from_path(p), content)
            })
            .collect();

        let semantic = similarity_matrix(&vectors)?;
        let lexical = self.scorer.score_matrix(&texts)?;
        let pairs = fuse_pairs(&paths, &semantic, &lexical, self.rrf_k)?;
        let pairs_considered = pairs.len();

        let linked = mutual_link_pairs(&contents);
        let before = pairs.len();
        let pairs: Vec<CandidatePair> = pairs
            .into_iter()
            .filter(|p| {
                !linked.contains(&(p.note_a_path.clone(), p.note_b_path.clone()))
            })
            .collect();
        let removed_linked = before - pairs.len();
        debug!(removed = removed_linked, "filtered linked pairs");

        let current: HashMap<String, String> = contents
            .iter()
            .map(|(p, c)| (p.clone(), fingerprint(c)))
            .collect();
        let decisions = self.store.list_decisions().await?;
        let decided: HashSet<(&str, &str)> = valid_decisions(&decisions, &current)
            .into_iter()
            .map(|d| (d.path_a.as_str(), d.path_b.as_str()))
            .collect();
        let before = pairs.len();
        let mut candidates: Vec<CandidatePair> = pairs
            .into_iter()
            .filter(|p| !decided.contains(&p.pair_key()))
            .collect();
        let removed_decided = before - candidates.len();
        debug!(removed = removed_decided, "filtered decided pairs");

        candidates.sort_by(|a, b| b.rrf_score.total_cmp(&a.rrf_score));

        info!(
            notes = paths.len(),
            candidates = candidates.len(),
            removed_linked,
            removed_decided,
            "ranked candidates"
        );

        Ok(CandidateReport {
            candidates,
            notes_ranked: paths.len(),
            pairs_considered,
            removed_linked,
            removed_decided,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::Bm25Scorer;
    use crate::models::Verdict;
    use crate::store::memory::InMemoryStore;

    async fn seed(store: &InMemoryStore, notes: &[(&str, &str, Vec<f32>)]) -> Vec<Note> {
        for (path, content, vector) in notes {
            let fp = fingerprint(content);
            store.upsert_note(path, &fp).await.unwrap();
            store
                .save_embeddings(&[fp], &[vector.clone()], "test", vector.len())
                .await
                .unwrap();
        }
        notes
            .iter()
            .map(|(p, c, _)| Note::new(*p, *c))
            .collect()
    }

    fn ranker(store: &Arc<InMemoryStore>) -> CandidateRanker {
        CandidateRanker::new(store.clone(), Arc::new(Bm25Scorer::new()))
    }

    const OWNERSHIP: &str = "Rust ownership and borrowing rules keep lifetimes safe, no allocator tricks";
    const BORROWING: &str = "Rust borrowing and ownership rules, lifetimes and the compiler";

    /// Two near-identical notes plus two unrelated ones. Each unrelated note
    /// leans semantically toward one of the pair and lexically toward the
    /// other, so none of its pairs gets rank 1 on both signals.
    async fn four_notes(store: &InMemoryStore) -> Vec<Note> {
        seed(
            store,
            &[
                ("ownership.md", OWNERSHIP, vec![1.0, 0.0, 0.0, 0.0]),
                ("borrowing.md", BORROWING, vec![0.99, 0.1, 0.0, 0.0]),
                ("sourdough.md", "Sourdough bread with a wild starter, no compiler needed", vec![0.3, 0.0, 1.0, 0.0]),
                ("hiking.md", "Alpine trails above the tree line, an allocator of breath", vec![0.0, 0.3, 0.0, 1.0]),
            ],
        )
        .await
    }

    #[tokio::test]
    async fn test_similar_pair_ranks_first() {
        let store = Arc::new(InMemoryStore::new());
        let snapshot = four_notes(&store).await;

        let report = ranker(&store).rank(&snapshot).await.unwrap();

        assert_eq!(report.notes_ranked, 4);
        assert_eq!(report.pairs_considered, 6);
        assert_eq!(report.candidates.len(), 6);
        let top = &report.candidates[0];
        assert_eq!(top.pair_key(), ("borrowing.md", "ownership.md"));
        assert!((top.rrf_score - 2.0 / 61.0).abs() < 1e-12);

        let unrelated = report
            .candidates
            .iter()
            .find(|p| p.pair_key() == ("hiking.md", "sourdough.md"))
            .unwrap();
        assert!(top.rrf_score > unrelated.rrf_score);
    }

    #[tokio::test]
    async fn test_three_note_scenario() {
        let store = Arc::new(InMemoryStore::new());
        // The unrelated note leans semantically to one and lexically to the
        // other, so neither of its pairs gets a (1, 1) rank.
        let snapshot = seed(
            &store,
            &[
                ("a.md", "rust ownership borrowing lifetimes", vec![1.0, 0.0, 0.05]),
                ("b.md", "rust ownership borrowing compiler", vec![1.0, 0.01, 0.0]),
                ("c.md", "baking bread compiler", vec![0.1, 0.0, 1.0]),
            ],
        )
        .await;

        let report = ranker(&store).rank(&snapshot).await.unwrap();

        let top = &report.candidates[0];
        assert_eq!(top.pair_key(), ("a.md", "b.md"));
        for pair in report.candidates.iter().skip(1) {
            assert!(pair.note_a_path == "c.md" || pair.note_b_path == "c.md");
            assert!(top.rrf_score > pair.rrf_score);
        }
    }

    #[tokio::test]
    async fn test_pairs_are_canonical_and_unique() {
        let store = Arc::new(InMemoryStore::new());
        let snapshot = four_notes(&store).await;
        let report = ranker(&store).rank(&snapshot).await.unwrap();

        let mut keys: Vec<(String, String)> = report
            .candidates
            .iter()
            .map(|p| (p.note_a_path.clone(), p.note_b_path.clone()))
            .collect();
        assert!(keys.iter().all(|(a, b)| a < b));
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }

    #[tokio::test]
    async fn test_scores_sorted_descending() {
        let store = Arc::new(InMemoryStore::new());
        let snapshot = four_notes(&store).await;
        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert!(report
            .candidates
            .windows(2)
            .all(|w| w[0].rrf_score >= w[1].rrf_score));
    }

    #[tokio::test]
    async fn test_mutually_linked_pair_removed() {
        let store = Arc::new(InMemoryStore::new());
        let own = format!("{}\n\n## Related\n- [borrowing](<borrowing.md>)\n", OWNERSHIP);
        let bor = format!("{}\n\n## Related\n- [ownership](<ownership.md>)\n", BORROWING);
        let snapshot = seed(
            &store,
            &[
                ("ownership.md", own.as_str(), vec![1.0, 0.0]),
                ("borrowing.md", bor.as_str(), vec![0.99, 0.1]),
                ("other.md", "unrelated words entirely", vec![0.0, 1.0]),
            ],
        )
        .await;

        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert_eq!(report.removed_linked, 1);
        assert!(report
            .candidates
            .iter()
            .all(|p| p.pair_key() != ("borrowing.md", "ownership.md")));
    }

    #[tokio::test]
    async fn test_mutually_linked_crlf_pair_removed() {
        let store = Arc::new(InMemoryStore::new());
        let own = format!(
            "{}\r\n\r\n## Related\r\n- [borrowing](<borrowing.md>)\r\n",
            OWNERSHIP
        );
        let bor = format!(
            "{}\r\n\r\n## Related\r\n- [ownership](<ownership.md>)\r\n",
            BORROWING
        );
        let snapshot = seed(
            &store,
            &[
                ("ownership.md", own.as_str(), vec![1.0, 0.0]),
                ("borrowing.md", bor.as_str(), vec![0.99, 0.1]),
                ("other.md", "unrelated words entirely", vec![0.0, 1.0]),
            ],
        )
        .await;

        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert_eq!(report.removed_linked, 1);
        assert!(report
            .candidates
            .iter()
            .all(|p| p.pair_key() != ("borrowing.md", "ownership.md")));
    }

    #[tokio::test]
    async fn test_one_way_link_not_removed() {
        let store = Arc::new(InMemoryStore::new());
        let own = format!("{}\n\n## Related\n- [borrowing](<borrowing.md>)\n", OWNERSHIP);
        let snapshot = seed(
            &store,
            &[
                ("ownership.md", own.as_str(), vec![1.0, 0.0]),
                ("borrowing.md", BORROWING, vec![0.99, 0.1]),
            ],
        )
        .await;

        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert_eq!(report.removed_linked, 0);
        assert_eq!(report.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_decided_pair_removed_until_content_changes() {
        let store = Arc::new(InMemoryStore::new());
        let mut snapshot = four_notes(&store).await;
        store
            .save_decision(&Decision::new(
                "ownership.md",
                "borrowing.md",
                Verdict::No,
                &fingerprint(OWNERSHIP),
                &fingerprint(BORROWING),
            ))
            .await
            .unwrap();

        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert_eq!(report.removed_decided, 1);
        assert!(report
            .candidates
            .iter()
            .all(|p| p.pair_key() != ("borrowing.md", "ownership.md")));

        snapshot[0].content.push_str("\nA new paragraph.");
        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert_eq!(report.removed_decided, 0);
        assert_eq!(report.candidates[0].pair_key(), ("borrowing.md", "ownership.md"));
    }

    #[tokio::test]
    async fn test_notes_without_embeddings_excluded() {
        let store = Arc::new(InMemoryStore::new());
        let mut snapshot = seed(
            &store,
            &[
                ("a.md", "first", vec![1.0, 0.0]),
                ("b.md", "second", vec![0.0, 1.0]),
            ],
        )
        .await;
        store.upsert_note("c.md", &fingerprint("third")).await.unwrap();
        snapshot.push(Note::new("c.md", "third"));

        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert_eq!(report.notes_ranked, 2);
        assert_eq!(report.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_fewer_than_two_notes_is_empty() {
        let store = Arc::new(InMemoryStore::new());
        let snapshot = seed(&store, &[("only.md", "alone", vec![1.0])]).await;
        let report = ranker(&store).rank(&snapshot).await.unwrap();
        assert!(report.candidates.is_empty());
        assert_eq!(report.notes_ranked, 1);

        let empty = Arc::new(InMemoryStore::new());
        assert!(ranker(&empty).rank(&[]).await.unwrap().candidates.is_empty());
    }

    #[test]
    fn test_fuse_pairs_takes_max_direction() {
        let paths = vec!["b.md".to_string(), "a.md".to_string(), "c.md".to_string()];
        let semantic = vec![
            vec![1.0, 0.9, 0.1],
            vec![0.9, 1.0, 0.2],
            vec![0.1, 0.2, 1.0],
        ];
        let lexical = vec![
            vec![0.0, 0.5, 3.0],
            vec![0.5, 0.0, 1.0],
            vec![3.0, 1.0, 0.0],
        ];
        let pairs = fuse_pairs(&paths, &semantic, &lexical, 60).unwrap();

        let ab = &pairs[0];
        assert_eq!(ab.pair_key(), ("a.md", "b.md"));
        // b→a: semantic 1, lexical 2. a→b: semantic 1, lexical 2.
        assert_eq!((ab.semantic_rank_a_to_b, ab.lexical_rank_a_to_b), (1, 2));
        assert_eq!((ab.semantic_rank_b_to_a, ab.lexical_rank_b_to_a), (1, 2));
        assert_eq!(ab.lexical_score_b_to_a, 0.5);
        assert!((ab.rrf_score - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-12);

        // b→c and c→b: semantic 2, lexical 1.
        let bc = &pairs[1];
        assert_eq!(bc.pair_key(), ("b.md", "c.md"));
        assert!((bc.rrf_score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-12);
    }

    #[test]
    fn test_explanation_format() {
        let pair = CandidatePair {
            note_a_path: "a.md".to_string(),
            note_b_path: "b.md".to_string(),
            semantic_similarity: 0.9321,
            semantic_rank_a_to_b: 1,
            semantic_rank_b_to_a: 1,
            lexical_score_a_to_b: 4.21,
            lexical_score_b_to_a: 3.0,
            lexical_rank_a_to_b: 1,
            lexical_rank_b_to_a: 1,
            rrf_score: 2.0 / 61.0,
        };
        assert_eq!(
            pair.explanation(),
            "Semantic similarity: 0.93 | BM25 score: 4.2 | RRF score: 0.0328"
        );
    }
}
