//! Per-note rankings and Reciprocal Rank Fusion.
//!
//! Each pairwise score matrix (semantic or lexical) is turned into a rank
//! matrix: for every row, the other notes are ranked from 1 (best) by
//! descending score. The row's own entry is excluded and left at 0.
//!
//! Ties share a rank, and the next distinct score takes the rank of its
//! sorted position, so scores `[9, 7, 7, 5]` rank `[1, 2, 2, 4]`.
//!
//! Two ranks for the same neighbour are fused with
//!
//! ```text
//! rrf = 1 / (k + semantic_rank) + 1 / (k + lexical_rank)
//! ```

use crate::error::LinkerError;

/// Default RRF smoothing constant.
pub const DEFAULT_RRF_K: u32 = 60;

/// Reciprocal Rank Fusion of one semantic and one lexical rank.
///
/// # Errors
///
/// [`LinkerError::InvalidRank`] if either rank is 0. Ranks are 1-based.
///
/// ```rust
/// use note_linker_core::ranking::rrf_score;
///
/// let best = rrf_score(1, 1, 60).unwrap();
/// assert!((best - 2.0 / 61.0).abs() < 1e-12);
/// assert!(rrf_score(0, 1, 60).is_err());
/// ```
pub fn rrf_score(semantic_rank: usize, lexical_rank: usize, k: u32) -> Result<f64, LinkerError> {
    if semantic_rank < 1 {
        return Err(LinkerError::InvalidRank(semantic_rank));
    }
    if lexical_rank < 1 {
        return Err(LinkerError::InvalidRank(lexical_rank));
    }
    let k = k as f64;
    Ok(1.0 / (k + semantic_rank as f64) + 1.0 / (k + lexical_rank as f64))
}

/// Rank `scores` from 1 by descending value.
///
/// The entry at `exclude` (the note itself) is skipped and gets rank 0.
/// Equal scores share a rank.
pub fn ranks_from_scores(scores: &[f64], exclude: Option<usize>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len())
        .filter(|&i| Some(i) != exclude)
        .collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ranks = vec![0usize; scores.len()];
    let mut current_rank = 0usize;
    let mut prev: Option<f64> = None;
    for (pos, &idx) in order.iter().enumerate() {
        if prev != Some(scores[idx]) {
            current_rank = pos + 1;
            prev = Some(scores[idx]);
        }
        ranks[idx] = current_rank;
    }
    ranks
}

/// Row-wise ranks of a square score matrix, diagonal excluded.
pub fn rank_matrix(matrix: &[Vec<f64>]) -> Vec<Vec<usize>> {
    matrix
        .iter()
        .enumerate()
        .map(|(i, row)| ranks_from_scores(row, Some(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ranks_with_ties() {
        assert_eq!(ranks_from_scores(&[9.0, 7.0, 7.0, 5.0], None), vec![1, 2, 2, 4]);
    }

    #[test]
    fn test_ranks_exclude_self() {
        assert_eq!(ranks_from_scores(&[1.0, 0.2, 0.9], Some(0)), vec![0, 2, 1]);
    }

    #[test]
    fn test_rank_matrix_diagonal_zero() {
        let m = vec![
            vec![0.0, 3.0, 1.0],
            vec![3.0, 0.0, 2.0],
            vec![1.0, 2.0, 0.0],
        ];
        let r = rank_matrix(&m);
        assert_eq!(r, vec![vec![0, 1, 2], vec![1, 0, 2], vec![2, 1, 0]]);
    }

    #[test]
    fn test_all_zero_row_ties_at_one() {
        assert_eq!(ranks_from_scores(&[0.0, 0.0, 0.0], Some(1)), vec![1, 0, 1]);
    }

    #[test]
    fn test_rrf_rejects_zero_rank() {
        assert_eq!(rrf_score(0, 3, 60), Err(LinkerError::InvalidRank(0)));
        assert_eq!(rrf_score(3, 0, 60), Err(LinkerError::InvalidRank(0)));
    }

    #[test]
    fn test_rrf_known_value() {
        let score = rrf_score(1, 2, 60).unwrap();
        assert!((score - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_top_score_ranks_first(scores in prop::collection::vec(-100.0f64..100.0, 1..40)) {
            let ranks = ranks_from_scores(&scores, None);
            let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            for (i, &s) in scores.iter().enumerate() {
                if s == max {
                    prop_assert_eq!(ranks[i], 1);
                }
            }
        }

        #[test]
        fn prop_equal_scores_equal_ranks(scores in prop::collection::vec(0u8..5, 1..40)) {
            let scores: Vec<f64> = scores.into_iter().map(f64::from).collect();
            let ranks = ranks_from_scores(&scores, None);
            for i in 0..scores.len() {
                for j in 0..scores.len() {
                    if scores[i] == scores[j] {
                        prop_assert_eq!(ranks[i], ranks[j]);
                    } else if scores[i] > scores[j] {
                        prop_assert!(ranks[i] < ranks[j]);
                    }
                }
            }
        }

        #[test]
        fn prop_ranks_within_bounds(scores in prop::collection::vec(-1.0f64..1.0, 2..40), skip in 0usize..40) {
            let exclude = skip % scores.len();
            let ranks = ranks_from_scores(&scores, Some(exclude));
            prop_assert_eq!(ranks[exclude], 0);
            for (i, &r) in ranks.iter().enumerate() {
                if i != exclude {
                    prop_assert!(r >= 1 && r < scores.len());
                }
            }
        }

        #[test]
        fn prop_rrf_symmetric(a in 1usize..10_000, b in 1usize..10_000, k in 1u32..200) {
            prop_assert_eq!(rrf_score(a, b, k).unwrap(), rrf_score(b, a, k).unwrap());
        }

        #[test]
        fn prop_rrf_monotone(a in 1usize..10_000, b in 1usize..10_000, step in 1usize..100) {
            let better = rrf_score(a, b, DEFAULT_RRF_K).unwrap();
            prop_assert!(rrf_score(a + step, b, DEFAULT_RRF_K).unwrap() < better);
            prop_assert!(rrf_score(a, b + step, DEFAULT_RRF_K).unwrap() < better);
        }
    }
}
