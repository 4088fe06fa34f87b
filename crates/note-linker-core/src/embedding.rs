//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, the BLOB codec used by the embedding cache, and the pairwise
//! cosine similarity matrix used by the ranker.
//!
//! Concrete providers (hash, fastembed, Ollama, OpenAI) live in the
//! `note-linker` app crate.

use anyhow::Result;
use async_trait::async_trait;

use crate::error::LinkerError;

/// Trait for embedding providers.
///
/// `embed` maps texts to vectors 1:1 and in input order. Implementations
/// must reject an empty input list with [`LinkerError::EmptyEmbeddingInput`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// Each `f32` is stored as 4 bytes in little-endian order, producing
/// a BLOB of `vec.len() × 4` bytes.
///
/// # Example
///
/// ```rust
/// use note_linker_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12); // 3 × 4 bytes
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
///
/// Reverses [`vec_to_blob`]. Trailing bytes that do not form a whole
/// `f32` are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Norms below this are clamped so zero vectors do not divide by zero.
const MIN_NORM: f64 = 1e-10;

/// Pairwise cosine similarity of every vector against every other.
///
/// Vectors are normalized to unit length in `f64` before the dot products,
/// so entries lie in `[-1, 1]` up to rounding. Row `i`, column `j` is the
/// similarity of `vectors[i]` and `vectors[j]`; the matrix is symmetric.
///
/// # Errors
///
/// [`LinkerError::EmptyEmbeddingInput`] when `vectors` is empty.
pub fn similarity_matrix(vectors: &[Vec<f32>]) -> Result<Vec<Vec<f64>>, LinkerError> {
    if vectors.is_empty() {
        return Err(LinkerError::EmptyEmbeddingInput);
    }

    let normalized: Vec<Vec<f64>> = vectors
        .iter()
        .map(|v| {
            let norm = v
                .iter()
                .map(|&x| (x as f64) * (x as f64))
                .sum::<f64>()
                .sqrt()
                .max(MIN_NORM);
            v.iter().map(|&x| x as f64 / norm).collect()
        })
        .collect();

    let n = normalized.len();
    let mut matrix = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in i..n {
            let dot: f64 = normalized[i]
                .iter()
                .zip(normalized[j].iter())
                .map(|(a, b)| a * b)
                .sum();
            matrix[i][j] = dot;
            matrix[j][i] = dot;
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_blob_roundtrip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001, f32::MAX, f32::MIN_POSITIVE];
        let blob = vec_to_blob(&vec);
        let restored = blob_to_vec(&blob);
        assert_eq!(vec, restored);
    }

    #[test]
    fn test_empty_vec_roundtrip() {
        let blob = vec_to_blob(&[]);
        assert!(blob.is_empty());
        assert!(blob_to_vec(&blob).is_empty());
    }

    #[test]
    fn test_similarity_identical_and_orthogonal() {
        let m = similarity_matrix(&[vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0], vec![-3.0, 0.0, 1.0]])
            .unwrap();
        assert!((m[0][1] - 1.0).abs() < 1e-9);
        assert!(m[0][2].abs() < 1e-9);
        assert_eq!(m[1][2], m[2][1]);
    }

    #[test]
    fn test_similarity_opposite() {
        let m = similarity_matrix(&[vec![1.0, 0.0], vec![-1.0, 0.0]]).unwrap();
        assert!((m[0][1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_zero_vector_is_zero() {
        let m = similarity_matrix(&[vec![0.0, 0.0], vec![1.0, 0.0]]).unwrap();
        assert_eq!(m[0][1], 0.0);
    }

    #[test]
    fn test_similarity_rejects_empty() {
        assert_eq!(
            similarity_matrix(&[]).unwrap_err(),
            LinkerError::EmptyEmbeddingInput
        );
    }

    #[test]
    fn test_similarity_within_bounds() {
        let vecs = vec![
            vec![0.3, -0.7, 0.1],
            vec![0.9, 0.2, -0.4],
            vec![-0.5, -0.5, 0.5],
        ];
        let m = similarity_matrix(&vecs).unwrap();
        for row in &m {
            for &v in row {
                assert!((-1.0 - 1e-6..=1.0 + 1e-6).contains(&v));
            }
        }
    }
}
