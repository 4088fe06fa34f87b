//! Feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with FNV-1a into one of
//! `dims` buckets, with the sign taken from a high hash bit, and the result
//! is L2-normalized. No model, no network: identical text always maps to the
//! identical vector, which makes it the provider of choice for tests and
//! offline vaults.

use anyhow::Result;
use async_trait::async_trait;

use note_linker_core::embedding::EmbeddingProvider;

use super::ensure_non_empty;
use crate::config::EmbeddingConfig;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
pub const DEFAULT_HASH_DIMS: usize = 256;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

pub struct HashProvider {
    dims: usize,
    name: String,
}

impl HashProvider {
    pub fn new(dims: usize) -> Self {
        let dims = dims.max(1);
        Self {
            dims,
            name: format!("fnv1a-{}", dims),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(config.dims.unwrap_or(DEFAULT_HASH_DIMS))
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dims];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let h = fnv1a(token.as_bytes());
            let bucket = (h % self.dims as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
        }

        let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl EmbeddingProvider for HashProvider {
    fn model_name(&self) -> &str {
        &self.name
    }
    fn dims(&self) -> usize {
        self.dims
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        ensure_non_empty(texts)?;
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
