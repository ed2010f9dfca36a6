//! Cosine similarity scoring over stored embedding vectors.

use uuid::Uuid;

use crate::error::RetrievalError;

/// A corpus entry ranked by [`top_k`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredId {
    /// ID of the scored chunk
    pub id: Uuid,

    /// Cosine similarity against the query vector
    pub score: f32,
}

/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// Returns exactly `0.0` when either vector has zero norm: a zero vector
/// is treated as orthogonal to everything, which also guards the
/// divide-by-zero. Vectors of different length are a contract violation
/// and fail with [`RetrievalError::DimensionMismatch`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, RetrievalError> {
    if a.len() != b.len() {
        return Err(RetrievalError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Rank a corpus against a query vector and return the top `k` entries.
///
/// Results are sorted descending by score; equal scores keep their corpus
/// order (stable sort) so rankings are deterministic. `k` larger than the
/// corpus returns the whole corpus ranked; `k == 0` returns nothing. A
/// single mismatched vector fails the whole call — a corpus with mixed
/// dimensions is corrupt, not partially usable.
pub fn top_k(
    query: &[f32],
    corpus: &[(Uuid, Vec<f32>)],
    k: usize,
) -> Result<Vec<ScoredId>, RetrievalError> {
    if k == 0 || corpus.is_empty() {
        return Ok(Vec::new());
    }

    let mut scored = Vec::with_capacity(corpus.len());
    for (id, vector) in corpus {
        let score = cosine_similarity(query, vector)?;
        scored.push(ScoredId { id: *id, score });
    }

    // Vec::sort_by is stable: ties keep ascending corpus order
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(k);

    Ok(scored)
}
