//! Cosine similarity and neighbour ranking
//!
//! Feature rows are stored as sparse vectors scaled to unit length, so the
//! cosine similarity of two rows is their dot product. Zero rows stay zero and
//! score 0.0 against everything.
use crate::{
    error::{AppError, AppResult},
    models::Neighbor,
};

/// Sparse vector of `(dimension, value)` pairs sorted by dimension, zeros omitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn from_dense(values: &[f64]) -> Self {
        let entries = values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, value)| *value != 0.0)
            .collect();
        Self { entries }
    }

    /// Builds a vector from unordered pairs, summing repeated dimensions
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = pairs.into_iter().collect();
        entries.sort_by_key(|(dim, _)| *dim);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (dim, value) in entries {
            if let Some((last, total)) = merged.last_mut() {
                if *last == dim {
                    *total += value;
                    continue;
                }
            }
            merged.push((dim, value));
        }
        merged.retain(|(_, value)| *value != 0.0);

        Self { entries: merged }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, value)| value * value)
            .sum::<f64>()
            .sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (dim_a, a) = self.entries[i];
            let (dim_b, b) = other.entries[j];
            match dim_a.cmp(&dim_b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a * b;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    /// Scales the vector to unit length; zero vectors are returned unchanged
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, value) in &mut self.entries {
                *value /= norm;
            }
        }
        self
    }
}

/// Cosine similarity of two vectors, 0.0 when either is zero
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    a.dot(b) / denominator
}

/// Unit-length feature rows, one per catalog index
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
    rows: Vec<SparseVector>,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<SparseVector>) -> Self {
        Self {
            rows: rows.into_iter().map(SparseVector::normalized).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row(&self, index: usize) -> AppResult<&SparseVector> {
        self.rows.get(index).ok_or(AppError::IndexOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    /// Cosine similarity between rows `i` and `j`
    pub fn similarity(&self, i: usize, j: usize) -> AppResult<f64> {
        Ok(self.row(i)?.dot(self.row(j)?))
    }

    /// Similarity of row `index` against every row, itself included
    pub fn similarity_row(&self, index: usize) -> AppResult<Vec<f64>> {
        let query = self.row(index)?;
        Ok(self.rows.iter().map(|row| query.dot(row)).collect())
    }
}

/// Every row sorted by descending score, query row included
///
/// Equal scores keep catalog order.
pub fn rank_all(scores: &[f64]) -> Vec<Neighbor> {
    let mut ranked: Vec<Neighbor> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| Neighbor { index, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Top `top_n` neighbours of `query`, excluding the query row and any row
/// rejected by `eligible`
pub fn top_neighbors<F>(scores: &[f64], query: usize, top_n: usize, eligible: F) -> Vec<Neighbor>
where
    F: Fn(usize) -> bool,
{
    rank_all(scores)
        .into_iter()
        .filter(|neighbor| neighbor.index != query && eligible(neighbor.index))
        .take(top_n)
        .collect()
}
