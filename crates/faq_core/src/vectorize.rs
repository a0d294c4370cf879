use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::Weighting;

/// L2-normalised sparse term vector; pairs are kept sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(weights: BTreeMap<usize, f64>) -> Self {
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Self::default();
        }
        Self {
            entries: weights.into_iter().map(|(col, w)| (col, w / norm)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_col, a_w) = self.entries[i];
            let (b_col, b_w) = other.entries[j];
            match a_col.cmp(&b_col) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

const UNIT_EPSILON: f64 = 1e-9;

/// Cosine similarity of two normalised vectors, clamped into [0, 1].
/// Rounding noise around 1.0 snaps to exactly 1.0 so an identical vector
/// always clears a threshold of 1.0.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let score = a.dot(b);
    if (score - 1.0).abs() < UNIT_EPSILON {
        1.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfModel {
    /// Every term seen in at least one document joins the vocabulary.
    /// Columns follow sorted term order so refitting the same corpus yields
    /// the same layout.
    pub fn fit(documents: &[Vec<String>], weighting: Weighting) -> Self {
        let terms: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| doc.iter().map(String::as_str))
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(col, term)| (term.to_string(), col))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for doc in documents {
            let seen: BTreeSet<usize> = doc.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for col in seen {
                df[col] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = df
            .into_iter()
            .map(|d| match weighting {
                Weighting::TfIdf => ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0,
                Weighting::TermFrequency => 1.0,
            })
            .collect();

        Self { vocabulary, idf }
    }

    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Unknown terms are dropped.
    pub fn transform(&self, terms: &[String]) -> SparseVector {
        let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
        for term in terms {
            if let Some(&col) = self.vocabulary.get(term) {
                *weights.entry(col).or_insert(0.0) += 1.0;
            }
        }
        for (col, w) in weights.iter_mut() {
            *w *= self.idf[*col];
        }
        SparseVector::from_weights(weights)
    }
}
