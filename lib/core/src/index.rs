//! Retrieval index
//!
//! A TF-IDF vector space over product documents with exhaustive
//! nearest-neighbor search. Built once, queried many times, never mutated.
//! The four parts (vectorizer, term-weight matrix, neighbor structure and
//! row identifiers) can be persisted and reassembled with
//! [`RetrievalIndex::from_parts`]; query results depend on nothing else.

use crate::tfidf::{TfIdfVectorizer, TokenizerConfig};
use crate::{Error, Product, ProductStore, Result, RetrievalDocument, SparseVector};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// `1 - cosine similarity`
    Cosine,
    /// Euclidean distance between L2-normalized rows
    Euclidean,
}

/// Configuration for building a retrieval index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    pub metric: Metric,
    pub stop_words: bool,
    pub min_token_len: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let tokenizer = TokenizerConfig::default();
        Self {
            metric: Metric::Cosine,
            stop_words: tokenizer.stop_words,
            min_token_len: tokenizer.min_token_len,
        }
    }
}

/// Documents × vocabulary weights, one L2-normalized row per document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWeightMatrix {
    rows: Vec<SparseVector>,
    n_cols: usize,
}

impl TermWeightMatrix {
    pub fn new(rows: Vec<SparseVector>, n_cols: usize) -> Self {
        Self { rows, n_cols }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }
}

/// Exhaustive neighbor search over a term-weight matrix
///
/// Keeps an inverted posting list per column so a query only touches
/// rows that share at least one term with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborIndex {
    metric: Metric,
    // column -> [(row, weight)], rows ascending
    postings: Vec<Vec<(u32, f32)>>,
    row_norms: Vec<f32>,
}

impl NeighborIndex {
    pub fn fit(matrix: &TermWeightMatrix, metric: Metric) -> Self {
        let mut postings: Vec<Vec<(u32, f32)>> = vec![Vec::new(); matrix.n_cols()];
        let mut row_norms = Vec::with_capacity(matrix.n_rows());
        for (row, vector) in matrix.rows.iter().enumerate() {
            for (col, weight) in vector.iter() {
                postings[col as usize].push((row as u32, weight));
            }
            row_norms.push(vector.norm());
        }
        Self {
            metric,
            postings,
            row_norms,
        }
    }

    #[inline]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.row_norms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_norms.is_empty()
    }

    /// The `k` nearest rows as `(row, distance)`, ascending by distance.
    /// Equal distances keep row order.
    pub fn kneighbors(&self, query: &SparseVector, k: usize) -> Vec<(usize, f32)> {
        let mut dots = vec![0.0f32; self.row_norms.len()];
        for (col, q) in query.iter() {
            if let Some(posting) = self.postings.get(col as usize) {
                for &(row, w) in posting {
                    dots[row as usize] += q * w;
                }
            }
        }

        let query_norm = query.norm();
        let mut scored: Vec<(usize, f32)> = dots
            .into_iter()
            .zip(&self.row_norms)
            .map(|(dot, &row_norm)| self.distance(dot, query_norm, row_norm))
            .enumerate()
            .collect();

        scored.sort_by_key(|&(_, distance)| OrderedFloat(distance));
        scored.truncate(k.min(self.row_norms.len()));
        scored
    }

    fn distance(&self, dot: f32, query_norm: f32, row_norm: f32) -> f32 {
        match self.metric {
            Metric::Cosine => {
                if query_norm == 0.0 || row_norm == 0.0 {
                    1.0
                } else {
                    (1.0 - dot / (query_norm * row_norm)).max(0.0)
                }
            }
            Metric::Euclidean => {
                (query_norm * query_norm + row_norm * row_norm - 2.0 * dot).max(0.0).sqrt()
            }
        }
    }
}

/// Read-only TF-IDF retrieval index over products
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalIndex {
    vectorizer: TfIdfVectorizer,
    matrix: TermWeightMatrix,
    neighbors: NeighborIndex,
    // row -> product identifier, in lock-step with `matrix`
    identifiers: Vec<String>,
}

impl RetrievalIndex {
    /// Build an index with one document per product, in the given order.
    pub fn build(products: &[Product], config: IndexConfig) -> Result<Self> {
        if products.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let documents: Vec<RetrievalDocument> = products.iter().map(RetrievalDocument::from_product).collect();
        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();

        let tokenizer = TokenizerConfig {
            stop_words: config.stop_words,
            min_token_len: config.min_token_len,
        };
        let (vectorizer, rows) = TfIdfVectorizer::fit_transform(&texts, tokenizer);
        let matrix = TermWeightMatrix::new(rows, vectorizer.vocabulary_size());
        let neighbors = NeighborIndex::fit(&matrix, config.metric);
        let identifiers = documents.into_iter().map(|d| d.id).collect();

        info!(
            documents = matrix.n_rows(),
            vocabulary = vectorizer.vocabulary_size(),
            metric = ?config.metric,
            "retrieval index built"
        );

        Ok(Self {
            vectorizer,
            matrix,
            neighbors,
            identifiers,
        })
    }

    /// Reassemble an index from previously persisted parts.
    ///
    /// Fails with [`Error::InvalidInput`] when the parts disagree on the
    /// number of rows or columns.
    pub fn from_parts(
        vectorizer: TfIdfVectorizer,
        matrix: TermWeightMatrix,
        neighbors: NeighborIndex,
        identifiers: Vec<String>,
    ) -> Result<Self> {
        if matrix.n_rows() != identifiers.len() || neighbors.len() != identifiers.len() {
            return Err(Error::InvalidInput(format!(
                "index parts out of step: {} matrix rows, {} neighbor rows, {} identifiers",
                matrix.n_rows(),
                neighbors.len(),
                identifiers.len()
            )));
        }
        if matrix.n_cols() != vectorizer.vocabulary_size() {
            return Err(Error::InvalidInput(format!(
                "index parts out of step: {} matrix columns, vocabulary of {}",
                matrix.n_cols(),
                vectorizer.vocabulary_size()
            )));
        }
        if identifiers.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        Ok(Self {
            vectorizer,
            matrix,
            neighbors,
            identifiers,
        })
    }

    /// The `k` closest products as `(identifier, distance)`, ascending.
    /// `k` is clamped to the corpus size.
    pub fn search(&self, query: &str, k: usize) -> Vec<(String, f32)> {
        let vector = self.vectorizer.transform(query);
        debug!(query, terms = vector.nnz(), k, "retrieval search");
        self.neighbors
            .kneighbors(&vector, k)
            .into_iter()
            .map(|(row, distance)| (self.identifiers[row].clone(), distance))
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn matrix(&self) -> &TermWeightMatrix {
        &self.matrix
    }

    pub fn neighbors(&self) -> &NeighborIndex {
        &self.neighbors
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Ways in which this index no longer matches `store` and `metric`.
    /// Empty when the index covers exactly the stored products.
    pub fn mismatches(&self, store: &ProductStore, metric: Metric) -> Vec<String> {
        let mut found = Vec::new();
        if self.neighbors.metric() != metric {
            found.push(format!(
                "index uses {:?} distance, {:?} requested",
                self.neighbors.metric(),
                metric
            ));
        }
        if self.len() != store.count() {
            found.push(format!("index has {} documents, store has {} products", self.len(), store.count()));
        }
        let unknown = self.identifiers.iter().filter(|id| !store.contains(id)).count();
        if unknown > 0 {
            found.push(format!("{} indexed identifiers are not in the store", unknown));
        }
        found
    }
}
