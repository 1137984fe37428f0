// TF-IDF vectorizer over a fixed, corpus-derived vocabulary
use crate::SparseVector;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Common English words dropped before weighting. Kept sorted for `binary_search`.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "am", "among", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each", "either", "else",
    "ever", "every", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "neither", "no", "nor", "not", "now", "of", "off",
    "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Tokenizer settings carried by the vectorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub stop_words: bool,
    pub min_token_len: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            stop_words: true,
            min_token_len: 2,
        }
    }
}

impl TokenizerConfig {
    /// Lowercase, split into runs of word characters (alphanumerics and
    /// `_`), drop short tokens and (optionally) stop words.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !is_word_char(c))
            .filter(|s| !s.is_empty() && s.chars().count() >= self.min_token_len && !self.is_stop_word(s))
            .map(str::to_string)
            .collect()
    }

    fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words && ENGLISH_STOP_WORDS.binary_search(&token).is_ok()
    }
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Fitted TF-IDF vectorizer
///
/// Tokens are runs of word characters, so feed keys such as `sugars_100g`
/// stay a single term.
///
/// Weights are raw term counts times a smoothed idf,
/// `ln((1 + n) / (1 + df)) + 1`, and every vector is L2-normalized.
/// Vocabulary columns are assigned in sorted term order so fitting the same
/// corpus always yields the same columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TfIdfVectorizer {
    tokenizer: TokenizerConfig,
    vocabulary: AHashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfIdfVectorizer {
    /// Fit on a corpus and return the vectorizer with one row per document
    pub fn fit_transform<S: AsRef<str>>(documents: &[S], tokenizer: TokenizerConfig) -> (Self, Vec<SparseVector>) {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenizer.tokenize(d.as_ref())).collect();

        // term -> document frequency, sorted by term
        let mut dfs: BTreeMap<&str, u32> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *dfs.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f32;
        let mut vocabulary = AHashMap::with_capacity(dfs.len());
        let mut idf = Vec::with_capacity(dfs.len());
        for (col, (term, df)) in dfs.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), col as u32);
            idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
        }

        let vectorizer = Self {
            tokenizer,
            vocabulary,
            idf,
        };
        let rows = tokenized.iter().map(|tokens| vectorizer.weigh(tokens)).collect();
        (vectorizer, rows)
    }

    /// Project text into the fitted vocabulary. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&self.tokenizer.tokenize(text))
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: AHashMap<u32, f32> = AHashMap::new();
        for token in tokens {
            if let Some(&col) = self.vocabulary.get(token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }
        let entries = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col as usize]))
            .collect();
        SparseVector::new(entries).normalized()
    }

    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn column(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }
}
