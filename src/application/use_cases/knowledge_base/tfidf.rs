//! TF-IDF term weighting with unigram + bigram features.
//!
//! Weighting follows the smoothed scheme:
//! - tokens: runs of two or more word characters, lowercased
//! - stop words dropped before bigrams are formed
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//! - raw term counts multiplied by idf, then L2-normalized

use super::stop_words::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Sparse vector as `(feature index, weight)` pairs sorted by index
pub type SparseVector = Vec<(usize, f32)>;

/// Vectorizer fitted once over a fixed corpus
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and idf weights, returning the corpus vectors
    pub fn fit_transform(documents: &[String]) -> (Self, Vec<SparseVector>) {
        let vectorizer = Self::fit(documents);
        let vectors = documents.iter().map(|doc| vectorizer.transform(doc)).collect();
        (vectorizer, vectors)
    }

    pub fn fit(documents: &[String]) -> Self {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|doc| analyze(doc)).collect();

        // Alphabetical feature order
        let terms: BTreeSet<&str> = analyzed
            .iter()
            .flat_map(|features| features.iter().map(String::as_str))
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let mut doc_frequencies = vec![0usize; vocabulary.len()];
        for features in &analyzed {
            let unique: HashSet<usize> = features
                .iter()
                .filter_map(|feature| vocabulary.get(feature).copied())
                .collect();
            for idx in unique {
                doc_frequencies[idx] += 1;
            }
        }

        let n = documents.len() as f32;
        let idf = doc_frequencies
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    /// Weight a text with the fitted vocabulary; unknown terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for feature in analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&feature) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        vector.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, weight) in vector.iter_mut() {
                *weight /= norm;
            }
        }
        vector
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Cosine similarity of two index-sorted sparse vectors
pub fn cosine_similarity(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let mut dot_product = 0.0f32;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot_product += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    let norm_a: f32 = a.iter().map(|(_, x)| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|(_, x)| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Unigrams followed by bigrams of the stop-word-filtered tokens
fn analyze(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .collect();

    let mut features: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    features.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_analyze_drops_stop_words_before_bigrams() {
        assert_eq!(
            analyze("The Pivot table of sales"),
            vec!["pivot", "table", "sales", "pivot table", "table sales"]
        );
    }

    #[test]
    fn test_single_character_tokens_are_ignored() {
        assert!(analyze("a b c").is_empty());
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["zebra apple"]));
        assert_eq!(vectorizer.vocabulary.get("apple"), Some(&0));
        assert_eq!(vectorizer.vocabulary.get("zebra"), Some(&1));
        assert_eq!(vectorizer.vocabulary.get("zebra apple"), Some(&2));
    }

    #[test]
    fn test_idf_smoothing() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["cohort retention", "cohort churn"]));
        let cohort = vectorizer.vocabulary["cohort"];
        let churn = vectorizer.vocabulary["churn"];

        assert!((vectorizer.idf[cohort] - 1.0).abs() < 1e-6);
        assert!((vectorizer.idf[churn] - ((3.0f32 / 2.0).ln() + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let (_, vectors) =
            TfidfVectorizer::fit_transform(&docs(&["outlier detection with zscore"]));
        let norm: f32 = vectors[0].iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_terms_give_zero_similarity() {
        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&docs(&["regression model"]));
        let query = vectorizer.transform("completely unrelated words");

        assert!(query.is_empty());
        assert_eq!(cosine_similarity(&query, &vectors[0]), 0.0);
    }

    #[test]
    fn test_cosine_prefers_overlapping_document() {
        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&docs(&[
            "handling missing values imputation",
            "dashboard design color charts",
        ]));
        let query = vectorizer.transform("how to impute missing values");

        assert!(cosine_similarity(&query, &vectors[0]) > cosine_similarity(&query, &vectors[1]));
        assert!((cosine_similarity(&vectors[0], &vectors[0]) - 1.0).abs() < 1e-5);
    }
}
