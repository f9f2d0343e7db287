use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::lexicons::fold;

/// TF-IDF over a closed vocabulary. The vocabulary is either pre-declared
/// (fixed feature columns, stable across corpora) or learned from the
/// corpus capped at a maximum size with stopwords removed. Unseen terms
/// always weigh zero.
#[derive(Debug, Clone, Serialize)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// Terms of a document: folded, split on non-alphanumeric runs, single
/// characters dropped.
pub fn terms(doc: &str) -> Vec<String> {
    fold(doc)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_string())
        .collect()
}

impl TfidfVectorizer {
    /// Fit document frequencies for a pre-declared vocabulary. Column
    /// order is the declared order, independent of the corpus.
    pub fn fit_fixed(vocabulary: &[&str], docs: &[String]) -> Self {
        let vocab: Vec<String> = vocabulary.iter().map(|t| t.to_string()).collect();
        Self::fit_with_vocab(vocab, docs)
    }

    /// Learn a vocabulary from the corpus: stopwords removed, top
    /// `max_features` terms by total frequency (term order breaks ties),
    /// columns sorted alphabetically.
    pub fn fit_learned(docs: &[String], max_features: usize, stop_words: &[&str]) -> Self {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for doc in docs {
            for t in terms(doc) {
                if !stop_words.contains(&t.as_str()) {
                    *freq.entry(t).or_insert(0) += 1;
                }
            }
        }

        let vocab: Vec<String> = freq
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .take(max_features)
            .map(|(t, _)| t)
            .sorted()
            .collect();

        Self::fit_with_vocab(vocab, docs)
    }

    fn fit_with_vocab(vocabulary: Vec<String>, docs: &[String]) -> Self {
        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        // Smoothed document frequencies: idf = ln((1+n)/(1+df)) + 1.
        let mut df = vec![0usize; vocabulary.len()];
        for doc in docs {
            for &i in terms(doc).iter().unique().filter_map(|t| index.get(t.as_str())) {
                df[i] += 1;
            }
        }
        let n = docs.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        Self { vocabulary, index, idf }
    }

    /// Weight vector for one document: term counts × idf, L2-normalized.
    /// All-zero rows (no vocabulary term present) stay all-zero.
    pub fn transform(&self, doc: &str) -> Vec<f64> {
        let mut row = vec![0.0f64; self.vocabulary.len()];
        for t in terms(doc) {
            if let Some(&i) = self.index.get(t.as_str()) {
                row[i] += 1.0;
            }
        }
        for (i, w) in row.iter_mut().enumerate() {
            *w *= self.idf[i];
        }
        let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in row.iter_mut() {
                *w /= norm;
            }
        }
        row
    }

    pub fn transform_all(&self, docs: &[String]) -> Vec<Vec<f64>> {
        docs.iter().map(|d| self.transform(d)).collect()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicons::{STOP_WORDS, TFIDF_TERMS};

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn fixed_vocabulary_keeps_declared_column_order() {
        let small = docs(&["i feel stuck at work"]);
        let large = docs(&["i feel stuck", "work is fine", "family family family"]);
        let a = TfidfVectorizer::fit_fixed(TFIDF_TERMS, &small);
        let b = TfidfVectorizer::fit_fixed(TFIDF_TERMS, &large);
        assert_eq!(a.vocabulary(), b.vocabulary());
        assert_eq!(a.vocabulary().len(), TFIDF_TERMS.len());
        assert_eq!(a.vocabulary()[0], "always");
    }

    #[test]
    fn unseen_terms_weigh_zero() {
        let v = TfidfVectorizer::fit_fixed(TFIDF_TERMS, &docs(&["nothing matters"]));
        let row = v.transform("zebra umbrella");
        assert!(row.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn empty_document_is_all_zero() {
        let v = TfidfVectorizer::fit_fixed(TFIDF_TERMS, &docs(&["i feel fine"]));
        assert!(v.transform("").iter().all(|&w| w == 0.0));
    }

    #[test]
    fn matched_terms_get_positive_weight() {
        let v = TfidfVectorizer::fit_fixed(TFIDF_TERMS, &docs(&["i feel stuck", "work again"]));
        let row = v.transform("i feel nothing about work");
        let feel = TFIDF_TERMS.iter().position(|&t| t == "feel").unwrap();
        let work = TFIDF_TERMS.iter().position(|&t| t == "work").unwrap();
        assert!(row[feel] > 0.0);
        assert!(row[work] > 0.0);
        // L2 norm of a non-zero row is 1
        let norm: f64 = row.iter().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn learned_vocabulary_filters_stopwords_and_caps_size() {
        let corpus = docs(&[
            "the meeting about the project deadline",
            "project deadline stress and the meeting",
            "deadline deadline deadline",
        ]);
        let v = TfidfVectorizer::fit_learned(&corpus, 3, STOP_WORDS);
        assert_eq!(v.vocabulary().len(), 3);
        assert!(v.vocabulary().contains(&"deadline".to_string()));
        assert!(!v.vocabulary().contains(&"the".to_string()));
        assert!(!v.vocabulary().contains(&"and".to_string()));
    }

    #[test]
    fn term_splitting_drops_punctuation_and_single_chars() {
        assert_eq!(terms("I can't, really—can't!"), vec!["can", "really", "can"]);
        assert_eq!(terms("a b"), Vec::<String>::new());
    }
}
