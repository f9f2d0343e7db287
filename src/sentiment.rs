use std::collections::HashMap;

use crate::lexicons::fold_tokens;

// Compact AFINN-style valence table, scores in [-5, 5].
const VALENCE_LEXICON: &str = include_str!("../data/valence.txt");

/// Black-box sentiment collaborator. Implementations return
/// `(polarity, subjectivity)` with polarity in [-1, 1] and subjectivity
/// in [0, 1].
pub trait SentimentScorer: Sync {
    fn score(&self, text: &str) -> (f64, f64);
}

/// Lexicon-backed scorer: polarity is the mean valence of matched tokens
/// scaled to [-1, 1]; subjectivity is the fraction of valence-bearing
/// tokens. Empty or unmatched text scores (0.0, 0.0).
pub struct LexiconSentiment {
    valence: HashMap<String, i8>,
}

impl LexiconSentiment {
    pub fn new() -> Self {
        let mut valence = HashMap::new();
        for line in VALENCE_LEXICON.lines() {
            if let Some((word, score)) = line.split_once('\t') {
                if let Ok(v) = score.trim().parse::<i8>() {
                    valence.insert(word.to_lowercase(), v);
                }
            }
        }
        Self { valence }
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconSentiment {
    fn score(&self, text: &str) -> (f64, f64) {
        let tokens = fold_tokens(text);
        if tokens.is_empty() {
            return (0.0, 0.0);
        }

        let mut sum = 0i64;
        let mut matched = 0usize;
        for t in &tokens {
            if let Some(&v) = self.valence.get(t.as_str()) {
                sum += v as i64;
                matched += 1;
            }
        }
        if matched == 0 {
            return (0.0, 0.0);
        }

        let polarity = (sum as f64 / matched as f64 / 5.0).clamp(-1.0, 1.0);
        let subjectivity = (matched as f64 / tokens.len() as f64).clamp(0.0, 1.0);
        (polarity, subjectivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        let s = LexiconSentiment::new();
        assert_eq!(s.score(""), (0.0, 0.0));
        assert_eq!(s.score("   "), (0.0, 0.0));
    }

    #[test]
    fn unmatched_text_is_neutral() {
        let s = LexiconSentiment::new();
        assert_eq!(s.score("the quick brown fox"), (0.0, 0.0));
    }

    #[test]
    fn positive_and_negative_texts() {
        let s = LexiconSentiment::new();
        let (pos, sub_pos) = s.score("i feel happy and grateful");
        assert!(pos > 0.0);
        assert!(sub_pos > 0.0 && sub_pos <= 1.0);

        let (neg, _) = s.score("i am hopeless and worried");
        assert!(neg < 0.0);
    }

    #[test]
    fn polarity_stays_in_range() {
        let s = LexiconSentiment::new();
        let (p, sub) = s.score("wonderful wonderful wonderful amazing");
        assert!((-1.0..=1.0).contains(&p));
        assert!((0.0..=1.0).contains(&sub));
    }
}
