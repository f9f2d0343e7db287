use unicode_normalization::UnicodeNormalization;

/// Case-fold a text the same way everywhere: NFC first, then lowercase.
/// Every keyword list in this module is matched against folded text.
pub fn fold(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

/// Whitespace tokens of the folded text. Empty and whitespace-only input
/// yields no tokens.
pub fn fold_tokens(s: &str) -> Vec<String> {
    fold(s).split_whitespace().map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Big5Trait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Big5Trait {
    pub const ALL: [Big5Trait; 5] = [
        Big5Trait::Openness,
        Big5Trait::Conscientiousness,
        Big5Trait::Extraversion,
        Big5Trait::Agreeableness,
        Big5Trait::Neuroticism,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Big5Trait::Openness => "openness",
            Big5Trait::Conscientiousness => "conscientiousness",
            Big5Trait::Extraversion => "extraversion",
            Big5Trait::Agreeableness => "agreeableness",
            Big5Trait::Neuroticism => "neuroticism",
        }
    }

    /// Output column name, `big5_<trait>`.
    pub fn column(self) -> String {
        format!("big5_{}", self.name())
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Big5Trait::Openness => &["imagine", "creative", "novel", "invent", "art"],
            Big5Trait::Conscientiousness => &["organized", "plan", "goal", "order", "discipline"],
            Big5Trait::Extraversion => &["party", "talk", "meet", "group", "crowd", "friend"],
            Big5Trait::Agreeableness => &["kind", "forgive", "generous", "friendly", "team"],
            Big5Trait::Neuroticism => &["worry", "anxious", "sad", "afraid", "upset", "nervous"],
        }
    }
}

/// Rigid-language markers counted per entry. Token match, not substring:
/// a punctuation-stripped "cant" intentionally does NOT match "can’t".
pub const COG_DISTORTION_KEYWORDS: &[&str] = &[
    "should", "always", "never", "everyone", "nobody", "must", "can’t", "nothing",
];

pub const NEG_EMOTION_WORDS: &[&str] = &[
    "anxious",
    "worried",
    "stressed",
    "lonely",
    "afraid",
    "sad",
    "hopeless",
    "ashamed",
    "angry",
    "insecurity",
    "resentment",
    "guilty",
];

/// Fixed TF-IDF vocabulary: columns are stable across runs and corpora.
/// Both "cant" and "im" appear because the upstream normalizer strips
/// apostrophes.
pub const TFIDF_TERMS: &[&str] = &[
    "always",
    "never",
    "cant",
    "im",
    "feel",
    "everyone",
    "nothing",
    "must",
    "job",
    "family",
    "relationship",
    "think",
    "work",
    "career",
    "need",
    "should",
];

/// Cyclical-language triggers surfaced in the pattern report. Substring
/// match per entry.
pub const TRIGGER_TERMS: &[&str] = &[
    "never", "should", "always", "everyone", "must", "can’t", "nothing", "everybody",
];

/// English stopwords removed before learning the quirk-cluster vocabulary.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "same", "she", "so", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours", "yourself", "yourselves",
];

/// Count tokens of `text` that exact-match the closed `list`.
pub fn count_token_matches(text: &str, list: &[&str]) -> u32 {
    fold_tokens(text)
        .iter()
        .filter(|t| list.contains(&t.as_str()))
        .count() as u32
}

/// Per-trait keyword counts, zero-filled, in `Big5Trait::ALL` order.
/// Overlapping lists each count; the algorithm does not enforce
/// disjointness.
pub fn score_big5(text: &str) -> [u32; 5] {
    let tokens = fold_tokens(text);
    let mut scores = [0u32; 5];
    for (i, trait_) in Big5Trait::ALL.iter().enumerate() {
        let keywords = trait_.keywords();
        scores[i] = tokens.iter().filter(|t| keywords.contains(&t.as_str())).count() as u32;
    }
    scores
}
