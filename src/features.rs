use rayon::prelude::*;
use tracing::{debug, info};

use crate::lexicons::{
    count_token_matches, fold_tokens, score_big5, COG_DISTORTION_KEYWORDS, NEG_EMOTION_WORDS,
    TFIDF_TERMS,
};
use crate::models::{FeatureVector, JournalEntry, SentimentLabel};
use crate::sentiment::SentimentScorer;
use crate::tfidf::TfidfVectorizer;

/// One entry's features. Entry-local except for the fixed-vocabulary
/// TF-IDF weights, whose document frequencies come from `vectorizer`.
fn extract_one(
    entry: &JournalEntry,
    scorer: &dyn SentimentScorer,
    vectorizer: &TfidfVectorizer,
) -> FeatureVector {
    let text = &entry.normalized_text;
    let (polarity, subjectivity) = scorer.score(text);

    FeatureVector {
        text_length: text.chars().count(),
        word_count: fold_tokens(text).len(),
        polarity,
        subjectivity,
        sentiment_label: SentimentLabel::from_polarity(polarity),
        cogdist_keyword_count: count_token_matches(text, COG_DISTORTION_KEYWORDS),
        neg_emotion_word_count: count_token_matches(text, NEG_EMOTION_WORDS),
        big5: score_big5(text),
        tfidf: vectorizer.transform(text),
    }
}

/// Feature vectors for the whole corpus, in corpus order. Entries are
/// independent, so the map runs across worker threads; aggregation later
/// re-sorts by timestamp regardless.
pub fn extract_all(entries: &[JournalEntry], scorer: &dyn SentimentScorer) -> Vec<FeatureVector> {
    let start = std::time::Instant::now();
    let texts: Vec<String> = entries.iter().map(|e| e.normalized_text.clone()).collect();
    let vectorizer = TfidfVectorizer::fit_fixed(TFIDF_TERMS, &texts);
    debug!("Fixed-vocabulary TF-IDF fitted - terms={}", vectorizer.vocabulary().len());

    let features: Vec<FeatureVector> = entries
        .par_iter()
        .map(|e| extract_one(e, scorer, &vectorizer))
        .collect();

    info!(
        "Feature extraction completed - entries={}, duration={:.2}s",
        entries.len(),
        start.elapsed().as_secs_f32()
    );
    features
}
