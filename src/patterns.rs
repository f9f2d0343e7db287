use serde::Serialize;
use tracing::debug;

use crate::lexicons::{fold, fold_tokens, TRIGGER_TERMS};
use crate::models::EntryRecord;

/// Recurring-language report over the whole corpus: frequent n-grams,
/// recurring column values, trigger-word reach, and corpus-wide
/// distortion frequencies.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub top_bigrams: Vec<(String, usize)>,
    pub top_trigrams: Vec<(String, usize)>,
    pub top_emotions: Option<Vec<(String, usize)>>,
    pub top_annotations: Option<Vec<(String, usize)>>,
    pub top_contexts: Option<Vec<(String, usize)>>,
    /// Number of entries whose normalized text contains each trigger term
    /// as a substring.
    pub trigger_counts: Vec<(String, usize)>,
    /// Frequencies over every entry's rendered label set, sentinel
    /// included.
    pub distortion_frequencies: Vec<(String, usize)>,
}

/// Top `k` n-grams, count-descending with first-seen tie-break.
fn top_ngrams(texts: &[&str], n: usize, k: usize) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    for text in texts {
        let tokens = fold_tokens(text);
        for window in tokens.windows(n) {
            let gram = window.join(" ");
            match order.iter_mut().find(|(g, _)| *g == gram) {
                Some((_, c)) => *c += 1,
                None => order.push((gram, 1)),
            }
        }
    }
    rank_descending(order, k)
}

/// Recurring values of one optional column; `None` when no entry carries
/// the column.
fn column_recurrence<'a, I>(values: I, k: usize) -> Option<Vec<(String, usize)>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut any = false;
    for v in values.into_iter().flatten() {
        any = true;
        match order.iter_mut().find(|(seen, _)| seen == v) {
            Some((_, c)) => *c += 1,
            None => order.push((v.to_string(), 1)),
        }
    }
    any.then(|| rank_descending(order, k))
}

fn rank_descending(order: Vec<(String, usize)>, k: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(usize, (String, usize))> = order.into_iter().enumerate().collect();
    ranked.sort_by(|(ia, (_, ca)), (ib, (_, cb))| cb.cmp(ca).then(ia.cmp(ib)));
    ranked.into_iter().take(k).map(|(_, pair)| pair).collect()
}

pub fn detect_recurring_patterns(records: &[EntryRecord]) -> PatternReport {
    let texts: Vec<&str> = records.iter().map(|r| r.entry.normalized_text.as_str()).collect();

    let trigger_counts = TRIGGER_TERMS
        .iter()
        .map(|term| {
            let hits = texts.iter().filter(|t| fold(t).contains(term)).count();
            (term.to_string(), hits)
        })
        .collect();

    let mut dist_order: Vec<(String, usize)> = Vec::new();
    for rec in records {
        for label in rec.distortions.labels() {
            match dist_order.iter_mut().find(|(l, _)| l == label) {
                Some((_, c)) => *c += 1,
                None => dist_order.push((label.to_string(), 1)),
            }
        }
    }

    let report = PatternReport {
        top_bigrams: top_ngrams(&texts, 2, 15),
        top_trigrams: top_ngrams(&texts, 3, 15),
        top_emotions: column_recurrence(
            records.iter().map(|r| r.entry.emotion.as_deref()),
            10,
        ),
        top_annotations: column_recurrence(
            records.iter().map(|r| r.entry.annotated_distortion.as_deref()),
            10,
        ),
        top_contexts: column_recurrence(records.iter().map(|r| r.entry.context.as_deref()), 7),
        trigger_counts,
        distortion_frequencies: rank_descending(dist_order, usize::MAX),
    };
    debug!(
        "Pattern report - bigrams={}, trigrams={}, triggers={}",
        report.top_bigrams.len(),
        report.top_trigrams.len(),
        report.trigger_counts.len()
    );
    report
}
