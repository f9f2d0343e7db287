use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::PeriodFrequency;
use crate::models::{EntryRecord, PeriodSummary};

/// First day of the calendar bucket containing `date`.
pub fn bucket_start(date: NaiveDate, freq: PeriodFrequency) -> NaiveDate {
    match freq {
        PeriodFrequency::Daily => date,
        PeriodFrequency::Weekly => {
            date - Duration::days(date.weekday().num_days_from_monday() as i64)
        }
        PeriodFrequency::Monthly => {
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
        }
    }
}

pub fn period_label(start: NaiveDate, freq: PeriodFrequency) -> String {
    match freq {
        PeriodFrequency::Daily => start.format("%Y-%m-%d").to_string(),
        // ISO week year, so the label sorts with the bucket
        PeriodFrequency::Weekly => start.format("%G-W%V").to_string(),
        PeriodFrequency::Monthly => start.format("%Y-%m").to_string(),
    }
}

/// Mode with ties broken by first-encountered value in iteration order.
fn mode_first_seen<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Option<String> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    for v in values {
        match order.iter_mut().find(|(seen, _)| *seen == v) {
            Some((_, n)) => *n += 1,
            None => order.push((v, 1)),
        }
    }
    // earliest value wins ties: replace only on a strictly larger count
    let mut best: Option<(&str, usize)> = None;
    for (v, n) in order {
        if best.map_or(true, |(_, bn)| n > bn) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v.to_string())
}

/// Bucket the labeled corpus into calendar periods and compute one
/// summary row per non-empty bucket, chronologically. Entries without a
/// date are excluded (and counted in the log), never fatal. Recomputed
/// wholesale on every run.
pub fn summarize_periods(records: &[EntryRecord], freq: PeriodFrequency) -> Vec<PeriodSummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&EntryRecord>> = BTreeMap::new();
    let mut undated = 0usize;
    for rec in records {
        match rec.entry.date {
            Some(d) => buckets.entry(bucket_start(d, freq)).or_default().push(rec),
            None => undated += 1,
        }
    }
    if undated > 0 {
        warn!("Period aggregation skipping {} undated entries", undated);
    }
    debug!("Period aggregation - freq={}, buckets={}", freq, buckets.len());

    buckets
        .into_iter()
        .map(|(start, group)| {
            let top_emotion = mode_first_seen(
                group
                    .iter()
                    .filter_map(|r| r.entry.emotion.as_deref()),
            );

            let avg = group.iter().map(|r| r.distortions.count()).sum::<usize>() as f64
                / group.len() as f64;
            let avg_distortion_count = Some((avg * 100.0).round() / 100.0);

            // flatten detected kinds into one multiset; the sentinel is
            // excluded by construction (empty sets contribute nothing)
            let mut counts: Vec<(&'static str, usize)> = Vec::new();
            for rec in &group {
                for kind in rec.distortions.kinds() {
                    match counts.iter_mut().find(|(l, _)| *l == kind.label()) {
                        Some((_, n)) => *n += 1,
                        None => counts.push((kind.label(), 1)),
                    }
                }
            }
            let mut ranked: Vec<(usize, (&str, usize))> =
                counts.into_iter().enumerate().collect();
            ranked.sort_by(|(ia, (_, na)), (ib, (_, nb))| nb.cmp(na).then(ia.cmp(ib)));
            let common_distortions: Vec<(String, usize)> = ranked
                .into_iter()
                .take(2)
                .map(|(_, (l, n))| (l.to_string(), n))
                .collect();

            PeriodSummary {
                period: period_label(start, freq),
                bucket_start: start,
                entry_count: group.len(),
                top_emotion,
                avg_distortion_count,
                common_distortions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{DistortionLabeler, KeywordInference};
    use crate::models::{ClusterAssignment, FeatureVector, JournalEntry, SentimentLabel};

    fn record(id: usize, text: &str, date: Option<&str>, emotion: Option<&str>) -> EntryRecord {
        let date = date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap());
        EntryRecord {
            entry: JournalEntry {
                id,
                raw_text: text.to_string(),
                normalized_text: text.to_string(),
                date,
                emotion: emotion.map(|e| e.to_string()),
                annotated_distortion: None,
                context: None,
            },
            features: FeatureVector {
                text_length: text.len(),
                word_count: text.split_whitespace().count(),
                polarity: 0.0,
                subjectivity: 0.0,
                sentiment_label: SentimentLabel::Neutral,
                cogdist_keyword_count: 0,
                neg_emotion_word_count: 0,
                big5: [0; 5],
                tfidf: vec![],
            },
            clusters: ClusterAssignment { quirk_cluster: 0, peer_group: 0 },
            distortions: KeywordInference.label_entry(text),
        }
    }

    #[test]
    fn bucket_starts_per_frequency() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(); // a Thursday
        assert_eq!(bucket_start(d, PeriodFrequency::Daily), d);
        assert_eq!(
            bucket_start(d, PeriodFrequency::Weekly),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
        assert_eq!(
            bucket_start(d, PeriodFrequency::Monthly),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn period_labels_are_stable() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(period_label(d, PeriodFrequency::Daily), "2024-03-11");
        assert_eq!(period_label(d, PeriodFrequency::Weekly), "2024-W11");
        assert_eq!(
            period_label(bucket_start(d, PeriodFrequency::Monthly), PeriodFrequency::Monthly),
            "2024-03"
        );
    }

    #[test]
    fn periods_are_chronological_and_never_empty() {
        let records = vec![
            record(0, "fine", Some("2024-03-05"), None),
            record(1, "fine", Some("2024-01-10"), None),
            record(2, "fine", Some("2024-03-20"), None),
        ];
        let summaries = summarize_periods(&records, PeriodFrequency::Monthly);
        // February is absent, not a zero row
        let labels: Vec<&str> = summaries.iter().map(|s| s.period.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-03"]);
        assert!(summaries.iter().all(|s| s.entry_count >= 1));
        assert!(summaries.windows(2).all(|w| w[0].bucket_start < w[1].bucket_start));
    }

    #[test]
    fn top_emotion_mode_breaks_ties_first_seen() {
        let records = vec![
            record(0, "x", Some("2024-01-01"), Some("fear")),
            record(1, "x", Some("2024-01-02"), Some("joy")),
            record(2, "x", Some("2024-01-03"), Some("joy")),
            record(3, "x", Some("2024-01-04"), Some("fear")),
        ];
        let summaries = summarize_periods(&records, PeriodFrequency::Monthly);
        // fear and joy both appear twice; fear was seen first
        assert_eq!(summaries[0].top_emotion.as_deref(), Some("fear"));
    }

    #[test]
    fn missing_emotion_column_degrades_to_none() {
        let records = vec![record(0, "x", Some("2024-01-01"), None)];
        let summaries = summarize_periods(&records, PeriodFrequency::Monthly);
        assert_eq!(summaries[0].top_emotion, None);
    }

    #[test]
    fn avg_distortion_is_rounded_to_two_decimals() {
        let records = vec![
            // "should" -> should statements (1)
            record(0, "i should go", Some("2024-01-01"), None),
            // clean (0)
            record(1, "a quiet day", Some("2024-01-02"), None),
            // "everyone" + "think" -> 2
            record(2, "i think everyone left", Some("2024-01-03"), None),
        ];
        let summaries = summarize_periods(&records, PeriodFrequency::Monthly);
        assert_eq!(summaries[0].avg_distortion_count, Some(1.0));

        let records = vec![
            record(0, "i should go", Some("2024-01-01"), None),
            record(1, "calm", Some("2024-01-02"), None),
            record(2, "calm", Some("2024-01-03"), None),
        ];
        let summaries = summarize_periods(&records, PeriodFrequency::Monthly);
        assert_eq!(summaries[0].avg_distortion_count, Some(0.33));
    }

    #[test]
    fn common_distortions_exclude_sentinel_and_keep_top_two() {
        let mut records = Vec::new();
        // 4 clean entries: sentinel would dominate if it were ranked
        for i in 0..4 {
            records.push(record(i, "a calm day", Some("2024-01-01"), None));
        }
        // 2 x should statements, 1 x overgeneralization + should
        records.push(record(4, "i should go", Some("2024-01-02"), None));
        records.push(record(5, "i must do this", Some("2024-01-03"), None));
        records.push(record(6, "everyone says i should", Some("2024-01-04"), None));

        let summaries = summarize_periods(&records, PeriodFrequency::Monthly);
        let common = &summaries[0].common_distortions;
        assert!(common.len() <= 2);
        assert_eq!(common[0].0, "should statements");
        assert_eq!(common[0].1, 3);
        assert!(common.iter().all(|(l, _)| l != "none detected"));
    }

    #[test]
    fn undated_entries_are_skipped_not_fatal() {
        let records = vec![
            record(0, "x", None, None),
            record(1, "x", Some("2024-01-01"), None),
        ];
        let summaries = summarize_periods(&records, PeriodFrequency::Monthly);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].entry_count, 1);
    }

    #[test]
    fn weekly_buckets_cross_month_boundaries() {
        let records = vec![
            record(0, "x", Some("2024-01-29"), None), // Monday
            record(1, "x", Some("2024-02-02"), None), // Friday same ISO week
        ];
        let summaries = summarize_periods(&records, PeriodFrequency::Weekly);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].entry_count, 2);
        assert_eq!(summaries[0].period, "2024-W05");
    }
}
