// src/render.rs
use std::collections::BTreeMap;

use crate::ingest::EdaReport;
use crate::models::{FeedbackRecord, PeriodSummary};
use crate::patterns::PatternReport;

pub fn render_eda_text(report: &EdaReport) -> String {
    let mut out = String::new();
    out.push_str("Corpus overview\n");
    out.push_str(&format!(
        "- entries: {} (dated: {}, emotion: {}, annotation: {}, context: {})\n",
        report.entry_count,
        report.with_date,
        report.with_emotion,
        report.with_annotation,
        report.with_context
    ));
    out.push_str(&format!("- avg raw text length: {:.1}\n", report.avg_text_length));
    if !report.unique_emotions.is_empty() {
        out.push_str(&format!("- emotions seen: {}\n", report.unique_emotions.join(", ")));
    }
    if !report.unique_annotations.is_empty() {
        out.push_str(&format!(
            "- annotated distortions seen: {}\n",
            report.unique_annotations.join(", ")
        ));
    }
    out
}

fn push_counts(out: &mut String, title: &str, counts: &[(String, usize)]) {
    if counts.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", title));
    for (value, count) in counts {
        out.push_str(&format!("- {} ({})\n", value, count));
    }
}

pub fn render_pattern_text(report: &PatternReport) -> String {
    let mut out = String::new();
    out.push_str("Patterns & triggers\n");
    push_counts(&mut out, "Top bigrams", &report.top_bigrams);
    push_counts(&mut out, "Top trigrams", &report.top_trigrams);
    if let Some(emotions) = &report.top_emotions {
        push_counts(&mut out, "Recurring emotions", emotions);
    }
    if let Some(annotations) = &report.top_annotations {
        push_counts(&mut out, "Recurring annotated distortions", annotations);
    }
    if let Some(contexts) = &report.top_contexts {
        push_counts(&mut out, "Recurring contexts", contexts);
    }
    push_counts(&mut out, "Trigger word reach", &report.trigger_counts);
    push_counts(&mut out, "Detected distortion frequencies", &report.distortion_frequencies);
    out
}

pub fn render_quirk_samples(samples: &BTreeMap<usize, Vec<String>>) -> String {
    let mut out = String::new();
    out.push_str("Quirk cluster samples\n");
    for (cluster, texts) in samples {
        out.push_str(&format!("Cluster {}:\n", cluster));
        for t in texts {
            let shown: String = t.chars().take(80).collect();
            out.push_str(&format!("  - {}\n", shown));
        }
    }
    out
}

pub fn render_period_summaries(summaries: &[PeriodSummary]) -> String {
    let mut out = String::new();
    out.push_str("Periodic insight summary\n");
    for s in summaries {
        let distortions = s
            .common_distortions
            .iter()
            .map(|(l, n)| format!("{} ({})", l, n))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "Period: {} | Entries: {} | Top emotion: {} | Avg distortion: {} | Distortions: {}\n",
            s.period,
            s.entry_count,
            s.top_emotion.as_deref().unwrap_or("n/a"),
            s.avg_distortion_count
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "n/a".to_string()),
            if distortions.is_empty() { "-".to_string() } else { distortions }
        ));
    }
    out
}

pub fn render_period_feedback(feedback: &[FeedbackRecord]) -> String {
    let mut out = String::new();
    out.push_str("Periodic feedback & prompts\n");
    for f in feedback {
        out.push_str(&format!("Period: {}\n{}\n\n", f.period, f.cbt_feedback));
    }
    out
}

/// The full plain-text run report, section per stage.
pub fn render_report(
    eda: &EdaReport,
    patterns: &PatternReport,
    quirk_samples: &BTreeMap<usize, Vec<String>>,
    summaries: &[PeriodSummary],
    feedback: &[FeedbackRecord],
) -> String {
    let mut out = String::new();
    out.push_str("# Journal insight report\n\n");
    out.push_str(&render_eda_text(eda));
    out.push('\n');
    out.push_str(&render_pattern_text(patterns));
    out.push('\n');
    out.push_str(&render_quirk_samples(quirk_samples));
    out.push('\n');
    out.push_str(&render_period_summaries(summaries));
    out.push('\n');
    out.push_str(&render_period_feedback(feedback));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn period_summary_lines_render_options() {
        let summaries = vec![PeriodSummary {
            period: "2024-01".into(),
            bucket_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            entry_count: 4,
            top_emotion: None,
            avg_distortion_count: Some(1.25),
            common_distortions: vec![("should statements".into(), 3)],
        }];
        let text = render_period_summaries(&summaries);
        assert!(text.contains("Period: 2024-01"));
        assert!(text.contains("Top emotion: n/a"));
        assert!(text.contains("Avg distortion: 1.25"));
        assert!(text.contains("should statements (3)"));
    }

    #[test]
    fn feedback_section_lists_every_period() {
        let feedback = vec![
            FeedbackRecord { period: "2024-01".into(), cbt_feedback: "A.".into() },
            FeedbackRecord { period: "2024-02".into(), cbt_feedback: "B.".into() },
        ];
        let text = render_period_feedback(&feedback);
        assert!(text.contains("Period: 2024-01"));
        assert!(text.contains("Period: 2024-02"));
    }
}
