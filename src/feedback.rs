use tracing::debug;

use crate::inference::{DistortionKind, NONE_DETECTED};
use crate::lexicons::fold;
use crate::models::{FeedbackRecord, PeriodSummary};
use crate::prompts::{cbt_prompt, EMOTION_FEEDBACK, FALLBACK_REFLECTION};

/// One feedback string per period row: exactly one emotion-insight
/// sentence, then up to two distortion-specific prompts, space-joined.
pub fn feedback_for_period(summary: &PeriodSummary) -> FeedbackRecord {
    let mut parts: Vec<String> = Vec::new();

    // (a) first emotion key that is a substring of the top emotion wins;
    // no match (or no emotion at all) falls back to the generic prompt
    let top = fold(summary.top_emotion.as_deref().unwrap_or(""));
    let emotion_line = EMOTION_FEEDBACK
        .iter()
        .find(|(key, _)| top.contains(key))
        .map(|(_, advice)| format!("Emotion Insight: {}", advice))
        .unwrap_or_else(|| FALLBACK_REFLECTION.to_string());
    parts.push(emotion_line);

    // (b) distortion prompts in the summary's own order; the sentinel and
    // any label outside the closed kind set are skipped silently
    let mut emitted = 0usize;
    for (label, freq) in &summary.common_distortions {
        if label == NONE_DETECTED {
            continue;
        }
        if let Some(kind) = DistortionKind::from_label(label) {
            parts.push(format!("For '{}' ({}): {}", label, freq, cbt_prompt(kind)));
            emitted += 1;
        }
        if emitted == 2 {
            break;
        }
    }

    FeedbackRecord {
        period: summary.period.clone(),
        cbt_feedback: parts.join(" "),
    }
}

pub fn attach_feedback(summaries: &[PeriodSummary]) -> Vec<FeedbackRecord> {
    let records: Vec<FeedbackRecord> = summaries.iter().map(feedback_for_period).collect();
    debug!("Feedback attached - periods={}", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(
        top_emotion: Option<&str>,
        common: &[(&str, usize)],
    ) -> PeriodSummary {
        PeriodSummary {
            period: "2024-01".to_string(),
            bucket_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            entry_count: 1,
            top_emotion: top_emotion.map(|e| e.to_string()),
            avg_distortion_count: Some(0.0),
            common_distortions: common
                .iter()
                .map(|(l, n)| (l.to_string(), *n))
                .collect(),
        }
    }

    #[test]
    fn feedback_is_never_empty() {
        let fb = feedback_for_period(&summary(None, &[]));
        assert!(!fb.cbt_feedback.is_empty());
        assert_eq!(fb.cbt_feedback, FALLBACK_REFLECTION);
    }

    #[test]
    fn emotion_key_matches_as_substring() {
        let fb = feedback_for_period(&summary(Some("anxiety-driven"), &[]));
        assert!(fb.cbt_feedback.starts_with("Emotion Insight: This period reflects high worry"));
        assert!(fb.cbt_feedback.contains("anxiety") || fb.cbt_feedback.contains("worry"));
    }

    #[test]
    fn emotion_match_is_case_insensitive() {
        let fb = feedback_for_period(&summary(Some("Overwhelming JOY"), &[]));
        assert!(fb.cbt_feedback.contains("motivating emotional period"));
    }

    #[test]
    fn unknown_emotion_falls_back() {
        let fb = feedback_for_period(&summary(Some("ennui"), &[]));
        assert!(fb.cbt_feedback.starts_with(FALLBACK_REFLECTION));
    }

    #[test]
    fn sentinel_never_produces_a_prompt() {
        let fb = feedback_for_period(&summary(
            Some("calm"),
            &[("none detected", 20), ("should statements", 5)],
        ));
        assert!(!fb.cbt_feedback.contains("none detected"));
        assert!(fb.cbt_feedback.contains("For 'should statements' (5):"));
    }

    #[test]
    fn at_most_two_distortion_prompts() {
        let fb = feedback_for_period(&summary(
            Some("fear"),
            &[
                ("catastrophizing", 4),
                ("mind reading", 3),
                ("personalization", 2),
            ],
        ));
        let prompt_count = fb.cbt_feedback.matches("For '").count();
        assert_eq!(prompt_count, 2);
        assert!(!fb.cbt_feedback.contains("personalization"));
    }

    #[test]
    fn unmapped_label_is_skipped_silently() {
        let fb = feedback_for_period(&summary(
            Some("calm"),
            &[("rumination", 9), ("mind reading", 1)],
        ));
        assert!(!fb.cbt_feedback.contains("rumination"));
        assert!(fb.cbt_feedback.contains("For 'mind reading' (1):"));
    }

    #[test]
    fn structure_is_one_emotion_sentence_plus_prompts() {
        let fb = feedback_for_period(&summary(Some("sadness"), &[("catastrophizing", 2)]));
        assert!(fb.cbt_feedback.starts_with("Emotion Insight: "));
        assert_eq!(fb.cbt_feedback.matches("Emotion Insight:").count(), 1);
        assert_eq!(fb.cbt_feedback.matches("For '").count(), 1);
    }
}
