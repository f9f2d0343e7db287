use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::lexicons::{Big5Trait, TFIDF_TERMS};
use crate::models::{EntryRecord, FeedbackRecord, PeriodSummary};

fn write_json<T: Serialize>(path: std::path::PathBuf, value: &T) -> Result<()> {
    fs::write(&path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Column header of the augmented table. Presentation layers depend on
/// these exact names.
fn csv_header() -> Vec<String> {
    let mut header: Vec<String> = [
        "id",
        "text",
        "text_clean",
        "date",
        "emotion",
        "bias/distortion",
        "context",
        "text_length",
        "word_count",
        "polarity",
        "subjectivity",
        "sentiment_label",
        "cogdist_keyword_count",
        "neg_emotion_word_count",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for t in Big5Trait::ALL {
        header.push(t.column());
    }
    for term in TFIDF_TERMS {
        header.push(format!("tfidf_{}", term));
    }
    header.extend(
        ["quirk_cluster", "peer_group", "detected_distortions", "distortion_count"]
            .iter()
            .map(|s| s.to_string()),
    );
    header
}

fn csv_row(rec: &EntryRecord) -> Vec<String> {
    let e = &rec.entry;
    let f = &rec.features;
    let mut row = vec![
        e.id.to_string(),
        e.raw_text.clone(),
        e.normalized_text.clone(),
        e.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        e.emotion.clone().unwrap_or_default(),
        e.annotated_distortion.clone().unwrap_or_default(),
        e.context.clone().unwrap_or_default(),
        f.text_length.to_string(),
        f.word_count.to_string(),
        format!("{:.6}", f.polarity),
        format!("{:.6}", f.subjectivity),
        f.sentiment_label.to_string(),
        f.cogdist_keyword_count.to_string(),
        f.neg_emotion_word_count.to_string(),
    ];
    for t in Big5Trait::ALL {
        row.push(f.big5_score(t).to_string());
    }
    for w in &f.tfidf {
        row.push(format!("{:.6}", w));
    }
    row.push(rec.clusters.quirk_cluster.to_string());
    row.push(rec.clusters.peer_group.to_string());
    row.push(rec.distortions.labels().join("; "));
    row.push(rec.distortions.count().to_string());
    row
}

pub fn write_features_csv(path: &Path, records: &[EntryRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(csv_header())?;
    for rec in records {
        wtr.write_record(csv_row(rec))?;
    }
    wtr.flush()?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Persist every run artifact under `out_dir`: the augmented table, the
/// two summary tables, and the rendered report.
pub fn write_outputs(
    out_dir: &Path,
    records: &[EntryRecord],
    summaries: &[PeriodSummary],
    feedback: &[FeedbackRecord],
    report_text: &str,
) -> Result<()> {
    let start = std::time::Instant::now();
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    write_features_csv(&out_dir.join("journal_features.csv"), records)?;
    write_json(out_dir.join("period_summary.json"), &summaries)?;
    write_json(out_dir.join("period_feedback.json"), &feedback)?;
    fs::write(out_dir.join("report.txt"), report_text.as_bytes())
        .context("writing report.txt")?;

    info!(
        "Output persisted - directory={}, rows={}, periods={}, duration={:.2}s",
        out_dir.display(),
        records.len(),
        summaries.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(())
}
