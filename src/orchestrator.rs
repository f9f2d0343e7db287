use anyhow::{bail, Result};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

use crate::cluster::{peer_groups, quirk_clusters, summarize_quirks};
use crate::config::EngineConfig;
use crate::export::write_outputs;
use crate::features::extract_all;
use crate::feedback::attach_feedback;
use crate::inference::{DistortionLabeler, KeywordInference};
use crate::ingest::{basic_eda_report, load_journal_csv};
use crate::models::{ClusterAssignment, EntryRecord};
use crate::patterns::detect_recurring_patterns;
use crate::period::summarize_periods;
use crate::render::render_report;
use crate::sentiment::LexiconSentiment;

/// Full batch run: ingest → features → (clustering, inference) → merged
/// table → period aggregation → feedback → persisted outputs. The
/// clustering stage is the one synchronization barrier; everything before
/// it is a per-entry map and everything after it is a single-pass
/// reduction.
pub fn run_batch(cfg: &EngineConfig, input: &Path, out_dir: &Path) -> Result<()> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Pipeline started - input={}, output_dir={}, freq={}",
        input.display(),
        out_dir.display(),
        cfg.period_frequency
    );

    // 1) ingest
    let entries = load_journal_csv(input, cfg)?;
    if entries.is_empty() {
        bail!("input {} holds no journal entries", input.display());
    }
    let eda = basic_eda_report(&entries);

    // 2) per-entry features (parallel map, no shared state)
    let scorer = LexiconSentiment::new();
    let features = extract_all(&entries, &scorer);

    // 3) the two independent fits; both need the whole corpus
    let quirks = quirk_clusters(&entries, cfg)?;
    let quirk_samples = summarize_quirks(&entries, &quirks.labels, cfg.quirk_samples);
    for (cluster, samples) in &quirk_samples {
        debug!("Quirk cluster {} samples: {:?}", cluster, samples);
    }
    let big5_rows: Vec<[u32; 5]> = features.iter().map(|f| f.big5).collect();
    let peers = peer_groups(&big5_rows, cfg)?;

    // 4) rule-based distortion labels (entry-local)
    let inference_start = std::time::Instant::now();
    let labeler = KeywordInference;
    let distortions: Vec<_> = entries
        .par_iter()
        .map(|e| labeler.label_entry(&e.normalized_text))
        .collect();
    debug!(
        "Distortion inference completed - entries={}, duration={:.2}s",
        entries.len(),
        inference_start.elapsed().as_secs_f32()
    );

    // 5) merge into the augmented per-entry table
    let records: Vec<EntryRecord> = entries
        .into_iter()
        .zip(features)
        .zip(quirks.labels.iter().zip(&peers.labels))
        .zip(distortions)
        .map(|(((entry, features), (&quirk, &peer)), distortions)| EntryRecord {
            entry,
            features,
            clusters: ClusterAssignment { quirk_cluster: quirk, peer_group: peer },
            distortions,
        })
        .collect();

    // 6) corpus-wide patterns, then the time-bucketed reductions
    let patterns = detect_recurring_patterns(&records);
    let summaries = summarize_periods(&records, cfg.period_frequency);
    info!("Period aggregation completed - periods={}", summaries.len());
    let feedback = attach_feedback(&summaries);

    // 7) persist; fit artifacts are values, log and drop them here
    debug!(
        "Fit artifacts - quirk: inertia={:.4}, converged={}; peer: inertia={:.4}, converged={}",
        quirks.model.inertia, quirks.model.converged, peers.model.inertia, peers.model.converged
    );
    let report = render_report(&eda, &patterns, &quirk_samples, &summaries, &feedback);
    write_outputs(out_dir, &records, &summaries, &feedback, &report)?;

    info!(
        "Pipeline completed successfully - total_duration={:.2}s, entries={}, periods={}",
        pipeline_start.elapsed().as_secs_f32(),
        records.len(),
        summaries.len()
    );
    Ok(())
}
