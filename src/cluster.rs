use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::EngineConfig;
use crate::kmeans::{self, KMeansModel, KMeansParams};
use crate::lexicons::STOP_WORDS;
use crate::models::JournalEntry;
use crate::tfidf::TfidfVectorizer;

/// Labels plus the fit artifact. Labels are positions into the corpus the
/// fit ran on; re-fitting on different data invalidates them.
#[derive(Debug)]
pub struct ClusteringOutcome {
    pub labels: Vec<usize>,
    pub model: KMeansModel,
}

/// Stable per-fit sub-seed so the two fits draw independent but
/// reproducible init sequences from one configured seed.
fn fit_seed(base: u64, space: &str) -> u64 {
    base ^ xxh3_64(space.as_bytes())
}

/// Theme ("quirk") clustering: TF-IDF over normalized text, vocabulary
/// capped and stopword-filtered, k-means into `n_clusters_quirk` groups.
pub fn quirk_clusters(entries: &[JournalEntry], cfg: &EngineConfig) -> Result<ClusteringOutcome> {
    let start = std::time::Instant::now();
    let texts: Vec<String> = entries.iter().map(|e| e.normalized_text.clone()).collect();

    let vectorizer = TfidfVectorizer::fit_learned(&texts, cfg.quirk_vocab_size, STOP_WORDS);
    debug!(
        "Quirk vocabulary learned - terms={}, cap={}",
        vectorizer.vocabulary().len(),
        cfg.quirk_vocab_size
    );
    let matrix = vectorizer.transform_all(&texts);

    let params = KMeansParams::with_k(cfg.n_clusters_quirk, fit_seed(cfg.kmeans_seed, "quirk"));
    let (model, labels) = kmeans::fit(&matrix, &params)
        .context("quirk clustering over text-theme TF-IDF vectors")?;

    info!(
        "Quirk clustering completed - k={}, entries={}, iterations={}, converged={}, duration={:.2}s",
        cfg.n_clusters_quirk,
        entries.len(),
        model.iterations,
        model.converged,
        start.elapsed().as_secs_f32()
    );
    Ok(ClusteringOutcome { labels, model })
}

/// Peer-group clustering over the five trait scores.
pub fn peer_groups(big5_rows: &[[u32; 5]], cfg: &EngineConfig) -> Result<ClusteringOutcome> {
    let start = std::time::Instant::now();
    let matrix: Vec<Vec<f64>> = big5_rows
        .iter()
        .map(|row| row.iter().map(|&v| v as f64).collect())
        .collect();

    let params = KMeansParams::with_k(cfg.n_clusters_peer, fit_seed(cfg.kmeans_seed, "peer"));
    let (model, labels) =
        kmeans::fit(&matrix, &params).context("peer-group clustering over trait scores")?;

    info!(
        "Peer clustering completed - k={}, entries={}, iterations={}, converged={}, duration={:.2}s",
        cfg.n_clusters_peer,
        big5_rows.len(),
        model.iterations,
        model.converged,
        start.elapsed().as_secs_f32()
    );
    Ok(ClusteringOutcome { labels, model })
}

/// First `max_samples` entry texts per quirk cluster, in corpus order,
/// not random sampling.
pub fn summarize_quirks(
    entries: &[JournalEntry],
    labels: &[usize],
    max_samples: usize,
) -> BTreeMap<usize, Vec<String>> {
    let mut samples: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (entry, &label) in entries.iter().zip(labels) {
        let bucket = samples.entry(label).or_default();
        if bucket.len() < max_samples {
            bucket.push(entry.normalized_text.clone());
        }
    }
    samples
}
