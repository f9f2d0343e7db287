use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PeriodFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for PeriodFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PeriodFrequency::Daily => "daily",
            PeriodFrequency::Weekly => "weekly",
            PeriodFrequency::Monthly => "monthly",
        })
    }
}

/// Normalizer-side switches. The engine recognizes and carries them but
/// never applies them; the text normalizer is an external collaborator
/// that consumes this block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessFlags {
    pub lowercase: bool,
    pub remove_punctuation: bool,
    pub remove_numbers: bool,
    pub remove_stopwords: bool,
    pub lemmatize: bool,
}

impl Default for PreprocessFlags {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_punctuation: true,
            remove_numbers: true,
            remove_stopwords: true,
            lemmatize: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub n_clusters_quirk: usize,
    pub n_clusters_peer: usize,
    pub period_frequency: PeriodFrequency,
    pub kmeans_seed: u64,
    /// Vocabulary cap for the quirk-cluster TF-IDF space.
    pub quirk_vocab_size: usize,
    /// Sample texts surfaced per quirk cluster.
    pub quirk_samples: usize,
    /// First date handed out when the input table has no date column.
    pub synthetic_start_date: NaiveDate,
    pub text_columns: Vec<String>,
    pub preprocessing: PreprocessFlags,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_clusters_quirk: 5,
            n_clusters_peer: 3,
            period_frequency: PeriodFrequency::Monthly,
            kmeans_seed: 42,
            quirk_vocab_size: 100,
            quirk_samples: 3,
            synthetic_start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            text_columns: vec!["text".to_string()],
            preprocessing: PreprocessFlags::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a YAML file; a missing path means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                let cfg: EngineConfig = serde_yaml::from_str(&raw)
                    .with_context(|| format!("parsing config {}", p.display()))?;
                info!("Config loaded - path={}", p.display());
                Ok(cfg)
            }
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.n_clusters_quirk, 5);
        assert_eq!(cfg.n_clusters_peer, 3);
        assert_eq!(cfg.period_frequency, PeriodFrequency::Monthly);
        assert_eq!(cfg.kmeans_seed, 42);
        assert!(cfg.preprocessing.lowercase);
    }

    #[test]
    fn yaml_round_trip_with_partial_fields() {
        let cfg: EngineConfig =
            serde_yaml::from_str("n_clusters_quirk: 7\nperiod_frequency: weekly\n").unwrap();
        assert_eq!(cfg.n_clusters_quirk, 7);
        assert_eq!(cfg.period_frequency, PeriodFrequency::Weekly);
        // everything unspecified falls back to defaults
        assert_eq!(cfg.n_clusters_peer, 3);
        assert_eq!(cfg.quirk_vocab_size, 100);
    }

    #[test]
    fn preprocessing_flags_are_recognized() {
        let cfg: EngineConfig =
            serde_yaml::from_str("preprocessing:\n  remove_stopwords: false\n").unwrap();
        assert!(!cfg.preprocessing.remove_stopwords);
        assert!(cfg.preprocessing.lowercase);
    }
}
