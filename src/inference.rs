use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::lexicons::fold;

/// Rendered label for an entry with no detected distortion.
pub const NONE_DETECTED: &str = "none detected";

/// The closed set of cognitive-distortion kinds the engine can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DistortionKind {
    Catastrophizing,
    FortuneTelling,
    Personalization,
    ShouldStatements,
    MindReading,
    Overgeneralization,
}

impl DistortionKind {
    pub const ALL: [DistortionKind; 6] = [
        DistortionKind::Catastrophizing,
        DistortionKind::FortuneTelling,
        DistortionKind::Personalization,
        DistortionKind::ShouldStatements,
        DistortionKind::MindReading,
        DistortionKind::Overgeneralization,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DistortionKind::Catastrophizing => "catastrophizing",
            DistortionKind::FortuneTelling => "fortune telling",
            DistortionKind::Personalization => "personalization",
            DistortionKind::ShouldStatements => "should statements",
            DistortionKind::MindReading => "mind reading",
            DistortionKind::Overgeneralization => "overgeneralization",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.label() == label)
    }

    /// A kind is detected when ANY of its phrases is a literal substring
    /// of the folded text. Multi-word phrases stay contiguous. This is
    /// deliberately not token matching ("will" matches "willing").
    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            DistortionKind::Catastrophizing => {
                &["never", "always", "worst", "disaster", "ruined"]
            }
            DistortionKind::FortuneTelling => &["will", "predict", "inevitable"],
            DistortionKind::Personalization => &["my fault", "it's me", "because of me"],
            DistortionKind::ShouldStatements => &["should", "must", "have to"],
            DistortionKind::MindReading => &["think", "assume", "guess", "know what others"],
            DistortionKind::Overgeneralization => {
                &["everyone", "nobody", "every time", "all", "none"]
            }
        }
    }
}

impl fmt::Display for DistortionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Multi-label classification result. An empty kind set renders as the
/// "none detected" sentinel and counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistortionResult {
    detected: BTreeSet<DistortionKind>,
}

impl DistortionResult {
    pub fn new(detected: BTreeSet<DistortionKind>) -> Self {
        Self { detected }
    }

    pub fn kinds(&self) -> &BTreeSet<DistortionKind> {
        &self.detected
    }

    /// 0 iff the rendered set is exactly {"none detected"}.
    pub fn count(&self) -> usize {
        self.detected.len()
    }

    /// Rendered label set; never empty.
    pub fn labels(&self) -> Vec<&'static str> {
        if self.detected.is_empty() {
            vec![NONE_DETECTED]
        } else {
            self.detected.iter().map(|k| k.label()).collect()
        }
    }
}

/// The "text → label(s)" capability. The rule-based classifier below and
/// an external model-backed classifier share this contract, keeping the
/// aggregation stages agnostic to which produced the labels.
pub trait DistortionLabeler: Sync {
    fn label_entry(&self, text: &str) -> DistortionResult;
}

/// Keyword-driven multi-label classifier: no thresholds, no scores. A
/// text may trigger several kinds at once.
pub struct KeywordInference;

impl DistortionLabeler for KeywordInference {
    fn label_entry(&self, text: &str) -> DistortionResult {
        let folded = fold(text);
        let detected = DistortionKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.phrases().iter().any(|p| folded.contains(p)))
            .collect();
        DistortionResult::new(detected)
    }
}
