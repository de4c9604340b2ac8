use crate::error::DatasetError;
use crate::{DEFAULT_DURATION_SECONDS, DEFAULT_SAMPLE_RATE, NOTE_SECONDS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Note selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Contiguous run of catalog notes from a random start.
    Scale,
    /// Uniformly drawn notes of random trimmed length.
    Random,
    /// Random over a minor pentatonic box at a random root fret.
    Pentatonic,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [StrategyKind::Scale, StrategyKind::Random, StrategyKind::Pentatonic];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Scale => "scale",
            StrategyKind::Random => "random",
            StrategyKind::Pentatonic => "pentatonic",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scale" => Ok(StrategyKind::Scale),
            "random" => Ok(StrategyKind::Random),
            "pentatonic" => Ok(StrategyKind::Pentatonic),
            other => Err(DatasetError::UnsupportedOption(format!(
                "strategy type '{}' (select from: scale, random, pentatonic)",
                other
            ))),
        }
    }
}

/// What to do when a chosen note cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeFailurePolicy {
    /// Record a diagnostic and continue with the next pick.
    #[default]
    Skip,
    /// Stop the call and return empty buffers with the diagnostic.
    Abort,
}

/// Options for one dataset-creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRequest {
    pub genre: String,
    /// Parsed at dataset creation so an unknown name becomes a diagnostic.
    #[serde(default = "default_strategy")]
    pub strategy_type: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_duration")]
    pub duration_seconds: f64,
    #[serde(default = "default_true")]
    pub apply_companding: bool,
    /// Accepted for compatibility; polyphonic material is not supported.
    #[serde(default)]
    pub include_polyphonic: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub decode_failure_policy: DecodeFailurePolicy,
    #[serde(default = "default_note_seconds")]
    pub note_seconds: f64,
    #[serde(default = "default_decode_batch")]
    pub decode_batch: usize,
}

fn default_strategy() -> String { StrategyKind::Scale.name().to_string() }
fn default_sample_rate() -> u32 { DEFAULT_SAMPLE_RATE }
fn default_duration() -> f64 { DEFAULT_DURATION_SECONDS }
fn default_true() -> bool { true }
fn default_note_seconds() -> f64 { NOTE_SECONDS }
fn default_decode_batch() -> usize { 8 }

impl DatasetRequest {
    pub fn new(genre: impl Into<String>, strategy: StrategyKind) -> Self {
        Self {
            genre: genre.into(),
            strategy_type: strategy.name().to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_seconds: DEFAULT_DURATION_SECONDS,
            apply_companding: true,
            include_polyphonic: false,
            seed: None,
            decode_failure_policy: DecodeFailurePolicy::Skip,
            note_seconds: NOTE_SECONDS,
            decode_batch: default_decode_batch(),
        }
    }

    /// Requested length of each output stream in samples.
    pub fn target_len(&self) -> usize {
        (self.duration_seconds.max(0.0) * self.sample_rate as f64).ceil() as usize
    }

    /// Nominal length of one catalog note in samples, never zero.
    pub fn note_len(&self) -> usize {
        ((self.note_seconds.max(0.0) * self.sample_rate as f64).round() as usize).max(1)
    }

    pub fn strategy(&self) -> Result<StrategyKind, DatasetError> {
        self.strategy_type.parse()
    }
}
