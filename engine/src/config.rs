//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Envelope times are multiples of the decision window length
//! (`extract_time`), so they follow `hop_samples` and `num_frames`.

use std::path::Path;
use std::time::Duration;

use mosaic_audio::Adsr;
use mosaic_vecstore::Metric;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::selector::Selection;

/// Envelope shape relative to the decision window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f32,
    pub release: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 1.0,
            decay: 0.5,
            sustain: 1.0,
            release: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Audio clock rate in Hz.
    pub sample_rate: u32,
    /// Samples per analysis hop.
    pub hop_samples: u32,
    /// Analysis frames per decision window.
    pub num_frames: usize,
    /// Neighbours fetched per search.
    pub k: usize,
    /// Voice pool size.
    pub voices: usize,
    pub selection: Selection,
    pub triggers_per_cycle: usize,
    /// Pause between triggers issued in the same cycle.
    pub trigger_spacing_ms: u64,
    pub metric: Metric,
    pub envelope: EnvelopeConfig,
    /// Static voice pans are drawn uniformly from `[-pan_spread, pan_spread]`.
    pub pan_spread: f32,
    /// Static effect send level of every voice.
    pub send: f32,
    /// Seed for pan and candidate selection; random when unset.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            hop_samples: 2048,
            num_frames: 4,
            k: 10,
            voices: 16,
            selection: Selection::Random,
            triggers_per_cycle: 1,
            trigger_spacing_ms: 5,
            metric: Metric::Euclidean,
            envelope: EnvelopeConfig::default(),
            pan_spread: 0.75,
            send: 0.1,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Loads a YAML or JSON config, chosen by file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| EngineError::ConfigFile(format!("{}: {e}", path.display())))?;
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let parsed = match ext {
            "json" => serde_json::from_slice(&data).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_slice(&data).map_err(|e| e.to_string()),
            _ => Err(format!("unsupported extension {ext:?}")),
        };
        parsed.map_err(|e| EngineError::ConfigFile(format!("{}: {e}", path.display())))
    }

    /// Time one analysis frame represents.
    pub fn hop(&self) -> Duration {
        let nanos = self.hop_samples as u64 * 1_000_000_000 / self.sample_rate.max(1) as u64;
        Duration::from_nanos(nanos)
    }

    /// Length of one decision window: `hop * num_frames`.
    pub fn extract_time(&self) -> Duration {
        let frames = u32::try_from(self.num_frames).unwrap_or(u32::MAX);
        self.hop().saturating_mul(frames)
    }

    /// How long each trigger occupies its voice: twice the decision window,
    /// so consecutive fragments overlap.
    pub fn hold(&self) -> Duration {
        self.extract_time().saturating_mul(2)
    }

    pub fn trigger_spacing(&self) -> Duration {
        Duration::from_millis(self.trigger_spacing_ms)
    }

    pub fn adsr(&self) -> Adsr {
        let window = self.extract_time();
        let scaled = |m: f64| Duration::from_nanos((window.as_nanos() as f64 * m.max(0.0)).round() as u64);
        Adsr::new(
            scaled(self.envelope.attack),
            scaled(self.envelope.decay),
            self.envelope.sustain,
            scaled(self.envelope.release),
        )
    }

    /// Checks the config against a model of `num_points` windows.
    pub fn validate(&self, num_points: usize) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));
        if self.sample_rate == 0 {
            return invalid("sample_rate must be positive".into());
        }
        if self.hop_samples == 0 {
            return invalid("hop_samples must be positive".into());
        }
        if self.num_frames == 0 {
            return invalid("num_frames must be positive".into());
        }
        if u32::try_from(self.num_frames).is_err() {
            return invalid(format!("num_frames = {} is too large", self.num_frames));
        }
        if self.voices == 0 {
            return invalid("voices must be positive".into());
        }
        if self.triggers_per_cycle == 0 {
            return invalid("triggers_per_cycle must be positive".into());
        }
        if self.k == 0 {
            return invalid("k must be positive".into());
        }
        if self.k > num_points {
            return invalid(format!("k = {} exceeds the {num_points} model windows", self.k));
        }
        if !(self.pan_spread >= 0.0) || !self.pan_spread.is_finite() {
            return invalid("pan_spread must be finite and non-negative".into());
        }
        let env = &self.envelope;
        if [env.attack, env.decay, env.release].iter().any(|m| !(*m >= 0.0) || !m.is_finite()) {
            return invalid("envelope times must be finite and non-negative".into());
        }
        Ok(())
    }
}
