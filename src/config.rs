//! Search configuration.
//!
//! All tuning constants of the selection heuristic live in
//! [`HeuristicWeights`] so they can be adjusted without touching the
//! algorithm. Both structs deserialize from JSON with per-field defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_ITERATIONS, DEFAULT_SIMULATIONS};
use crate::playout::PlayoutPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Weights of the composite child score used during selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// UCT exploration constant; the formula uses its square root.
    pub exploration: f64,

    /// Scale of the `ln(mobility + 1) / (visits + 1)` term.
    pub mobility: f64,

    /// Scale of the centre-proximity term (divided by distance from centre).
    pub inner: f64,

    /// Multiple of the UCT score added for corner moves.
    pub corner: f64,

    /// Multiple of the UCT score added for squares beside a corner.
    pub bad: f64,

    /// Multiple of the UCT score added for squares diagonal to a corner.
    pub very_bad: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            exploration: 3.0,
            mobility: 0.5,
            inner: 0.8,
            corner: 0.5,
            bad: -0.15,
            very_bad: -0.35,
        }
    }
}

impl HeuristicWeights {
    /// Smaller corner bonus, much harsher penalty for diagonal-to-corner squares.
    pub fn defensive() -> Self {
        Self {
            corner: 0.35,
            very_bad: -0.65,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("exploration", self.exploration),
            ("mobility", self.mobility),
            ("inner", self.inner),
            ("corner", self.corner),
            ("bad", self.bad),
            ("very_bad", self.very_bad),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("weight {name} must be finite")));
        }
        if self.exploration < 0.0 {
            return Err(ConfigError::Invalid(
                "exploration constant must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Budget and behaviour of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Independent playouts per rollout batch.
    pub simulations_per_rollout: u32,

    /// Selection/expansion/rollout iterations after the initial rollout.
    pub max_iterations: u32,

    /// Seed for the search's random source. `None` draws fresh entropy.
    pub seed: Option<u64>,

    /// Spread each rollout batch over the rayon thread pool.
    pub parallel_rollouts: bool,

    /// Move choice inside playouts.
    pub playout: PlayoutPolicy,

    pub heuristics: HeuristicWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simulations_per_rollout: DEFAULT_SIMULATIONS,
            max_iterations: DEFAULT_ITERATIONS,
            seed: None,
            parallel_rollouts: false,
            playout: PlayoutPolicy::Uniform,
            heuristics: HeuristicWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_budget(simulations_per_rollout: u32, max_iterations: u32) -> Self {
        Self {
            simulations_per_rollout,
            max_iterations,
            ..Self::default()
        }
    }

    /// A small seeded budget for tests.
    pub fn for_testing() -> Self {
        Self {
            simulations_per_rollout: 4,
            max_iterations: 40,
            seed: Some(7),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.heuristics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.simulations_per_rollout, 20);
        assert_eq!(config.max_iterations, 300);
        assert_eq!(config.heuristics.exploration, 3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SearchConfig::from_json_str(
            r#"{"max_iterations": 10, "heuristics": {"corner": 0.9}, "playout": "avoid_very_bad"}"#,
        )
        .unwrap();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.simulations_per_rollout, 20);
        assert_eq!(config.heuristics.corner, 0.9);
        assert_eq!(config.heuristics.very_bad, -0.35);
        assert_eq!(config.playout, PlayoutPolicy::AvoidVeryBad);
    }

    #[test]
    fn test_rejects_negative_exploration() {
        let err = SearchConfig::from_json_str(r#"{"heuristics": {"exploration": -1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_defensive_preset() {
        let w = HeuristicWeights::defensive();
        assert_eq!(w.corner, 0.35);
        assert_eq!(w.bad, -0.15);
        assert_eq!(w.very_bad, -0.65);
    }
}
