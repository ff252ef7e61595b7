use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Order in which the branch-and-bound tree is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Explicit worklist, pre-order, left child first.
    #[default]
    Sequential,
    /// Sibling subtrees are built concurrently on the rayon pool.
    Parallel,
}

impl SearchStrategy {
    pub fn keyword(&self) -> &'static str {
        match self {
            SearchStrategy::Sequential => "sequential",
            SearchStrategy::Parallel => "parallel",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for SearchStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(SearchStrategy::Sequential),
            "parallel" => Ok(SearchStrategy::Parallel),
            other => Err(ConfigError::InvalidParameter {
                name: "strategy",
                reason: format!("expected 'sequential' or 'parallel', found '{}'", other),
            }),
        }
    }
}

/// How the relaxation backend treats activation variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegralityMode {
    /// Activations are continuous in `[0, 1]`; integrality comes from branching.
    #[default]
    Relaxed,
    /// Unpinned activations are declared integer in the backend.
    Enforced,
}

impl IntegralityMode {
    pub fn keyword(&self) -> &'static str {
        match self {
            IntegralityMode::Relaxed => "relaxed",
            IntegralityMode::Enforced => "enforced",
        }
    }
}

impl fmt::Display for IntegralityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for IntegralityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relaxed" => Ok(IntegralityMode::Relaxed),
            "enforced" => Ok(IntegralityMode::Enforced),
            other => Err(ConfigError::InvalidParameter {
                name: "integrality",
                reason: format!("expected 'relaxed' or 'enforced', found '{}'", other),
            }),
        }
    }
}

pub const DEFAULT_INTEGRALITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchConfig {
    pub strategy: SearchStrategy,
    pub integrality: IntegralityMode,
    /// Stop expanding nodes whose relaxation cannot beat the incumbent.
    pub prune: bool,
    /// A value is fractional when its distance to the nearest integer exceeds this.
    pub integrality_tolerance: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::default(),
            integrality: IntegralityMode::default(),
            prune: false,
            integrality_tolerance: DEFAULT_INTEGRALITY_TOLERANCE,
        }
    }
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    strategy: Option<SearchStrategy>,
    integrality: Option<IntegralityMode>,
    prune: Option<bool>,
    integrality_tolerance: Option<f64>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
    pub fn integrality(mut self, mode: IntegralityMode) -> Self {
        self.integrality = Some(mode);
        self
    }
    pub fn prune(mut self, enabled: bool) -> Self {
        self.prune = Some(enabled);
        self
    }
    pub fn integrality_tolerance(mut self, tolerance: f64) -> Self {
        self.integrality_tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let integrality_tolerance = self
            .integrality_tolerance
            .unwrap_or(DEFAULT_INTEGRALITY_TOLERANCE);
        if !integrality_tolerance.is_finite() || !(0.0..0.5).contains(&integrality_tolerance) {
            return Err(ConfigError::InvalidParameter {
                name: "integrality_tolerance",
                reason: format!("must lie in [0, 0.5), found {}", integrality_tolerance),
            });
        }

        Ok(SearchConfig {
            strategy: self.strategy.unwrap_or_default(),
            integrality: self.integrality.unwrap_or_default(),
            prune: self.prune.unwrap_or(false),
            integrality_tolerance,
        })
    }
}
