use pnsynth::engine::config::{
    DEFAULT_INTEGRALITY_TOLERANCE, IntegralityMode, SearchStrategy,
};

pub struct DefaultsConfig {
    pub strategy: SearchStrategy,
    pub integrality: IntegralityMode,
    pub prune: bool,
    pub integrality_tolerance: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Sequential,
            integrality: IntegralityMode::Relaxed,
            prune: false,
            integrality_tolerance: DEFAULT_INTEGRALITY_TOLERANCE,
        }
    }
}
